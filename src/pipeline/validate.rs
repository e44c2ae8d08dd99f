// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::{Config, Watchlist};
use crate::utils::log;

/// Validate configuration and watchlist without touching the network.
pub fn run_validate(config: &Config) -> Result<()> {
    log::header("Validating configuration and watchlist");

    match config.validate() {
        Ok(()) => {
            log::success("Configuration OK");
            log::sub_item(&format!("endpoint: {}", config.fetcher.endpoint));
            log::sub_item(&format!("timeout: {}s", config.fetcher.timeout_secs));
            log::sub_item(&format!(
                "rate-limit retries: {} (cooldown {}s)",
                config.fetcher.max_rate_limit_retries, config.fetcher.rate_limit_cooldown_secs
            ));
            log::sub_item(&format!(
                "reporting offset: UTC{:+}",
                config.report.utc_offset_hours
            ));
        }
        Err(e) => {
            log::error(&format!("Configuration invalid: {e}"));
            return Err(e);
        }
    }

    match Watchlist::load(&config.paths.companies_file) {
        Ok(watchlist) => {
            log::success("Watchlist OK");
            log::sub_item(&format!("companies: {}", watchlist.len()));
            Ok(())
        }
        Err(e) => {
            log::error(&format!(
                "Watchlist load failed from {}: {e}",
                config.paths.companies_file
            ));
            Err(e)
        }
    }
}
