//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and portal-query behavior settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Report rendering settings
    #[serde(default)]
    pub report: ReportConfig,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.endpoint.trim().is_empty() {
            return Err(AppError::validation("fetcher.endpoint is empty"));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.fetcher.max_rate_limit_retries == 0 {
            return Err(AppError::validation(
                "fetcher.max_rate_limit_retries must be > 0",
            ));
        }
        if self.report.utc_offset_hours.abs() > 23 {
            return Err(AppError::validation(
                "report.utc_offset_hours must be within ±23",
            ));
        }
        if self.paths.companies_file.trim().is_empty() {
            return Err(AppError::validation("paths.companies_file is empty"));
        }
        Ok(())
    }
}

/// HTTP client and portal-query behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Disclosure portal endpoint (POST target)
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Courtesy delay between companies in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Cooldown before retrying a rate-limited request, in seconds
    #[serde(default = "defaults::cooldown")]
    pub rate_limit_cooldown_secs: u64,

    /// Upper bound on rate-limit retries for one company
    #[serde(default = "defaults::max_retries")]
    pub max_rate_limit_retries: u32,

    /// Skip TLS certificate verification for the portal call.
    ///
    /// The portal's certificate chain does not always validate; the
    /// observed deployment runs with verification off. Deliberate trust
    /// relaxation, kept configurable.
    #[serde(default = "defaults::accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            rate_limit_cooldown_secs: defaults::cooldown(),
            max_rate_limit_retries: defaults::max_retries(),
            accept_invalid_certs: defaults::accept_invalid_certs(),
        }
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report title line
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Attribution line printed under the title
    #[serde(default = "defaults::attribution")]
    pub attribution: String,

    /// Static usage note printed above the table
    #[serde(default = "defaults::usage_note")]
    pub usage_note: String,

    /// Reporting timezone as a UTC offset in hours.
    ///
    /// Drives both the report timestamp and the change-detection
    /// "today" stamp, so the two clocks always agree.
    #[serde(default = "defaults::utc_offset")]
    pub utc_offset_hours: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: defaults::title(),
            attribution: defaults::attribution(),
            usage_note: defaults::usage_note(),
            utc_offset_hours: defaults::utc_offset(),
        }
    }
}

/// File locations for inputs and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Watchlist file, one company code per line
    #[serde(default = "defaults::companies_file")]
    pub companies_file: String,

    /// Persisted state document
    #[serde(default = "defaults::state_file")]
    pub state_file: String,

    /// Rendered report destination
    #[serde(default = "defaults::report_file")]
    pub report_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            companies_file: defaults::companies_file(),
            state_file: defaults::state_file(),
            report_file: defaults::report_file(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum console log level (debug, info, warn, error)
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Fetcher defaults
    pub fn endpoint() -> String {
        "https://mopsov.twse.com.tw/mops/web/ajax_t100sb07_1".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; confwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn cooldown() -> u64 {
        30
    }
    pub fn max_retries() -> u32 {
        5
    }
    pub fn accept_invalid_certs() -> bool {
        true
    }

    // Report defaults
    pub fn title() -> String {
        "# Investor Conference Tracker".into()
    }
    pub fn attribution() -> String {
        "Maintained automatically by confwatch".into()
    }
    pub fn usage_note() -> String {
        "To track another company, add its code to `companies.txt`, one per line.".into()
    }
    pub fn utc_offset() -> i32 {
        8
    }

    // Path defaults
    pub fn companies_file() -> String {
        "data/companies.txt".into()
    }
    pub fn state_file() -> String {
        "data/state.json".into()
    }
    pub fn report_file() -> String {
        "REPORT.md".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
