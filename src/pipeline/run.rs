// src/pipeline/run.rs

//! Run orchestration.
//!
//! One run: load watchlist → load state → fetch and diff each company
//! in source order with a courtesy delay between requests → persist the
//! state → render and write the report → print a summary. Strictly
//! sequential; there is never more than one request in flight.

use std::time::Duration;

use crate::error::Result;
use crate::models::{Config, StateStore, Watchlist};
use crate::pipeline::report::{render, write_report};
use crate::pipeline::{ChangeDetector, RunOutcome};
use crate::services::DisclosureFetcher;
use crate::storage::{LocalStateStorage, StateStorage};
use crate::utils::{log, now_in, reporting_offset, today_stamp};

/// Run the full tracking pipeline.
pub async fn run_tracker(config: &Config) -> Result<()> {
    config.validate()?;
    let offset = reporting_offset(config.report.utc_offset_hours)?;

    // Watchlist failures abort before any network activity.
    let watchlist = Watchlist::load(&config.paths.companies_file)?;

    log::header("Investor conference tracker");
    log::info(&format!("Tracking {} companies", watchlist.len()));

    let storage = LocalStateStorage::new(&config.paths.state_file);
    let mut state = storage.load_state().await?;

    let fetcher = DisclosureFetcher::new(&config.fetcher)?;
    let detector = ChangeDetector::new(today_stamp(offset));
    let delay = Duration::from_millis(config.fetcher.request_delay_ms);

    let outcome = process_watchlist(&fetcher, &watchlist, &detector, &mut state, delay).await;

    // Persistence failures are fatal; stale state is worse than no run.
    storage.save_state(&state).await?;

    let now = now_in(offset);
    let report = render(&watchlist.codes, &state, &outcome, &config.report, &now);
    write_report(&config.paths.report_file, &report).await?;

    if outcome.has_changes() {
        log::success(&format!("{} update(s)", outcome.change_count()));
    } else {
        log::success("No updates");
    }

    Ok(())
}

/// Fetch and diff every watched company, in source order.
pub async fn process_watchlist(
    fetcher: &DisclosureFetcher,
    watchlist: &Watchlist,
    detector: &ChangeDetector,
    state: &mut StateStore,
    delay: Duration,
) -> RunOutcome {
    let mut outcome = RunOutcome::default();

    for co_id in &watchlist.codes {
        let disclosure = fetcher.fetch(co_id).await;
        let changed = detector.apply(co_id, &disclosure, state, &mut outcome);

        let name = outcome.display_name(co_id);
        if changed {
            log::info(&format!("  {} {}: UPDATED", co_id, name));
        } else {
            log::info(&format!("  {} {}: no change", co_id, name));
        }

        if delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }
    }

    outcome
}

/// Re-render the report from the persisted state, no network.
pub async fn run_report(config: &Config) -> Result<()> {
    config.validate()?;
    let offset = reporting_offset(config.report.utc_offset_hours)?;

    let watchlist = Watchlist::load(&config.paths.companies_file)?;
    let storage = LocalStateStorage::new(&config.paths.state_file);
    let state = storage.load_state().await?;

    let now = now_in(offset);
    let report = render(
        &watchlist.codes,
        &state,
        &RunOutcome::default(),
        &config.report,
        &now,
    );
    write_report(&config.paths.report_file, &report).await?;

    log::success(&format!(
        "Report written to {} ({} companies)",
        config.paths.report_file,
        watchlist.len()
    ));
    Ok(())
}
