//! Report rendering.
//!
//! Renders the current state plus this run's changes into a Markdown
//! document. Pure function over its inputs; writing the file is the
//! only side effect and lives in a separate op.

use std::cmp::Reverse;
use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::error::Result;
use crate::models::{ReportConfig, StateStore};
use crate::pipeline::RunOutcome;
use crate::utils::report_timestamp;

/// Cell placeholder for companies with no observed data.
const PLACEHOLDER: &str = "-";

/// Render the report document.
///
/// Rows are sorted newest-updated first; companies that never produced
/// a record sort last. Ties break on the conference-date text in
/// ascending order, empty content first.
pub fn render(
    codes: &[String],
    state: &StateStore,
    outcome: &RunOutcome,
    config: &ReportConfig,
    now: &DateTime<FixedOffset>,
) -> String {
    let mut sorted: Vec<&String> = codes.iter().collect();
    sorted.sort_by_key(|code| sort_key(code, state));

    let mut lines = vec![
        config.title.clone(),
        String::new(),
        config.attribution.clone(),
        String::new(),
        format!(
            "Last run: {}",
            report_timestamp(now, config.utc_offset_hours)
        ),
        String::new(),
    ];

    if outcome.has_changes() {
        lines.push("## Changes this run".to_string());
        lines.push(String::new());
        for change in &outcome.changes {
            lines.push(format!("- {change}"));
        }
        lines.push(String::new());
    }

    lines.push("## Watchlist".to_string());
    lines.push(String::new());
    lines.push("- Sorted by update date (newest first), then by conference date".to_string());
    lines.push(String::new());
    lines.push("| Code | Company | Conference date | Updated |".to_string());
    lines.push("|------|---------|-----------------|---------|".to_string());

    for code in sorted {
        let name = outcome.display_name(code);
        let (content, updated) = match state.get(code) {
            Some(record) => (
                record.content.as_str(),
                record.updated.as_deref().unwrap_or(PLACEHOLDER),
            ),
            None => (PLACEHOLDER, PLACEHOLDER),
        };
        lines.push(format!("| {code} | {name} | {content} | {updated} |"));
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());
    lines.push(config.usage_note.clone());

    lines.join("\n")
}

/// Sort key: update date newest-first (never-updated last), then the
/// conference-date text ascending.
fn sort_key(code: &str, state: &StateStore) -> (Reverse<i64>, String) {
    match state.get(code) {
        Some(record) => {
            let updated = record
                .updated
                .as_deref()
                .map(|d| d.replace('/', "").parse::<i64>().unwrap_or(0))
                .unwrap_or(0);
            (Reverse(updated), record.content.clone())
        }
        None => (Reverse(0), String::new()),
    }
}

/// Write the rendered report to disk. Failures are fatal and propagate.
pub async fn write_report(path: impl AsRef<Path>, content: &str) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}
