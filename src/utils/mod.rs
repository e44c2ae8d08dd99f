//! Utility functions and helpers.

pub mod log;

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{AppError, Result};

/// Build the reporting timezone from a UTC offset in hours.
///
/// One offset drives both the report timestamp and the change-detection
/// "today" stamp, so the two never disagree.
pub fn reporting_offset(hours: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| AppError::config(format!("Invalid UTC offset: {hours}")))
}

/// Current time in the reporting timezone.
pub fn now_in(offset: FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset)
}

/// Today's date stamp (YYYY/MM/DD) in the reporting timezone.
pub fn today_stamp(offset: FixedOffset) -> String {
    now_in(offset).format("%Y/%m/%d").to_string()
}

/// Report header timestamp, e.g. `2026/08/23 14:05 (UTC+8)`.
pub fn report_timestamp(now: &DateTime<FixedOffset>, offset_hours: i32) -> String {
    format!("{} (UTC{:+})", now.format("%Y/%m/%d %H:%M"), offset_hours)
}
