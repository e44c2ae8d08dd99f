//! Pipeline entry points for tracker operations.
//!
//! - `run_tracker`: Fetch, diff, persist, and render for the watchlist
//! - `run_report`: Re-render the report from persisted state only
//! - `run_validate`: Check configuration and watchlist

pub mod diff;
pub mod report;
pub mod run;
pub mod validate;

pub use diff::{ChangeDetector, RunOutcome};
pub use report::{render, write_report};
pub use run::{run_report, run_tracker};
pub use validate::run_validate;
