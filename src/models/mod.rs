// src/models/mod.rs

//! Domain models for the tracker application.
//!
//! This module contains all data structures used throughout the
//! application, organized by their primary purpose.

mod config;
mod record;
mod watchlist;

// Re-export all public types
pub use config::{Config, FetcherConfig, LoggingConfig, PathsConfig, ReportConfig};
pub use record::{DisclosureRecord, StateStore, StoredRecord};
pub use watchlist::Watchlist;
