// src/error.rs

//! Unified error handling for the tracker application.

use std::fmt;

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fetching a company's disclosure page failed
    #[error("Fetch error for {co_id}: {message}")]
    Fetch { co_id: String, message: String },

    /// The portal kept rate-limiting past the retry bound
    #[error("Rate limited for {co_id}: gave up after {attempts} attempts")]
    RateLimited { co_id: String, attempts: u32 },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with the company code as context.
    pub fn fetch(co_id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            co_id: co_id.into(),
            message: message.to_string(),
        }
    }
}
