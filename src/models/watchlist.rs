//! Watchlist loading (the tracked company codes).

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Ordered list of company codes to track.
///
/// Codes keep the file's line order. Duplicates are not rejected; a
/// duplicated code is simply queried twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    pub codes: Vec<String>,
}

impl Watchlist {
    /// Load a watchlist from a plain-text file, one code per line.
    ///
    /// Lines empty after trimming, or starting with `#`, are skipped.
    /// A missing file is a hard error; the run aborts before any
    /// network activity.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    fn parse(content: &str) -> Self {
        let codes = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { codes }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
