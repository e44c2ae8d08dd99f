//! Local filesystem state storage.
//!
//! Writes are atomic-in-intent: the document is written to a temp file
//! next to the target and renamed into place, so a crash mid-write
//! leaves the previous document intact.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{DisclosureRecord, StateStore, StoredRecord};
use crate::storage::StateStorage;

/// State storage backed by a single JSON file.
#[derive(Clone)]
pub struct LocalStateStorage {
    path: PathBuf,
}

impl LocalStateStorage {
    /// Create a storage backend for the given state file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the raw document bytes, None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStorage for LocalStateStorage {
    async fn load_state(&self) -> Result<StateStore> {
        let Some(bytes) = self.read_bytes().await? else {
            log::info!("No state document at {:?}, starting empty", self.path);
            return Ok(StateStore::new());
        };

        let raw: BTreeMap<String, StoredRecord> = serde_json::from_slice(&bytes)?;
        Ok(raw
            .into_iter()
            .map(|(code, stored)| (code, DisclosureRecord::from(stored)))
            .collect())
    }

    async fn save_state(&self, state: &StateStore) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(state)?;
        self.write_bytes(&bytes).await
    }
}
