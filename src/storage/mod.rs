//! Storage abstraction for the persisted state document.
//!
//! The state document is a flat JSON mapping from company code to the
//! last-observed disclosure record. It is loaded once at run start,
//! mutated in memory, and written back in full at run end. Single
//! writer assumed; concurrent runs are not supported.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::StateStore;

// Re-export for convenience
pub use local::LocalStateStorage;

/// Trait for state persistence backends.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Load the state mapping, empty if no document exists yet.
    ///
    /// Legacy bare-string records are normalized to the current object
    /// shape here, so callers only ever see one shape.
    async fn load_state(&self) -> Result<StateStore>;

    /// Persist the full state mapping, overwriting any prior document.
    async fn save_state(&self, state: &StateStore) -> Result<()>;
}
