//! Disclosure record structures and the persisted state shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Last-observed disclosure for one company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisclosureRecord {
    /// Free-text conference-date field as scraped (single date or range)
    pub content: String,

    /// Date (YYYY/MM/DD) the content last changed; absent for records
    /// migrated from the legacy bare-string shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl DisclosureRecord {
    pub fn new(content: impl Into<String>, updated: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            updated: Some(updated.into()),
        }
    }
}

/// In-memory state: company code → last-observed record.
///
/// BTreeMap keeps key order deterministic so an unchanged store
/// round-trips byte-stably through save and reload.
pub type StateStore = BTreeMap<String, DisclosureRecord>;

/// Persisted record shape, current or legacy.
///
/// Older state documents stored a bare content string per company.
/// Both shapes are accepted at the deserialization boundary and
/// normalized to [`DisclosureRecord`] immediately after load; saving
/// always writes the current object shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRecord {
    Current(DisclosureRecord),
    Legacy(String),
}

impl From<StoredRecord> for DisclosureRecord {
    fn from(stored: StoredRecord) -> Self {
        match stored {
            StoredRecord::Current(record) => record,
            StoredRecord::Legacy(content) => DisclosureRecord {
                content,
                updated: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_shape_deserializes() {
        let stored: StoredRecord =
            serde_json::from_str(r#"{"content": "2024/05/01", "updated": "2024/04/20"}"#).unwrap();
        let record = DisclosureRecord::from(stored);
        assert_eq!(record.content, "2024/05/01");
        assert_eq!(record.updated.as_deref(), Some("2024/04/20"));
    }

    #[test]
    fn legacy_bare_string_deserializes() {
        let stored: StoredRecord = serde_json::from_str(r#""2023/11/15""#).unwrap();
        let record = DisclosureRecord::from(stored);
        assert_eq!(record.content, "2023/11/15");
        assert!(record.updated.is_none());
    }

    #[test]
    fn record_without_updated_field_is_accepted() {
        let stored: StoredRecord = serde_json::from_str(r#"{"content": "2024/05/01"}"#).unwrap();
        let record = DisclosureRecord::from(stored);
        assert_eq!(record.content, "2024/05/01");
        assert!(record.updated.is_none());
    }

    #[test]
    fn serialization_always_writes_object_shape() {
        let record = DisclosureRecord::new("2024/05/01", "2024/04/20");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""content""#));
        assert!(json.contains(r#""updated""#));
    }
}
