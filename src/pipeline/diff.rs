//! Change detection between fetched disclosures and the state store.
//!
//! A change is recorded only when a non-empty fetch differs from the
//! last-observed content; absent or empty fetches leave the prior
//! record untouched, including its `updated` stamp.

use std::collections::HashMap;

use crate::models::{DisclosureRecord, StateStore};
use crate::services::Disclosure;

/// Transient per-run result: change announcements and display names.
///
/// Rebuilt every run; never persisted. Threaded through the
/// orchestration as an explicit value.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Human-readable change lines, in detection order
    pub changes: Vec<String>,
    /// Company code → display name observed this run
    pub names: HashMap<String, String>,
}

impl RunOutcome {
    /// Check if any change was detected this run.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Get the number of detected changes.
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    /// Display name for a code, falling back to the code itself.
    pub fn display_name<'a>(&'a self, co_id: &'a str) -> &'a str {
        self.names.get(co_id).map(String::as_str).unwrap_or(co_id)
    }
}

/// Detector comparing fetched content against the state store.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    /// Date stamp written into records that change this run
    today: String,
}

impl ChangeDetector {
    /// Create a detector stamping changes with the given date.
    ///
    /// "Today" is computed once per run so every record changed in the
    /// same run carries the same stamp.
    pub fn new(today: impl Into<String>) -> Self {
        Self {
            today: today.into(),
        }
    }

    /// Apply one fetch result to the state store.
    ///
    /// Records the display name, and on a content change rewrites the
    /// company's record and appends a change line. Returns whether a
    /// change was recorded.
    pub fn apply(
        &self,
        co_id: &str,
        disclosure: &Disclosure,
        state: &mut StateStore,
        outcome: &mut RunOutcome,
    ) -> bool {
        let name = disclosure.name.clone().unwrap_or_else(|| co_id.to_string());
        outcome.names.insert(co_id.to_string(), name);

        let Some(content) = disclosure.content.as_deref() else {
            return false;
        };
        if content.is_empty() {
            return false;
        }
        if state.get(co_id).is_some_and(|prev| prev.content == content) {
            return false;
        }

        state.insert(
            co_id.to_string(),
            DisclosureRecord::new(content, &self.today),
        );
        outcome.changes.push(format!(
            "**{} {}**",
            co_id,
            disclosure.name.as_deref().unwrap_or("")
        ));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disclosure(name: Option<&str>, content: Option<&str>) -> Disclosure {
        Disclosure {
            name: name.map(str::to_string),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn first_observation_is_a_change() {
        let detector = ChangeDetector::new("2026/08/23");
        let mut state = StateStore::new();
        let mut outcome = RunOutcome::default();

        let changed = detector.apply(
            "2330",
            &disclosure(Some("台積電"), Some("2026/09/10")),
            &mut state,
            &mut outcome,
        );

        assert!(changed);
        assert_eq!(outcome.changes, vec!["**2330 台積電**"]);
        assert_eq!(
            state["2330"],
            DisclosureRecord::new("2026/09/10", "2026/08/23")
        );
    }

    #[test]
    fn content_change_rewrites_record_and_announces_once() {
        let detector = ChangeDetector::new("2026/08/23");
        let mut state = StateStore::new();
        state.insert("2330".into(), DisclosureRecord::new("2024/05/01", "2024/04/20"));
        state.insert("2454".into(), DisclosureRecord::new("2024/03/01", "2024/02/15"));
        let mut outcome = RunOutcome::default();

        detector.apply(
            "2330",
            &disclosure(Some("台積電"), Some("2024/06/10")),
            &mut state,
            &mut outcome,
        );

        assert_eq!(outcome.change_count(), 1);
        assert_eq!(
            state["2330"],
            DisclosureRecord::new("2024/06/10", "2026/08/23")
        );
        // other records untouched
        assert_eq!(
            state["2454"],
            DisclosureRecord::new("2024/03/01", "2024/02/15")
        );
    }

    #[test]
    fn unchanged_content_is_a_no_op() {
        let detector = ChangeDetector::new("2026/08/23");
        let mut state = StateStore::new();
        state.insert("2330".into(), DisclosureRecord::new("2024/05/01", "2024/04/20"));
        let mut outcome = RunOutcome::default();

        let changed = detector.apply(
            "2330",
            &disclosure(Some("台積電"), Some("2024/05/01")),
            &mut state,
            &mut outcome,
        );

        assert!(!changed);
        assert!(!outcome.has_changes());
        // record untouched, including the updated stamp
        assert_eq!(
            state["2330"],
            DisclosureRecord::new("2024/05/01", "2024/04/20")
        );
    }

    #[test]
    fn absent_content_leaves_prior_record_untouched() {
        let detector = ChangeDetector::new("2026/08/23");
        let mut state = StateStore::new();
        state.insert("2330".into(), DisclosureRecord::new("2024/05/01", "2024/04/20"));
        let mut outcome = RunOutcome::default();

        let changed = detector.apply("2330", &disclosure(None, None), &mut state, &mut outcome);

        assert!(!changed);
        assert_eq!(
            state["2330"],
            DisclosureRecord::new("2024/05/01", "2024/04/20")
        );
    }

    #[test]
    fn empty_content_is_a_no_op() {
        let detector = ChangeDetector::new("2026/08/23");
        let mut state = StateStore::new();
        let mut outcome = RunOutcome::default();

        let changed = detector.apply(
            "2330",
            &disclosure(Some("台積電"), Some("")),
            &mut state,
            &mut outcome,
        );

        assert!(!changed);
        assert!(state.is_empty());
    }

    #[test]
    fn second_pass_over_same_content_announces_nothing() {
        let detector = ChangeDetector::new("2026/08/23");
        let mut state = StateStore::new();
        let mut outcome = RunOutcome::default();
        let fetched = disclosure(Some("台積電"), Some("2026/09/10"));

        detector.apply("2330", &fetched, &mut state, &mut outcome);
        let snapshot = state.clone();

        let mut second = RunOutcome::default();
        let changed = detector.apply("2330", &fetched, &mut state, &mut second);

        assert!(!changed);
        assert!(!second.has_changes());
        assert_eq!(state, snapshot);
    }

    #[test]
    fn change_line_uses_bare_code_when_name_absent() {
        let detector = ChangeDetector::new("2026/08/23");
        let mut state = StateStore::new();
        let mut outcome = RunOutcome::default();

        detector.apply(
            "2330",
            &disclosure(None, Some("2026/09/10")),
            &mut state,
            &mut outcome,
        );

        assert_eq!(outcome.changes, vec!["**2330 **"]);
        assert_eq!(outcome.display_name("2330"), "2330");
    }
}
