//! Service request lifecycle state and its storage/display mapping.
//!
//! The canonical form is what the API renders and accepts. The stored form is
//! what sits in the database; they only differ for `InProgress`, which older
//! rows (and every write) persist as `en_progreso`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle stage of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Pending,
    UnderReview,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

/// Legacy spelling persisted for `InProgress`.
pub const LEGACY_IN_PROGRESS_STORED: &str = "en_progreso";

/// Legacy user-facing spelling for `InProgress`.
pub const LEGACY_IN_PROGRESS_DISPLAY: &str = "en_proceso";

/// Error for text that does not name a known state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown request state: {0}")]
pub struct UnknownState(pub String);

lazy_static::lazy_static! {
    static ref SEPARATOR_REGEX: regex::Regex = regex::Regex::new(r"\s+|-+").unwrap();
}

impl RequestState {
    /// All states in lifecycle order.
    pub const ALL: [RequestState; 6] = [
        RequestState::Pending,
        RequestState::UnderReview,
        RequestState::Assigned,
        RequestState::InProgress,
        RequestState::Completed,
        RequestState::Cancelled,
    ];

    /// Canonical display form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => "pending",
            RequestState::UnderReview => "under_review",
            RequestState::Assigned => "assigned",
            RequestState::InProgress => "in_progress",
            RequestState::Completed => "completed",
            RequestState::Cancelled => "cancelled",
        }
    }

    /// Form written to the database.
    pub fn as_stored(&self) -> &'static str {
        match self {
            RequestState::InProgress => LEGACY_IN_PROGRESS_STORED,
            other => other.as_str(),
        }
    }

    /// Decodes a persisted value. Accepts the stored and canonical spellings.
    pub fn from_stored(value: &str) -> Result<Self, UnknownState> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_stored() == value || state.as_str() == value)
            .ok_or_else(|| UnknownState(value.to_string()))
    }

    /// Parses caller-supplied text.
    ///
    /// Trims, lower-cases and folds whitespace/hyphen runs into `_` before
    /// looking the value up, so `"In Progress"`, `"in-progress"` and the legacy
    /// `"en_proceso"` all resolve to `InProgress`.
    pub fn parse_input(raw: &str) -> Result<Self, UnknownState> {
        let folded = SEPARATOR_REGEX
            .replace_all(&raw.trim().to_lowercase(), "_")
            .into_owned();

        if folded == LEGACY_IN_PROGRESS_DISPLAY {
            return Ok(RequestState::InProgress);
        }

        Self::from_stored(&folded).map_err(|_| UnknownState(raw.to_string()))
    }

    /// Terminal states accept no further work without an explicit reopen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Completed | RequestState::Cancelled)
    }

    /// Intake states are the ones a technician push advances to `Assigned`.
    pub fn is_intake(&self) -> bool {
        matches!(self, RequestState::Pending | RequestState::UnderReview)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_input(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(RequestState::Pending.to_string(), "pending");
        assert_eq!(RequestState::UnderReview.to_string(), "under_review");
        assert_eq!(RequestState::Assigned.to_string(), "assigned");
        assert_eq!(RequestState::InProgress.to_string(), "in_progress");
        assert_eq!(RequestState::Completed.to_string(), "completed");
        assert_eq!(RequestState::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_in_progress_is_stored_with_legacy_spelling() {
        assert_eq!(RequestState::InProgress.as_stored(), "en_progreso");
        for state in RequestState::ALL {
            if state != RequestState::InProgress {
                assert_eq!(state.as_stored(), state.as_str());
            }
        }
    }

    #[test]
    fn test_stored_round_trip_renders_canonical() {
        for state in RequestState::ALL {
            let decoded = RequestState::from_stored(state.as_stored()).unwrap();
            assert_eq!(decoded, state);
        }
        let decoded = RequestState::from_stored("en_progreso").unwrap();
        assert_eq!(decoded.to_string(), "in_progress");
    }

    #[test]
    fn test_from_stored_rejects_unknown() {
        assert_eq!(
            RequestState::from_stored("archived"),
            Err(UnknownState("archived".to_string()))
        );
    }

    #[test]
    fn test_parse_input_normalizes() {
        assert_eq!(
            RequestState::parse_input("  In Progress ").unwrap(),
            RequestState::InProgress
        );
        assert_eq!(
            RequestState::parse_input("in-progress").unwrap(),
            RequestState::InProgress
        );
        assert_eq!(
            RequestState::parse_input("UNDER   REVIEW").unwrap(),
            RequestState::UnderReview
        );
        assert_eq!(
            RequestState::parse_input("under--review").unwrap(),
            RequestState::UnderReview
        );
        assert_eq!(
            RequestState::parse_input("CANCELLED").unwrap(),
            RequestState::Cancelled
        );
    }

    #[test]
    fn test_parse_input_accepts_legacy_spellings() {
        assert_eq!(
            RequestState::parse_input("en_proceso").unwrap(),
            RequestState::InProgress
        );
        assert_eq!(
            RequestState::parse_input("en-progreso").unwrap(),
            RequestState::InProgress
        );
    }

    #[test]
    fn test_parse_input_rejects_unknown() {
        assert!(RequestState::parse_input("done").is_err());
        assert!(RequestState::parse_input("").is_err());
    }

    #[test]
    fn test_serde_uses_canonical_form() {
        let json = serde_json::to_string(&RequestState::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let state: RequestState = serde_json::from_str("\"under_review\"").unwrap();
        assert_eq!(state, RequestState::UnderReview);
    }

    #[test]
    fn test_terminal_and_intake() {
        assert!(RequestState::Completed.is_terminal());
        assert!(RequestState::Cancelled.is_terminal());
        assert!(!RequestState::InProgress.is_terminal());
        assert!(RequestState::Pending.is_intake());
        assert!(RequestState::UnderReview.is_intake());
        assert!(!RequestState::Assigned.is_intake());
    }
}
