//! Persisted per-session record.

use serde::{Deserialize, Serialize};

/// Navigation state stored for one session.
///
/// A missing record, a missing `state` and an empty `state` all mean the
/// session sits at its initial state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    /// Current menu state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Previously visited states, most recent last.
    pub history: Vec<String>,
}

impl SessionRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state, treating an empty string as absent.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref().filter(|s| !s.is_empty())
    }

    /// Current state, or `initial` when unset.
    pub fn state_or<'a>(&'a self, initial: &'a str) -> &'a str {
        self.state().unwrap_or(initial)
    }
}
