//! Per-session state and history tracking.

use std::sync::Arc;

use tracing::debug;

use crate::session::{resolve_record, SessionRecord, SessionStore};
use crate::Result;

/// Tracks the current menu state and backtracking history of one session.
///
/// Every operation reads the session's record fresh from the store; nothing
/// is cached between calls.
#[derive(Clone)]
pub struct StateEngine {
    session_id: String,
    initial_state: String,
    store: Arc<dyn SessionStore>,
}

impl StateEngine {
    /// Create an engine bound to one session.
    pub fn new(
        session_id: impl Into<String>,
        initial_state: impl Into<String>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            initial_state: initial_state.into(),
            store,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    fn load(&self) -> Result<SessionRecord> {
        resolve_record(self.store.as_ref(), &self.session_id)
    }

    fn save(&self, record: SessionRecord) -> Result<()> {
        self.store.set(&self.session_id, record)
    }

    /// Read the session record once, to be committed with [`commit`](Self::commit).
    pub fn snapshot(&self) -> Result<SessionRecord> {
        self.load()
    }

    /// State held by `record`, falling back to the initial state.
    pub fn state_in<'a>(&'a self, record: &'a SessionRecord) -> &'a str {
        record.state_or(&self.initial_state)
    }

    /// Get the current state, falling back to the initial state.
    pub fn current_state(&self) -> Result<String> {
        let record = self.load()?;
        Ok(record.state_or(&self.initial_state).to_string())
    }

    /// Get the recorded history, oldest first.
    pub fn history(&self) -> Result<Vec<String>> {
        Ok(self.load()?.history)
    }

    /// Overwrite the current state. History is left untouched.
    pub fn set_state(&self, state: &str) -> Result<()> {
        let mut record = self.load()?;
        record.state = Some(state.to_string());
        debug!(session = %self.session_id, state, "State set");
        self.save(record)
    }

    /// Append a state to the history. Duplicates are kept.
    pub fn store_history(&self, state: &str) -> Result<()> {
        let mut record = self.load()?;
        record.history.push(state.to_string());
        debug!(
            session = %self.session_id,
            state,
            depth = record.history.len(),
            "History pushed"
        );
        self.save(record)
    }

    /// Move from `from` to `to` in one read-modify-write.
    ///
    /// `from` is appended to history first when `push_history` is set, so a
    /// failed write leaves neither the history entry nor the new state.
    pub fn advance(&self, from: &str, to: &str, push_history: bool) -> Result<()> {
        let record = self.load()?;
        self.commit(record, from, to, push_history)
    }

    /// Apply a transition to a record from [`snapshot`](Self::snapshot) and
    /// write it back. Issues exactly one write and no read.
    pub fn commit(
        &self,
        mut record: SessionRecord,
        from: &str,
        to: &str,
        push_history: bool,
    ) -> Result<()> {
        if push_history {
            record.history.push(from.to_string());
        }
        record.state = Some(to.to_string());
        debug!(
            session = %self.session_id,
            from,
            to,
            depth = record.history.len(),
            "Advanced"
        );
        self.save(record)
    }

    /// Step back one hop and return the resulting state.
    ///
    /// Pops the newest history entry and moves to the one beneath it, or to
    /// the initial state when history runs out. With empty history nothing
    /// is written and the current state is returned.
    pub fn go_back(&self) -> Result<String> {
        let mut record = self.load()?;

        if record.history.pop().is_none() {
            return Ok(record.state_or(&self.initial_state).to_string());
        }

        let state = record
            .history
            .last()
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| self.initial_state.clone());
        record.state = Some(state.clone());
        debug!(
            session = %self.session_id,
            state = %state,
            depth = record.history.len(),
            "Went back"
        );
        self.save(record)?;

        Ok(state)
    }
}

impl std::fmt::Debug for StateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateEngine")
            .field("session_id", &self.session_id)
            .field("initial_state", &self.initial_state)
            .finish_non_exhaustive()
    }
}
