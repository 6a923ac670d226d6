//! Session storage contract and bundled backends.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use tracing::{debug, warn};

use super::SessionRecord;
use crate::error::UssdError;
use crate::Result;

/// Key-value storage for session records.
///
/// Implementations decide how records are encoded and how concurrent
/// writers are handled. A navigation call reads the record once and writes
/// it at most once. Nothing is locked between the read and the write, so
/// concurrent requests for the same session are last-write-wins unless the
/// backend serializes them.
pub trait SessionStore: Send + Sync {
    /// Get the stored record, `None` if the session has none.
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>>;

    /// Persist a record, replacing any prior value.
    fn set(&self, session_id: &str, record: SessionRecord) -> Result<()>;

    /// Get the stored record, or `default` when absent.
    fn get_or(&self, session_id: &str, default: SessionRecord) -> Result<SessionRecord> {
        Ok(self.get(session_id)?.unwrap_or(default))
    }

    /// Acquire any external resource the backend needs.
    fn open(&self) -> Result<()> {
        Ok(())
    }

    /// Release any external resource the backend holds.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Read a session's record, or an empty one if nothing is stored.
pub fn resolve_record<S>(store: &S, session_id: &str) -> Result<SessionRecord>
where
    S: SessionStore + ?Sized,
{
    store.get_or(session_id, SessionRecord::default())
}

/// Guard that opens a store on creation and closes it exactly once.
///
/// Call [`finish`](Self::finish) to observe close errors; otherwise the
/// store is closed on drop and failures are only logged.
pub struct ScopedStore<'a, S: SessionStore + ?Sized> {
    store: &'a S,
    closed: bool,
}

impl<'a, S: SessionStore + ?Sized> ScopedStore<'a, S> {
    /// Open the store and wrap it.
    pub fn open(store: &'a S) -> Result<Self> {
        store.open()?;
        Ok(Self {
            store,
            closed: false,
        })
    }

    /// Close the store now, surfacing any error.
    pub fn finish(mut self) -> Result<()> {
        self.closed = true;
        self.store.close()
    }
}

impl<S: SessionStore + ?Sized> Deref for ScopedStore<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: SessionStore + ?Sized> Drop for ScopedStore<'_, S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.store.close() {
            warn!("Failed to close session store: {}", e);
        }
    }
}

/// In-process store keeping records as native values.
pub struct InMemorySessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Remove a session's record.
    pub fn remove(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let mut records = self
            .records
            .write()
            .map_err(|_| UssdError::LockPoisoned)?;
        Ok(records.remove(session_id))
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let records = self.records.read().map_err(|_| UssdError::LockPoisoned)?;
        Ok(records.get(session_id).cloned())
    }

    fn set(&self, session_id: &str, record: SessionRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| UssdError::LockPoisoned)?;
        records.insert(session_id.to_string(), record);
        Ok(())
    }
}

/// Store that keeps records as compact JSON text.
///
/// Mirrors what a cache or database backend has to do: encode on write,
/// decode on read. Decode failures surface as
/// [`UssdError::Serialization`]. `open`/`close` track live handles the way
/// a client connection would; records outlive every handle.
pub struct JsonSessionStore {
    entries: RwLock<HashMap<String, String>>,
    handles: AtomicUsize,
}

impl JsonSessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            handles: AtomicUsize::new(0),
        }
    }

    /// Number of handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.handles.load(Ordering::SeqCst)
    }

    /// Get the encoded form of a session's record.
    pub fn raw(&self, session_id: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| UssdError::LockPoisoned)?;
        Ok(entries.get(session_id).cloned())
    }

    /// Store an encoded value as-is, bypassing serialization.
    pub fn set_raw(&self, session_id: &str, value: impl Into<String>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| UssdError::LockPoisoned)?;
        entries.insert(session_id.to_string(), value.into());
        Ok(())
    }
}

impl Default for JsonSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for JsonSessionStore {
    fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        match self.raw(session_id)? {
            Some(encoded) => Ok(Some(serde_json::from_str(&encoded)?)),
            None => Ok(None),
        }
    }

    fn set(&self, session_id: &str, record: SessionRecord) -> Result<()> {
        let encoded = serde_json::to_string(&record)?;
        self.set_raw(session_id, encoded)
    }

    fn open(&self) -> Result<()> {
        let handles = self.handles.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(handles, "Session store handle acquired");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let previous = self
            .handles
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);
        debug!(handles = previous.saturating_sub(1), "Session store handle released");
        Ok(())
    }
}
