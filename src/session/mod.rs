//! Session persistence.
//!
//! This module provides the per-session record, the storage contract the
//! engine reads and writes through, and two bundled backends.

mod record;
mod store;

pub use record::SessionRecord;
pub use store::{
    resolve_record, InMemorySessionStore, JsonSessionStore, ScopedStore, SessionStore,
};
