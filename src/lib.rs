//! # ussd-engine
//!
//! Session state engine for menu-driven USSD flows.
//!
//! A session walks a tree of prompts defined in a JSON menu. Each input
//! either selects an option, fills a free-text prompt, or is rejected with
//! a fixed message. Visited menus are kept in a per-session history so the
//! user can step back.
//!
//! ## Features
//!
//! - **Declarative menus**: JSON node definitions with options and free-text prompts
//! - **Backtracking**: history stack with pop-then-peek `go_back`
//! - **Pluggable storage**: any backend implementing [`SessionStore`]
//! - **Graceful failures**: bad input and undefined states render fixed text
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ussd_engine::{InMemorySessionStore, Navigator};
//!
//! fn main() -> ussd_engine::Result<()> {
//!     ussd_engine::logging::try_init().ok();
//!
//!     let store = Arc::new(InMemorySessionStore::new());
//!     let nav = Navigator::open("session-1", store, "menu.json", None)?;
//!
//!     println!("{}", nav.process_input("1")?);
//!     println!("{}", nav.go_back()?);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod menu;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use engine::{NavigationSettings, Navigator, Outcome, StateEngine};
pub use error::{Result, UssdError};
pub use menu::{MenuModel, MenuNode};
pub use session::{InMemorySessionStore, JsonSessionStore, ScopedStore, SessionRecord, SessionStore};
