//! Menu navigation.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::StateEngine;
use crate::menu::{MenuModel, MenuNode};
use crate::session::{SessionRecord, SessionStore};
use crate::Result;

/// Default start state.
pub const MENU_STATE_START: &str = "start";
/// Default terminal state, never pushed onto history.
pub const MENU_STATE_END: &str = "end";
/// Response for input that matches no transition.
pub const INVALID_OPTION_MESSAGE: &str = "Invalid option";
/// Response for a state with no menu node.
pub const INVALID_STATE_MESSAGE: &str = "Invalid state";

/// Distinguished states and fixed responses used by a [`Navigator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSettings {
    pub initial_state: String,
    pub terminal_state: String,
    pub invalid_option_message: String,
    pub invalid_state_message: String,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            initial_state: MENU_STATE_START.to_string(),
            terminal_state: MENU_STATE_END.to_string(),
            invalid_option_message: INVALID_OPTION_MESSAGE.to_string(),
            invalid_state_message: INVALID_STATE_MESSAGE.to_string(),
        }
    }
}

impl NavigationSettings {
    /// Override the initial state.
    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = state.into();
        self
    }
}

/// Result of evaluating one input against the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Transition happened; carries the text to show.
    Rendered(String),
    /// Input matched nothing. State unchanged.
    InvalidOption,
    /// Current or target state has no menu node. State unchanged.
    InvalidState,
}

/// Drives one session through a menu.
pub struct Navigator {
    menu: Arc<MenuModel>,
    state: StateEngine,
    settings: NavigationSettings,
}

impl Navigator {
    /// Create a navigator with default settings.
    ///
    /// `initial_state` falls back to [`MENU_STATE_START`].
    pub fn new(
        session_id: impl Into<String>,
        store: Arc<dyn SessionStore>,
        menu: Arc<MenuModel>,
        initial_state: Option<&str>,
    ) -> Self {
        let mut settings = NavigationSettings::default();
        if let Some(initial) = initial_state {
            settings.initial_state = initial.to_string();
        }
        Self::with_settings(session_id, store, menu, settings)
    }

    /// Create a navigator with explicit settings.
    pub fn with_settings(
        session_id: impl Into<String>,
        store: Arc<dyn SessionStore>,
        menu: Arc<MenuModel>,
        settings: NavigationSettings,
    ) -> Self {
        let state = StateEngine::new(session_id, settings.initial_state.clone(), store);
        Self {
            menu,
            state,
            settings,
        }
    }

    /// Load the menu from a file and create a navigator.
    ///
    /// Fails with [`UssdError::MenuLoad`](crate::UssdError::MenuLoad) if the
    /// file is missing or malformed.
    pub fn open(
        session_id: impl Into<String>,
        store: Arc<dyn SessionStore>,
        menu_path: impl AsRef<Path>,
        initial_state: Option<&str>,
    ) -> Result<Self> {
        let menu = MenuModel::load(menu_path)?;
        Ok(Self::new(session_id, store, Arc::new(menu), initial_state))
    }

    pub fn state_engine(&self) -> &StateEngine {
        &self.state
    }

    pub fn menu(&self) -> &MenuModel {
        &self.menu
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    /// Apply user input and return the text to show.
    pub fn process_input(&self, user_input: &str) -> Result<String> {
        let outcome = self.evaluate(user_input)?;
        Ok(self.render(outcome))
    }

    /// Step back one menu and return its text.
    pub fn go_back(&self) -> Result<String> {
        let state = self.state.go_back()?;

        match self.menu.lookup(&state).filter(|node| !node.text.is_empty()) {
            Some(node) => Ok(node.text.clone()),
            None => {
                warn!(
                    session = %self.state.session_id(),
                    state = %state,
                    "Went back to undefined state"
                );
                Ok(self.settings.invalid_state_message.clone())
            }
        }
    }

    /// Apply user input and return the structured outcome.
    ///
    /// The session record is read once and, on a transition, written once.
    pub fn evaluate(&self, user_input: &str) -> Result<Outcome> {
        let record = self.state.snapshot()?;
        let current = self.state.state_in(&record).to_string();

        let Some(node) = self.menu.lookup(&current) else {
            warn!(
                session = %self.state.session_id(),
                state = %current,
                "Current state has no menu node"
            );
            return Ok(Outcome::InvalidOption);
        };

        if node.input_required {
            return self.advance_prompt(record, &current, node, user_input);
        }

        match node.target_for(user_input) {
            Some(target) => self.follow_option(record, &current, target),
            None => {
                debug!(
                    session = %self.state.session_id(),
                    state = %current,
                    "No option matches input"
                );
                Ok(Outcome::InvalidOption)
            }
        }
    }

    /// Free-text prompts move to `next_state` without touching history.
    fn advance_prompt(
        &self,
        record: SessionRecord,
        current: &str,
        node: &MenuNode,
        user_input: &str,
    ) -> Result<Outcome> {
        let Some(next) = node.next_state.as_deref() else {
            warn!(session = %self.state.session_id(), "Prompt node has no next_state");
            return Ok(Outcome::InvalidState);
        };

        self.state.commit(record, current, next, false)?;
        let text = self
            .menu
            .lookup(next)
            .map(|target| target.render(user_input))
            .unwrap_or_default();
        Ok(Outcome::Rendered(text))
    }

    fn follow_option(&self, record: SessionRecord, current: &str, target: &str) -> Result<Outcome> {
        let Some(node) = self.menu.lookup(target) else {
            warn!(
                session = %self.state.session_id(),
                from = current,
                to = target,
                "Option targets undefined state"
            );
            return Ok(Outcome::InvalidState);
        };

        let push_history = target != self.settings.terminal_state;
        self.state.commit(record, current, target, push_history)?;

        Ok(Outcome::Rendered(node.text.clone()))
    }

    fn render(&self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Rendered(text) => text,
            Outcome::InvalidOption => self.settings.invalid_option_message.clone(),
            Outcome::InvalidState => self.settings.invalid_state_message.clone(),
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("state", &self.state)
            .field("menu_states", &self.menu.len())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{InMemorySessionStore, SessionRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SESSION: &str = "test-session-id";

    fn menu() -> Arc<MenuModel> {
        Arc::new(MenuModel::from_nodes([
            (
                "start",
                MenuNode::with_options(
                    "Welcome\n1. Balance\n2. Buy\n3. Exit",
                    [("1", "balance"), ("2", "buy"), ("3", "end"), ("4", "missing")],
                ),
            ),
            (
                "balance",
                MenuNode::with_options("Your balance is $10.\n0. Back", [("0", "start")]),
            ),
            ("buy", MenuNode::prompt("Amount:", "confirm")),
            (
                "confirm",
                MenuNode::with_options("Buy ${input}?\n1. Yes\n2. No", [("2", "start")]),
            ),
            ("broken_prompt", MenuNode::prompt("Amount:", "nowhere")),
            ("end", MenuNode::text_only("Goodbye")),
        ]))
    }

    /// Counts reads and writes while delegating to an in-memory store.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemorySessionStore,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl SessionStore for CountingStore {
        fn get(&self, session_id: &str) -> Result<Option<SessionRecord>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(session_id)
        }

        fn set(&self, session_id: &str, record: SessionRecord) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(session_id, record)
        }
    }

    fn navigator() -> (Navigator, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        let nav = Navigator::new(SESSION, store.clone(), menu(), None);
        (nav, store)
    }

    #[test]
    fn test_option_transition_pushes_history() {
        let (nav, _) = navigator();

        assert_eq!(
            nav.process_input("1").unwrap(),
            "Your balance is $10.\n0. Back"
        );
        assert_eq!(nav.state_engine().current_state().unwrap(), "balance");
        assert_eq!(nav.state_engine().history().unwrap(), vec!["start"]);
    }

    #[test]
    fn test_option_transition_writes_once() {
        let (nav, store) = navigator();

        nav.process_input("1").unwrap();

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prompt_transition_writes_once() {
        let (nav, store) = navigator();
        nav.process_input("2").unwrap();
        let (reads, writes) = (
            store.reads.load(Ordering::SeqCst),
            store.writes.load(Ordering::SeqCst),
        );

        nav.process_input("10").unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), reads + 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), writes + 1);
    }

    #[test]
    fn test_invalid_option_leaves_state() {
        let (nav, store) = navigator();

        assert_eq!(nav.process_input("9").unwrap(), INVALID_OPTION_MESSAGE);
        assert_eq!(nav.evaluate("").unwrap(), Outcome::InvalidOption);
        assert_eq!(nav.state_engine().current_state().unwrap(), "start");
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prompt_substitutes_input_without_history() {
        let (nav, _) = navigator();
        nav.process_input("2").unwrap();
        assert_eq!(nav.state_engine().history().unwrap(), vec!["start"]);

        assert_eq!(nav.process_input("10").unwrap(), "Buy 10?\n1. Yes\n2. No");
        assert_eq!(nav.state_engine().current_state().unwrap(), "confirm");
        assert_eq!(nav.state_engine().history().unwrap(), vec!["start"]);
    }

    #[test]
    fn test_prompt_to_undefined_state_renders_empty() {
        let (nav, _) = navigator();
        nav.state_engine().set_state("broken_prompt").unwrap();

        assert_eq!(nav.process_input("5").unwrap(), "");
        assert_eq!(nav.state_engine().current_state().unwrap(), "nowhere");
    }

    #[test]
    fn test_prompt_without_next_state_is_invalid_state() {
        let menu = Arc::new(MenuModel::from_nodes([(
            "start",
            MenuNode {
                text: "Amount:".into(),
                input_required: true,
                ..Default::default()
            },
        )]));
        let store = Arc::new(CountingStore::default());
        let nav = Navigator::new(SESSION, store.clone(), menu, None);

        assert_eq!(nav.evaluate("5").unwrap(), Outcome::InvalidState);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exit_does_not_store_history() {
        let (nav, store) = navigator();

        assert_eq!(nav.process_input("3").unwrap(), "Goodbye");
        assert!(nav.state_engine().history().unwrap().is_empty());
        assert_eq!(nav.state_engine().current_state().unwrap(), "end");
        // Only the state write, no history write
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_option_to_undefined_state_is_invalid_state() {
        let (nav, store) = navigator();

        assert_eq!(nav.process_input("4").unwrap(), INVALID_STATE_MESSAGE);
        assert_eq!(nav.state_engine().current_state().unwrap(), "start");
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_current_state_is_invalid_option() {
        let (nav, store) = navigator();
        nav.state_engine().set_state("ghost").unwrap();
        let writes = store.writes.load(Ordering::SeqCst);

        assert_eq!(nav.process_input("1").unwrap(), INVALID_OPTION_MESSAGE);
        assert_eq!(store.writes.load(Ordering::SeqCst), writes);
    }

    #[test]
    fn test_go_back_renders_previous_menu() {
        let (nav, _) = navigator();
        nav.process_input("1").unwrap();

        assert_eq!(
            nav.go_back().unwrap(),
            "Welcome\n1. Balance\n2. Buy\n3. Exit"
        );
        assert_eq!(nav.state_engine().current_state().unwrap(), "start");
    }

    #[test]
    fn test_go_back_to_undefined_state() {
        let menu = Arc::new(MenuModel::from_nodes([(
            "balance",
            MenuNode::text_only("Balance"),
        )]));
        let store = Arc::new(InMemorySessionStore::new());
        let settings = NavigationSettings::default().with_initial_state("home");
        let nav = Navigator::with_settings(SESSION, store, menu, settings);

        assert_eq!(nav.go_back().unwrap(), INVALID_STATE_MESSAGE);
    }

    #[test]
    fn test_custom_settings() {
        let settings = NavigationSettings {
            invalid_option_message: "Try again".into(),
            terminal_state: "balance".into(),
            ..NavigationSettings::default()
        };
        let store = Arc::new(InMemorySessionStore::new());
        let nav = Navigator::with_settings(SESSION, store, menu(), settings);

        assert_eq!(nav.process_input("7").unwrap(), "Try again");
        nav.process_input("1").unwrap();
        assert!(nav.state_engine().history().unwrap().is_empty());
    }

    #[test]
    fn test_custom_initial_state() {
        let store = Arc::new(InMemorySessionStore::new());
        let nav = Navigator::new(SESSION, store, menu(), Some("balance"));

        assert_eq!(nav.process_input("0").unwrap(), "Welcome\n1. Balance\n2. Buy\n3. Exit");
        assert_eq!(nav.state_engine().history().unwrap(), vec!["balance"]);
    }

    #[test]
    fn test_store_errors_propagate() {
        struct FailingStore;

        impl SessionStore for FailingStore {
            fn get(&self, _: &str) -> Result<Option<SessionRecord>> {
                Err(crate::UssdError::Store("connection refused".into()))
            }

            fn set(&self, _: &str, _: SessionRecord) -> Result<()> {
                Ok(())
            }
        }

        let nav = Navigator::new(SESSION, Arc::new(FailingStore), menu(), None);
        assert!(matches!(
            nav.process_input("1"),
            Err(crate::UssdError::Store(_))
        ));
        assert!(nav.go_back().is_err());
    }
}
