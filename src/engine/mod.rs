//! Session state engine and menu navigation.
//!
//! [`StateEngine`] owns the current state and history of one session;
//! [`Navigator`] interprets a [`MenuModel`](crate::menu::MenuModel) on top
//! of it to turn user input into the next prompt.

mod navigator;
mod state;

pub use navigator::{
    NavigationSettings, Navigator, Outcome, INVALID_OPTION_MESSAGE, INVALID_STATE_MESSAGE,
    MENU_STATE_END, MENU_STATE_START,
};
pub use state::StateEngine;
