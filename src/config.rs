//! Configuration management for ussd-engine.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file (JSON)
//! 3. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{
    NavigationSettings, INVALID_OPTION_MESSAGE, INVALID_STATE_MESSAGE, MENU_STATE_END,
    MENU_STATE_START,
};

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Menu definition settings.
    pub menu: MenuSection,
    /// Fixed user-facing responses.
    pub messages: MessagesSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Menu configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSection {
    /// Path to the menu definition file.
    pub path: Option<PathBuf>,
    /// State a fresh session starts in.
    pub initial_state: String,
    /// Exit state, exempt from history.
    pub terminal_state: String,
}

impl Default for MenuSection {
    fn default() -> Self {
        Self {
            path: None,
            initial_state: MENU_STATE_START.to_string(),
            terminal_state: MENU_STATE_END.to_string(),
        }
    }
}

/// Response text section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesSection {
    /// Shown when input matches no option.
    pub invalid_option: String,
    /// Shown when a state has no menu node.
    pub invalid_state: String,
}

impl Default for MessagesSection {
    fn default() -> Self {
        Self {
            invalid_option: INVALID_OPTION_MESSAGE.to_string(),
            invalid_state: INVALID_STATE_MESSAGE.to_string(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("USSD_MENU_PATH").filter(|p| !p.is_empty()) {
            self.menu.path = Some(PathBuf::from(path));
        }

        if let Some(state) = var("USSD_INITIAL_STATE").filter(|s| !s.is_empty()) {
            self.menu.initial_state = state;
        }

        if let Some(state) = var("USSD_TERMINAL_STATE").filter(|s| !s.is_empty()) {
            self.menu.terminal_state = state;
        }

        if let Some(level) = var("USSD_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: env vars > config file > defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();

        Ok(config)
    }

    /// Get the configured menu file path.
    pub fn menu_path(&self) -> Result<&Path, ConfigError> {
        self.menu.path.as_deref().ok_or(ConfigError::MissingMenuPath)
    }

    /// Convert to settings for a [`Navigator`](crate::engine::Navigator).
    pub fn navigation_settings(&self) -> NavigationSettings {
        NavigationSettings {
            initial_state: self.menu.initial_state.clone(),
            terminal_state: self.menu.terminal_state.clone(),
            invalid_option_message: self.messages.invalid_option.clone(),
            invalid_state_message: self.messages.invalid_state.clone(),
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// No menu path configured.
    MissingMenuPath,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::MissingMenuPath => write!(f, "no menu definition path configured"),
        }
    }
}

impl std::error::Error for ConfigError {}
