//! Error types for ussd-engine.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for ussd-engine operations.
///
/// Invalid user input and unknown menu states are not errors: the
/// navigator answers those with fixed response text. Only configuration
/// and store failures end up here.
#[derive(Error, Debug)]
pub enum UssdError {
    /// Menu definition file could not be read or parsed.
    #[error("failed to load menu definition '{}': {reason}", .path.display())]
    MenuLoad { path: PathBuf, reason: String },

    /// In-memory menu definition could not be parsed.
    #[error("invalid menu definition: {0}")]
    MenuParse(#[source] serde_json::Error),

    /// Session store backend failure.
    #[error("session store error: {0}")]
    Store(String),

    /// Session record could not be encoded or decoded.
    #[error("session record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for ussd-engine operations.
pub type Result<T> = std::result::Result<T, UssdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_load_display() {
        let err = UssdError::MenuLoad {
            path: PathBuf::from("/srv/menus/airtime.json"),
            reason: "No such file or directory".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/menus/airtime.json"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_store_error_display() {
        let err = UssdError::Store("connection refused".into());
        assert!(err.to_string().contains("session store error"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: UssdError = json_err.into();
        assert!(matches!(err, UssdError::Serialization(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: UssdError = io_err.into();
        assert!(matches!(err, UssdError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }
}
