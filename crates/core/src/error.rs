//! Error types for U-Cutstock.

use thiserror::Error;

/// Result type alias for U-Cutstock operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while optimizing a cutting layout.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid request, panel, piece or strategy selection.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal failure inside a placement strategy.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Every strategy in the fallback chain failed.
    #[error("All strategies failed (attempted: {}); last error: {last}", .attempted.join(", "))]
    Exhausted {
        /// Names of the strategies that were attempted, in order.
        attempted: Vec<String>,
        /// The failure reported by the last attempted strategy.
        #[source]
        last: Box<Error>,
    },
}

impl Error {
    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::ConfigError(_))
    }

    /// Returns true when the fallback chain was exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_names_last_failure() {
        let err = Error::Exhausted {
            attempted: vec!["a".to_string(), "b".to_string()],
            last: Box::new(Error::ExecutionError("beam emptied".to_string())),
        };

        let message = err.to_string();
        assert!(message.contains("a, b"));
        assert!(message.contains("beam emptied"));
        assert!(err.is_exhausted());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_predicate() {
        assert!(Error::ConfigError("no panel".into()).is_config());
        assert!(!Error::ExecutionError("x".into()).is_config());
    }
}
