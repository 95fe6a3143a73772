//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Suite loading error
    #[error("Suite error: {message}")]
    Suite {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejugar library error
    #[error("Rejugar error: {0}")]
    Rejugar(#[from] rejugar::RejugarError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a suite loading error
    #[must_use]
    pub fn suite(message: impl Into<String>) -> Self {
        Self::Suite {
            message: message.into(),
        }
    }
}
