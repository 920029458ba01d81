//! Error types for the settings synchronization engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for cfgsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cfgsync
#[derive(Error, Debug)]
pub enum Error {
    /// A backend call failed or could not be delivered
    #[error("Backend transport error ({backend}): {message}")]
    Transport {
        /// Backend name
        backend: String,
        /// Error message
        message: String,
    },

    /// The backend answered but refused the request (`success: false`)
    #[error("Backend rejected {call}: {message}")]
    Rejected {
        /// The backend call that was rejected
        call: String,
        /// Error message
        message: String,
    },

    /// Attempt to write a derived (computed, non-persisted) field
    #[error("Field {0} is derived and cannot be written directly")]
    DerivedField(String),

    /// Theme host errors
    #[error("Theme host error: {0}")]
    Theme(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error for the named backend
    pub fn transport(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a rejection error for a backend call
    pub fn rejected(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Create a derived-field error
    pub fn derived_field(field: impl Into<String>) -> Self {
        Self::DerivedField(field.into())
    }

    /// Create a theme host error
    pub fn theme(msg: impl Into<String>) -> Self {
        Self::Theme(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether the error came from the backend rather than from the caller
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Rejected { .. }
                | Self::Http(_)
                | Self::NotFound(_)
                | Self::Io(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
