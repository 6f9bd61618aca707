//! Domain error types
//!
//! The error hierarchy for bpagen. Errors carry plain messages and never
//! expose third-party types (database driver, HTTP client, TOML parser).

use thiserror::Error;

/// Main bpagen error type
#[derive(Debug, Error)]
pub enum BpaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Staging store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Network/connection errors against the staging store
    #[error("Connection error: {0}")]
    Connection(String),

    /// Failures inside the consolidation procedures
    #[error("Consolidation error: {0}")]
    Consolidation(String),

    /// Postal-code provider errors
    #[error("Address lookup error: {0}")]
    Address(#[from] AddressLookupError),

    /// Record or header encoding errors
    #[error("Format error: {0}")]
    Format(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The job was cancelled before it completed
    #[error("Job cancelled")]
    Cancelled,

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl BpaError {
    /// Prepends `context` to the message while keeping the error category.
    pub fn prefixed(self, context: impl std::fmt::Display) -> Self {
        match self {
            BpaError::Configuration(m) => BpaError::Configuration(format!("{context}: {m}")),
            BpaError::Database(m) => BpaError::Database(format!("{context}: {m}")),
            BpaError::Connection(m) => BpaError::Connection(format!("{context}: {m}")),
            BpaError::Consolidation(m) => BpaError::Consolidation(format!("{context}: {m}")),
            BpaError::Format(m) => BpaError::Format(format!("{context}: {m}")),
            BpaError::Validation(m) => BpaError::Validation(format!("{context}: {m}")),
            BpaError::Serialization(m) => BpaError::Serialization(format!("{context}: {m}")),
            BpaError::Io(m) => BpaError::Io(format!("{context}: {m}")),
            BpaError::Cancelled => BpaError::Cancelled,
            other => BpaError::Other(format!("{context}: {other}")),
        }
    }

    /// Whether the error came from a cancelled job
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BpaError::Cancelled)
    }
}

/// Postal-code provider errors
///
/// Raised by the HTTP address providers. The resolver logs them and falls
/// through to the next strategy.
#[derive(Debug, Error)]
pub enum AddressLookupError {
    /// Failed to reach the provider
    #[error("Failed to connect to provider: {0}")]
    ConnectionFailed(String),

    /// Request exceeded the provider timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Body could not be decoded into the expected shape
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// The provider answered but has no address for the query
    #[error("Postal code not found: {0}")]
    NotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },
}

impl From<std::io::Error> for BpaError {
    fn from(err: std::io::Error) -> Self {
        BpaError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BpaError {
    fn from(err: serde_json::Error) -> Self {
        BpaError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BpaError {
    fn from(err: toml::de::Error) -> Self {
        BpaError::Configuration(format!("TOML parse error: {err}"))
    }
}
