//! Error types for hopper-sf-auth.
//!
//! Error messages are designed to avoid exposing session tokens.

/// Result type alias for hopper-sf-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for hopper-sf-auth operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Underlying cause, when one exists.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }
}

/// The kind of error that occurred.
///
/// Error messages name variables and fields, never their values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
