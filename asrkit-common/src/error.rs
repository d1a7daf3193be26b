//! Common error types for asrkit

use thiserror::Error;

/// Common result type for asrkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared by the transcript and corpus crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested file or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller input or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record or document did not match its expected format
    #[error("Parse error: {0}")]
    Parse(String),

    /// Audio decoding, resampling or encoding failed
    #[error("Audio error: {0}")]
    Audio(String),

    /// Internal error (task failures and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}
