//! Error types for mixtape-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! The queue controller itself never returns these from its public commands: invalid
//! commands degrade to no-ops, and only the `try_*` helpers surface `InvalidNavigation`.

use thiserror::Error;

/// Main error type for mixtape-player
#[derive(Error, Debug)]
pub enum Error {
    /// Navigation target outside the current queue
    #[error("Invalid navigation: index {index} out of range for queue of {len}")]
    InvalidNavigation { index: usize, len: usize },

    /// Analytics sink could not record a session
    #[error("Analytics sink error: {0}")]
    Sink(String),

    /// Shared configuration / plumbing errors
    #[error(transparent)]
    Common(#[from] mixtape_common::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using mixtape-player Error
pub type Result<T> = std::result::Result<T, Error>;
