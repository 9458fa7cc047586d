//! Failure type shared by queue store backends.

use std::error::Error;
use thiserror::Error;

/// Result alias for queue store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error surfaced when the database behind the queue and rankings tables
/// cannot serve a request. There is only one shape: the failed operation
/// plus the backend's own error as source.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("queue store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a backend failure together with a description of what was being
    /// attempted.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
