//! Error types raised by storage backends.

use thiserror::Error;

/// Result type for repository operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures reported by a [`crate::domain::repositories::LinkRepository`].
///
/// `NotFound` and `DuplicateKey` are expected outcomes the service layer
/// translates into domain errors. The remaining variants describe a backend
/// that is unreachable or misbehaving.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,
    #[error("shortened url already taken")]
    DuplicateKey,
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("stored value is invalid: {0}")]
    InvalidData(String),
    #[error("storage query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if err
            .as_database_error()
            .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
        {
            return StorageError::DuplicateKey;
        }

        let message = err.to_string();

        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
            sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
            sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_) => StorageError::InvalidData(message),
            _ => StorageError::Query(message),
        }
    }
}
