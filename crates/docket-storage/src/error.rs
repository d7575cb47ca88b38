//! Storage error types.

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested row was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness or other constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Internal(String),

    /// Opening or reaching the database failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A stored value could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Conflict(e.to_string())
            },
            rusqlite::Error::SqliteFailure(code, _)
                if matches!(
                    code.code,
                    rusqlite::ErrorCode::CannotOpen
                        | rusqlite::ErrorCode::DatabaseBusy
                        | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                Self::Connection(e.to_string())
            },
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound(e.to_string()),
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => Self::Serialization(e.to_string()),
            _ => Self::Internal(e.to_string()),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
