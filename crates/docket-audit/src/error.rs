//! Audit-related error types.

use std::time::Duration;

use docket_storage::StorageError;
use thiserror::Error;

/// Errors that can occur with audit logging.
///
/// None of these are fatal to the mutation being audited. Callers either
/// inspect them (via [`AuditLog::record`](crate::AuditLog::record)) or let
/// the best-effort path report them.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The store rejected or failed the write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored entry could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The write did not complete within the configured bound.
    #[error("audit write timed out after {0:?}")]
    Timeout(Duration),

    /// The entry was rejected before reaching the store.
    #[error("invalid audit entry: {0}")]
    InvalidEntry(String),
}

impl AuditError {
    /// Whether another attempt may succeed.
    ///
    /// Timeouts are not retried: the abandoned write may still land.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<StorageError> for AuditError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Serialization(msg) => Self::Serialization(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
