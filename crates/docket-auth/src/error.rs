//! Authentication and account error types.

use docket_crypto::CryptoError;
use docket_storage::StorageError;
use thiserror::Error;

/// Errors from account management and authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, wrong password, or unusable stored credential.
    ///
    /// The three cases are deliberately indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Input failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// An account with this username already exists.
    #[error("user already exists: {0}")]
    DuplicateUser(String),

    /// No account with this username exists.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The account's role does not satisfy the requirement.
    #[error("forbidden: role '{required}' required")]
    Forbidden {
        /// The role that was required.
        required: String,
    },

    /// The account store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Hashing failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// A background hashing task failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
