//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The operating system's secure random source failed.
    ///
    /// Hashing cannot proceed without it and never falls back to a weaker salt.
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Stored credential does not have the `salt:hash` shape.
    #[error("malformed credential: {0}")]
    MalformedCredential(&'static str),

    /// Invalid base64 encoding.
    #[error("invalid base64 encoding in credential {part}")]
    InvalidBase64Encoding {
        /// Which half failed to decode (`salt` or `hash`).
        part: &'static str,
    },

    /// Invalid salt length.
    #[error("invalid salt length: expected {expected}, got {actual}")]
    InvalidSaltLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// Invalid derived key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
