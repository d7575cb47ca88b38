//! Docket Crypto - Credential hashing and verification.
//!
//! This crate provides:
//! - Salted PBKDF2-HMAC-SHA256 password hashing (`salt:hash` credentials)
//! - Constant-time verification that fails closed on malformed input
//!
//! # Security Philosophy
//!
//! Plaintext passwords are never stored or logged. Verification answers a
//! single yes/no question and never reveals *why* a check failed, so a
//! corrupted stored credential looks exactly like a wrong password.
//!
//! # Example
//!
//! ```
//! use docket_crypto::{hash_password, verify_password};
//!
//! let stored = hash_password("correct-password").unwrap();
//!
//! assert!(verify_password("correct-password", &stored));
//! assert!(!verify_password("wrong-password", &stored));
//! assert!(!verify_password("hunter2", "not-a-valid-blob"));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod password;

pub use error::{CryptoError, CryptoResult};
pub use password::{
    CredentialBlob, KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN, SEPARATOR, burn_verification_cost,
    hash_password, verify_password,
};
