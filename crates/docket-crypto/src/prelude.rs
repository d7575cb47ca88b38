//! Prelude module - commonly used types for convenient import.
//!
//! Use `use docket_crypto::prelude::*;` to import all essential types.

// Errors
pub use crate::{CryptoError, CryptoResult};

// Credentials
pub use crate::{CredentialBlob, hash_password, verify_password};
