//! Prelude module - commonly used types for convenient import.
//!
//! Use `use docket_auth::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthError, AuthResult};

// Accounts
pub use crate::{Account, AccountService, NewAccount, PasswordPolicy};

// Authorization
pub use crate::require_role;

// Storage
pub use crate::{AccountStore, SqliteAccountStore};
