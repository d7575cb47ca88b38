//! Docket Auth - user accounts and password authentication.
//!
//! [`AccountService`] is the caller of the two security collaborators:
//! passwords go through `docket-crypto` and every account mutation and
//! successful login is recorded through `docket-audit`.
//!
//! Authorization is a single role string comparison ([`require_role`]); the
//! `admin` role passes every check.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod account;
mod error;
mod policy;
mod service;
mod store;

pub use account::{Account, NewAccount};
pub use error::{AuthError, AuthResult};
pub use policy::{
    DEFAULT_MAX_PASSWORD_BYTES, MAX_USERNAME_BYTES, PasswordPolicy, check_role, check_username,
    require_role,
};
pub use service::{AccountService, USERS_TABLE};
pub use store::{AccountStore, SqliteAccountStore};
