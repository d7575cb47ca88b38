//! Docket Storage - relational persistence layer.
//!
//! A thin async wrapper over an embedded `SQLite` database ([`Database`]).
//! System stores (audit log, accounts) own their tables and apply their own
//! idempotent DDL through [`Database::ensure_schema`].
//!
//! | Deployment | Backend |
//! |------------|---------|
//! | Dev / single node | `SQLite` file in the data directory |
//! | Tests | `SQLite` in-memory |

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod db;
pub mod error;

pub use db::{Database, rusqlite};
pub use error::{StorageError, StorageResult};
