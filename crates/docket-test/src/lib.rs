//! Docket Test - Shared test utilities for Docket.
//!
//! This crate provides fault-injecting store implementations, log capture
//! and fixtures that can be used across Docket crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! docket-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docket_test::{MockAuditStore, test_actor, test_new_account, test_service_with_audit};
//!
//! #[tokio::test]
//! async fn mutation_survives_audit_outage() {
//!     let store = Arc::new(MockAuditStore::failing());
//!     let service = test_service_with_audit(store.clone()).await;
//!
//!     service.create_account(&test_actor(), &test_new_account("clerk01")).await.unwrap();
//!     assert!(store.attempts() > 0);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
