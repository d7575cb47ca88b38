//! Prelude module - commonly used types for convenient import.
//!
//! Use `use docket_test::prelude::*;` to import all essential types.

pub use crate::fixtures::{
    test_actor, test_audit_log, test_audit_policy, test_event, test_new_account, test_service,
    test_service_with_audit,
};
pub use crate::harness::{LogCapture, TestDatabase, setup_test_logging, test_dir};
pub use crate::mocks::{Fault, MockAuditStore};
