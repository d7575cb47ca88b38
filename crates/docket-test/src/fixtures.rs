//! Test fixtures for common types.

use std::sync::Arc;
use std::time::Duration;

use docket_audit::{AuditAction, AuditEvent, AuditLog, AuditPolicy, AuditStore};
use docket_auth::{AccountService, NewAccount, PasswordPolicy};
use docket_core::{Actor, Role};
use docket_storage::Database;

/// Password used by [`test_new_account`].
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// A named, non-sentinel actor.
#[must_use]
pub fn test_actor() -> Actor {
    Actor::new("test-clerk")
}

/// An INSERT event on `cases` row 1.
#[must_use]
pub fn test_event() -> AuditEvent {
    AuditEvent::new(AuditAction::INSERT, "cases")
        .record_id(1)
        .details("Filed case 2026-CV-0001")
}

/// Audit policy with short timings so failure paths finish quickly.
#[must_use]
pub fn test_audit_policy() -> AuditPolicy {
    AuditPolicy {
        write_timeout: Duration::from_millis(200),
        max_attempts: 3,
        retry_backoff: Duration::from_millis(1),
    }
}

/// A clerk account request for `username` using [`TEST_PASSWORD`].
#[must_use]
pub fn test_new_account(username: &str) -> NewAccount {
    NewAccount::new(username, TEST_PASSWORD, Role::new("clerk"))
}

/// In-memory audit log.
///
/// # Panics
///
/// Panics if the in-memory store cannot be created.
pub async fn test_audit_log() -> AuditLog {
    AuditLog::in_memory()
        .await
        .expect("Failed to create in-memory audit log")
}

/// Account service over one in-memory database shared with its audit log.
///
/// # Panics
///
/// Panics if the stores cannot be created.
pub async fn test_service() -> AccountService {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let audit = AuditLog::open(db.clone(), test_audit_policy())
        .await
        .expect("Failed to open audit log");
    AccountService::open(db, audit, PasswordPolicy::default())
        .await
        .expect("Failed to open account service")
}

/// Account service whose audit log writes to `store`.
///
/// # Panics
///
/// Panics if the account store cannot be created.
pub async fn test_service_with_audit(store: Arc<dyn AuditStore>) -> AccountService {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let audit = AuditLog::with_store(store, test_audit_policy());
    AccountService::open(db, audit, PasswordPolicy::default())
        .await
        .expect("Failed to open account service")
}
