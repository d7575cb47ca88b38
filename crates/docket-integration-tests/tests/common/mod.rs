//! Shared harness for integration tests.

use std::sync::Arc;

use docket_audit::{AuditLog, AuditPolicy, AuditReader, AuditStore};
use docket_auth::{AccountService, PasswordPolicy};
use docket_test::{TestDatabase, test_audit_policy};

/// Account service, audit log and reader over one on-disk database.
///
/// The database directory is removed when the harness is dropped.
#[allow(dead_code)]
pub struct Harness {
    /// Audited account operations.
    pub accounts: AccountService,
    /// The audit log the service writes to.
    pub audit: AuditLog,
    /// Read-only view of the same log.
    pub reader: AuditReader,
    /// Backing database file.
    pub db: TestDatabase,
}

#[allow(dead_code)]
impl Harness {
    /// Fresh database with short audit timings.
    pub async fn new() -> Self {
        Self::open(TestDatabase::new(), test_audit_policy()).await
    }

    /// Open services over `db`.
    pub async fn open(db: TestDatabase, policy: AuditPolicy) -> Self {
        let database = db.open();
        let audit = AuditLog::open(database.clone(), policy)
            .await
            .expect("failed to open audit log");
        let accounts = AccountService::open(database, audit.clone(), PasswordPolicy::default())
            .await
            .expect("failed to open account service");
        let reader = AuditReader::for_log(&audit);
        Self {
            accounts,
            audit,
            reader,
            db,
        }
    }

    /// Drop the services and open new ones over the same file.
    pub async fn reopen(self) -> Self {
        let Self { db, audit, .. } = self;
        let policy = audit.policy();
        Self::open(db, policy).await
    }

    /// A service with its own database whose audit writes go to `store`.
    pub async fn with_audit_store(store: Arc<dyn AuditStore>) -> Self {
        let db = TestDatabase::new();
        let database = db.open();
        let audit = AuditLog::with_store(store, test_audit_policy());
        let accounts = AccountService::open(database, audit.clone(), PasswordPolicy::default())
            .await
            .expect("failed to open account service");
        let reader = AuditReader::for_log(&audit);
        Self {
            accounts,
            audit,
            reader,
            db,
        }
    }
}
