//! Audit log - main interface for audit logging.
//!
//! Provides a high-level API for recording entries. Recording is
//! best-effort relative to the mutation being audited: nothing here can
//! roll back or abort the caller's primary write.

use std::sync::Arc;
use std::time::Duration;

use docket_core::Actor;
use docket_storage::Database;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::entry::{AuditEntry, AuditEvent, NewAuditEntry};
use crate::error::{AuditError, AuditResult};
use crate::store::{AuditStore, SqliteAuditStore};

/// Tracing target for audit entries that could not be recorded.
pub const GAP_TARGET: &str = "docket_audit::gap";

/// Bounds on a single audit write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditPolicy {
    /// Upper bound on each store call.
    pub write_timeout: Duration,
    /// Total attempts for transient store failures (at least 1).
    pub max_attempts: u32,
    /// Pause between attempts.
    pub retry_backoff: Duration,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

impl AuditPolicy {
    /// A policy that tries once.
    #[must_use]
    pub fn no_retry(write_timeout: Duration) -> Self {
        Self {
            write_timeout,
            max_attempts: 1,
            retry_backoff: Duration::ZERO,
        }
    }
}

/// Audit log for recording mutations.
///
/// Cloning is cheap; clones share the store.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn AuditStore>,
    policy: AuditPolicy,
}

impl AuditLog {
    /// Create an audit log over a custom store.
    #[must_use]
    pub fn with_store(store: Arc<dyn AuditStore>, policy: AuditPolicy) -> Self {
        Self { store, policy }
    }

    /// Create an audit log persisted in `db`.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit table cannot be created.
    pub async fn open(db: Database, policy: AuditPolicy) -> AuditResult<Self> {
        let store = SqliteAuditStore::open(db).await?;
        Ok(Self::with_store(Arc::new(store), policy))
    }

    /// Create an in-memory audit log (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub async fn in_memory() -> AuditResult<Self> {
        let store = SqliteAuditStore::in_memory().await?;
        Ok(Self::with_store(Arc::new(store), AuditPolicy::default()))
    }

    /// The active policy.
    #[must_use]
    pub fn policy(&self) -> AuditPolicy {
        self.policy
    }

    /// The underlying store, for readers.
    #[must_use]
    pub fn store(&self) -> Arc<dyn AuditStore> {
        Arc::clone(&self.store)
    }

    /// Append one entry attributed to `actor`.
    ///
    /// The timestamp is assigned here, once, before the first attempt.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidEntry`] for a blank action or table name,
    /// [`AuditError::Timeout`] if a store call exceeds the write timeout, or
    /// the store's error once retries are exhausted.
    pub async fn record(&self, actor: &Actor, event: AuditEvent) -> AuditResult<AuditEntry> {
        if event.action.as_str().trim().is_empty() {
            return Err(AuditError::InvalidEntry("action is empty".to_string()));
        }
        if event.table_name.trim().is_empty() {
            return Err(AuditError::InvalidEntry("table name is empty".to_string()));
        }

        let entry = NewAuditEntry::stamp(actor, event);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt: u32 = 1;

        loop {
            match self.append_once(entry.clone()).await {
                Ok(written) => {
                    debug!(
                        id = %written.id,
                        action = %written.action,
                        table = %written.table_name,
                        record_id = written.record_id.0,
                        user = %written.user_name,
                        "audit entry recorded"
                    );
                    return Ok(written);
                },
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    debug!(attempt, max_attempts, error = %e, "audit write failed, retrying");
                    tokio::time::sleep(self.policy.retry_backoff).await;
                    attempt = attempt.saturating_add(1);
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Append one entry, reporting failure instead of returning it.
    ///
    /// Failures are emitted as a `warn` event on [`GAP_TARGET`] carrying
    /// the entry's fields, and `None` is returned.
    pub async fn record_best_effort(&self, actor: &Actor, event: AuditEvent) -> Option<AuditEntry> {
        let action = event.action.clone();
        let table = event.table_name.clone();
        let record_id = event.record_id;

        match self.record(actor, event).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    target: GAP_TARGET,
                    action = %action,
                    table = %table,
                    record_id = record_id.0,
                    user = %actor,
                    error = %e,
                    "audit entry not recorded"
                );
                None
            },
        }
    }

    /// Append one entry on a spawned task.
    ///
    /// The write completes even if the caller's future is dropped. Returns
    /// `None` (after reporting the gap) when called outside a Tokio runtime.
    #[must_use = "dropping the handle detaches the write; await it to observe the result"]
    pub fn record_detached(
        &self,
        actor: Actor,
        event: AuditEvent,
    ) -> Option<JoinHandle<Option<AuditEntry>>> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                target: GAP_TARGET,
                action = %event.action,
                table = %event.table_name,
                record_id = event.record_id.0,
                user = %actor,
                "audit entry not recorded: no async runtime"
            );
            return None;
        };
        let log = self.clone();
        Some(handle.spawn(async move { log.record_best_effort(&actor, event).await }))
    }

    async fn append_once(&self, entry: NewAuditEntry) -> AuditResult<AuditEntry> {
        let timeout = self.policy.write_timeout;
        tokio::time::timeout(timeout, self.store.append(entry))
            .await
            .map_err(|_| AuditError::Timeout(timeout))?
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
