//! Read-only access to the audit log.

use std::sync::Arc;

use crate::entry::AuditEntry;
use crate::error::AuditResult;
use crate::log::AuditLog;
use crate::store::{AuditFilter, AuditStore};

/// Read-only view over an audit store.
///
/// Recording never goes through the reader, and the reader cannot alter
/// entries.
#[derive(Clone)]
pub struct AuditReader {
    store: Arc<dyn AuditStore>,
}

impl AuditReader {
    /// Read from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Read the store behind `log`.
    #[must_use]
    pub fn for_log(log: &AuditLog) -> Self {
        Self::new(log.store())
    }

    /// Entries matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list(&self, filter: &AuditFilter) -> AuditResult<Vec<AuditEntry>> {
        self.store.query(filter).await
    }

    /// Full history of one row, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn history(&self, table_name: &str, record_id: i64) -> AuditResult<Vec<AuditEntry>> {
        self.list(&AuditFilter::all().table(table_name).record(record_id))
            .await
    }

    /// Number of entries matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn count(&self, filter: &AuditFilter) -> AuditResult<u64> {
        self.store.count(filter).await
    }
}

impl std::fmt::Debug for AuditReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditReader").finish_non_exhaustive()
    }
}
