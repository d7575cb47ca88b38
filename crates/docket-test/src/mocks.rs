//! Mock implementations for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use docket_audit::{
    AuditEntry, AuditEntryId, AuditError, AuditFilter, AuditResult, AuditStore, NewAuditEntry,
};

/// A failure injected into [`MockAuditStore::append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Fail with a transient storage error.
    Storage(String),
    /// Fail with a non-transient serialization error.
    Serialization(String),
    /// Never complete.
    Hang,
}

impl Fault {
    /// A transient storage failure with a stock message.
    #[must_use]
    pub fn storage() -> Self {
        Self::Storage("injected storage failure".to_string())
    }
}

/// In-memory [`AuditStore`] with injectable failures.
///
/// Appends consult the fault queue first, then the default fault, and only
/// then record the entry. Every append call counts as an attempt, including
/// ones that fail or hang.
///
/// Uses `std::sync::Mutex` internally so builders work without a runtime.
#[derive(Debug, Clone, Default)]
pub struct MockAuditStore {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
    queued: Arc<Mutex<VecDeque<Fault>>>,
    default_fault: Option<Fault>,
    attempts: Arc<AtomicUsize>,
    next_id: Arc<AtomicI64>,
}

impl MockAuditStore {
    /// Create a healthy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every append fails with a transient storage error.
    #[must_use]
    pub fn failing() -> Self {
        Self::new().with_default_fault(Fault::storage())
    }

    /// A store whose every append never completes.
    #[must_use]
    pub fn hanging() -> Self {
        Self::new().with_default_fault(Fault::Hang)
    }

    /// A store whose first `n` appends fail transiently.
    #[must_use]
    pub fn with_failures(self, n: usize) -> Self {
        for _ in 0..n {
            self.queue_fault(Fault::storage());
        }
        self
    }

    /// Set the fault used when the queue is empty.
    #[must_use]
    pub fn with_default_fault(mut self, fault: Fault) -> Self {
        self.default_fault = Some(fault);
        self
    }

    /// Queue a fault for the next append.
    pub fn queue_fault(&self, fault: Fault) {
        if let Ok(mut guard) = self.queued.lock() {
            guard.push_back(fault);
        }
    }

    /// Number of append calls made so far.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Entries recorded so far, in append order.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|g| g.clone()).unwrap_or_default()
    }

    fn next_fault(&self) -> Option<Fault> {
        let queued = self.queued.lock().ok().and_then(|mut g| g.pop_front());
        queued.or_else(|| self.default_fault.clone())
    }
}

#[async_trait]
impl AuditStore for MockAuditStore {
    async fn append(&self, entry: NewAuditEntry) -> AuditResult<AuditEntry> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match self.next_fault() {
            Some(Fault::Storage(msg)) => return Err(AuditError::Storage(msg)),
            Some(Fault::Serialization(msg)) => return Err(AuditError::Serialization(msg)),
            Some(Fault::Hang) => std::future::pending::<()>().await,
            None => {},
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        let stored = entry.into_entry(AuditEntryId(id));
        self.entries
            .lock()
            .map_err(|_| AuditError::Storage("mock store lock poisoned".to_string()))?
            .push(stored.clone());
        Ok(stored)
    }

    async fn query(&self, filter: &AuditFilter) -> AuditResult<Vec<AuditEntry>> {
        let mut matched: Vec<AuditEntry> = self
            .entries()
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.0.cmp(&a.id.0)));
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn count(&self, filter: &AuditFilter) -> AuditResult<u64> {
        let n = self.entries().iter().filter(|e| filter.matches(e)).count();
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_audit::{AuditAction, AuditEvent, AuditLog, AuditPolicy};
    use docket_core::Actor;
    use std::time::Duration;

    fn log_for(store: &MockAuditStore, policy: AuditPolicy) -> AuditLog {
        AuditLog::with_store(Arc::new(store.clone()), policy)
    }

    #[tokio::test]
    async fn test_healthy_store_records() {
        let store = MockAuditStore::new();
        let log = log_for(&store, AuditPolicy::default());

        let entry = log
            .record(&Actor::new("clerk"), AuditEvent::new(AuditAction::INSERT, "cases"))
            .await
            .unwrap();

        assert_eq!(entry.id, AuditEntryId(1));
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.attempts(), 1);
    }

    #[tokio::test]
    async fn test_queued_failures_then_success() {
        let store = MockAuditStore::new().with_failures(2);
        let policy = AuditPolicy {
            retry_backoff: Duration::from_millis(1),
            ..AuditPolicy::default()
        };
        let log = log_for(&store, policy);

        log.record(&Actor::system(), AuditEvent::new(AuditAction::DELETE, "cases"))
            .await
            .unwrap();
        assert_eq!(store.attempts(), 3);
        assert_eq!(store.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_store_records_nothing() {
        let store = MockAuditStore::failing();
        let log = log_for(&store, AuditPolicy::no_retry(Duration::from_secs(1)));

        let result = log
            .record_best_effort(&Actor::system(), AuditEvent::new(AuditAction::UPDATE, "cases"))
            .await;
        assert!(result.is_none());
        assert!(store.entries().is_empty());
        assert_eq!(store.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_store_times_out() {
        let store = MockAuditStore::hanging();
        let log = log_for(&store, AuditPolicy::no_retry(Duration::from_millis(50)));

        let err = log
            .record(&Actor::system(), AuditEvent::new(AuditAction::INSERT, "cases"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_query_newest_first_with_limit() {
        let store = MockAuditStore::new();
        let log = log_for(&store, AuditPolicy::default());
        for i in 1..=3_i64 {
            log.record(
                &Actor::system(),
                AuditEvent::new(AuditAction::INSERT, "cases").record_id(i),
            )
            .await
            .unwrap();
        }

        let newest = store.query(&AuditFilter::all().limit(2)).await.unwrap();
        assert_eq!(newest.len(), 2);
        assert_eq!(newest[0].record_id.0, 3);
        assert_eq!(store.count(&AuditFilter::all()).await.unwrap(), 3);
    }
}
