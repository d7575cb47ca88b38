//! Audit store trait and `SQLite`-backed implementation.

use async_trait::async_trait;
use docket_core::{Actor, Timestamp};
use docket_storage::Database;
use docket_storage::rusqlite::{self, Row, params_from_iter, types::Value};

use crate::entry::{AuditAction, AuditEntry, AuditEntryId, NewAuditEntry, RecordId};
use crate::error::{AuditError, AuditResult};

/// Storage backend for audit logs.
///
/// Implementations must be thread-safe. `append` must be a single
/// self-contained insert: concurrent appends never coordinate with each
/// other and never read existing entries.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist one entry and return it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    async fn append(&self, entry: NewAuditEntry) -> AuditResult<AuditEntry>;

    /// List entries matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval or decoding fails.
    async fn query(&self, filter: &AuditFilter) -> AuditResult<Vec<AuditEntry>>;

    /// Count entries matching `filter` (the limit is ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    async fn count(&self, filter: &AuditFilter) -> AuditResult<u64>;
}

/// Criteria for reading the audit log.
///
/// Unset fields match everything. `since` and `until` are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Only entries for this table.
    pub table_name: Option<String>,
    /// Only entries for this row.
    pub record_id: Option<RecordId>,
    /// Only entries by this user.
    pub user_name: Option<String>,
    /// Only entries with this action.
    pub action: Option<AuditAction>,
    /// Lower time bound.
    pub since: Option<Timestamp>,
    /// Upper time bound.
    pub until: Option<Timestamp>,
    /// Maximum number of entries returned.
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// Match every entry.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a table.
    #[must_use]
    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Restrict to a row.
    #[must_use]
    pub fn record(mut self, record_id: impl Into<RecordId>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    /// Restrict to a user.
    #[must_use]
    pub fn user(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Restrict to an action.
    #[must_use]
    pub fn action(mut self, action: impl Into<AuditAction>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Only entries at or after `since`.
    #[must_use]
    pub fn since(mut self, since: Timestamp) -> Self {
        self.since = Some(since);
        self
    }

    /// Only entries at or before `until`.
    #[must_use]
    pub fn until(mut self, until: Timestamp) -> Self {
        self.until = Some(until);
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `entry` satisfies every criterion except the limit.
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.table_name
            .as_deref()
            .is_none_or(|t| entry.table_name == t)
            && self.record_id.is_none_or(|r| entry.record_id == r)
            && self
                .user_name
                .as_deref()
                .is_none_or(|u| entry.user_name.name() == u)
            && self.action.as_ref().is_none_or(|a| &entry.action == a)
            && self.since.is_none_or(|s| entry.timestamp >= s)
            && self.until.is_none_or(|u| entry.timestamp <= u)
    }

    /// Build the `WHERE` clause and its bound values.
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses: Vec<&'static str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(table) = &self.table_name {
            clauses.push("table_name = ?");
            values.push(Value::Text(table.clone()));
        }
        if let Some(record) = self.record_id {
            clauses.push("record_id = ?");
            values.push(Value::Integer(record.0));
        }
        if let Some(user) = &self.user_name {
            clauses.push("user_name = ?");
            values.push(Value::Text(user.clone()));
        }
        if let Some(action) = &self.action {
            clauses.push("action = ?");
            values.push(Value::Text(action.as_str().to_owned()));
        }
        if let Some(since) = self.since {
            clauses.push("timestamp_us >= ?");
            values.push(Value::Integer(since.as_micros()));
        }
        if let Some(until) = self.until {
            clauses.push("timestamp_us <= ?");
            values.push(Value::Integer(until.as_micros()));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

// -- SQLite backend --

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS audit_log (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    action       TEXT    NOT NULL,
    table_name   TEXT    NOT NULL,
    record_id    INTEGER NOT NULL,
    user_name    TEXT    NOT NULL,
    details      TEXT    NOT NULL,
    timestamp_us INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audit_log_record ON audit_log (table_name, record_id);
CREATE INDEX IF NOT EXISTS idx_audit_log_time ON audit_log (timestamp_us);
CREATE TRIGGER IF NOT EXISTS audit_log_no_update BEFORE UPDATE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'audit_log is append-only');
END;
CREATE TRIGGER IF NOT EXISTS audit_log_no_delete BEFORE DELETE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'audit_log is append-only');
END;
";

const COLUMNS: &str = "id, action, table_name, record_id, user_name, details, timestamp_us";

/// `SQLite`-backed audit store.
///
/// Entries live in the `audit_log` table. Update and delete are blocked by
/// triggers.
#[derive(Debug, Clone)]
pub struct SqliteAuditStore {
    db: Database,
}

impl SqliteAuditStore {
    /// Use `db` for audit storage, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub async fn open(db: Database) -> AuditResult<Self> {
        db.ensure_schema("audit_log", SCHEMA).await?;
        Ok(Self { db })
    }

    /// Create an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub async fn in_memory() -> AuditResult<Self> {
        Self::open(Database::open_in_memory()?).await
    }

    /// The underlying database handle.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    let micros: i64 = row.get(6)?;
    let timestamp = Timestamp::from_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {micros}").into(),
        )
    })?;
    Ok(AuditEntry {
        id: AuditEntryId(row.get(0)?),
        action: AuditAction::new(row.get::<_, String>(1)?),
        table_name: row.get(2)?,
        record_id: RecordId(row.get(3)?),
        user_name: Actor::new(row.get::<_, String>(4)?),
        details: row.get(5)?,
        timestamp,
    })
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn append(&self, entry: NewAuditEntry) -> AuditResult<AuditEntry> {
        let id = self
            .db
            .call({
                let entry = entry.clone();
                move |conn| {
                    conn.execute(
                        "INSERT INTO audit_log \
                         (action, table_name, record_id, user_name, details, timestamp_us) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        rusqlite::params![
                            entry.action.as_str(),
                            entry.table_name,
                            entry.record_id.0,
                            entry.user_name.name(),
                            entry.details,
                            entry.timestamp.as_micros(),
                        ],
                    )?;
                    Ok(conn.last_insert_rowid())
                }
            })
            .await?;
        Ok(entry.into_entry(AuditEntryId(id)))
    }

    async fn query(&self, filter: &AuditFilter) -> AuditResult<Vec<AuditEntry>> {
        let (where_sql, mut values) = filter.where_clause();
        let limit = filter
            .limit
            .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        values.push(Value::Integer(limit));
        let sql = format!(
            "SELECT {COLUMNS} FROM audit_log{where_sql} \
             ORDER BY timestamp_us DESC, id DESC LIMIT ?"
        );

        self.db
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(values), entry_from_row)?;
                rows.collect()
            })
            .await
            .map_err(AuditError::from)
    }

    async fn count(&self, filter: &AuditFilter) -> AuditResult<u64> {
        let (where_sql, values) = filter.where_clause();
        let sql = format!("SELECT COUNT(*) FROM audit_log{where_sql}");

        let n: i64 = self
            .db
            .call(move |conn| conn.query_row(&sql, params_from_iter(values), |r| r.get(0)))
            .await?;
        u64::try_from(n).map_err(|e| AuditError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(action: &str, table: &str, record: i64, user: &str) -> NewAuditEntry {
        NewAuditEntry {
            action: AuditAction::new(action),
            table_name: table.to_string(),
            record_id: RecordId(record),
            user_name: Actor::new(user),
            details: format!("{action} {table} {record}"),
            timestamp: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = SqliteAuditStore::in_memory().await.unwrap();
        let a = store.append(sample("INSERT", "branches", 1, "clerk")).await.unwrap();
        let b = store.append(sample("UPDATE", "branches", 1, "clerk")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.count(&AuditFilter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let store = SqliteAuditStore::in_memory().await.unwrap();
        let mut new = sample("INSERT", "court_records", 44, "judge");
        new.details = "  {\"case\": \"A-1\"}\n\ttrailing  ".to_string();
        let written = store.append(new.clone()).await.unwrap();

        let read = store.query(&AuditFilter::all()).await.unwrap();
        assert_eq!(read, vec![written]);
        assert_eq!(read[0].details, new.details);
        assert_eq!(read[0].timestamp, new.timestamp);
    }

    #[tokio::test]
    async fn test_filters() {
        let store = SqliteAuditStore::in_memory().await.unwrap();
        store.append(sample("INSERT", "hearings", 1, "alice")).await.unwrap();
        store.append(sample("UPDATE", "hearings", 1, "bob")).await.unwrap();
        store.append(sample("INSERT", "hearings", 2, "alice")).await.unwrap();
        store.append(sample("DELETE", "tasks", 9, "System")).await.unwrap();

        let by_table = AuditFilter::all().table("hearings");
        assert_eq!(store.count(&by_table).await.unwrap(), 3);

        let by_record = AuditFilter::all().table("hearings").record(1);
        assert_eq!(store.query(&by_record).await.unwrap().len(), 2);

        let by_user = AuditFilter::all().user("alice").action(AuditAction::INSERT);
        assert_eq!(store.count(&by_user).await.unwrap(), 2);

        let system = store.query(&AuditFilter::all().user("System")).await.unwrap();
        assert_eq!(system.len(), 1);
        assert!(system[0].user_name.is_system());
    }

    #[tokio::test]
    async fn test_newest_first_and_limit() {
        let store = SqliteAuditStore::in_memory().await.unwrap();
        for i in 1..=5 {
            store.append(sample("INSERT", "tasks", i, "clerk")).await.unwrap();
        }

        let latest = store.query(&AuditFilter::all().limit(2)).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].record_id, RecordId(5));
        assert_eq!(latest[1].record_id, RecordId(4));
        assert_eq!(store.count(&AuditFilter::all().limit(2)).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_time_range() {
        let store = SqliteAuditStore::in_memory().await.unwrap();
        store.append(sample("INSERT", "tasks", 1, "clerk")).await.unwrap();
        let mid = Timestamp::now();
        let later = store.append(sample("INSERT", "tasks", 2, "clerk")).await.unwrap();

        let recent = store.query(&AuditFilter::all().since(mid)).await.unwrap();
        assert!(recent.iter().all(|e| e.timestamp >= mid));
        assert!(recent.contains(&later));

        let none = AuditFilter::all().until(Timestamp::from_micros(0).unwrap());
        assert_eq!(store.count(&none).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entries_cannot_be_modified() {
        let store = SqliteAuditStore::in_memory().await.unwrap();
        store.append(sample("INSERT", "tasks", 1, "clerk")).await.unwrap();

        let update = store
            .database()
            .call(|conn| conn.execute("UPDATE audit_log SET details = 'x'", []))
            .await;
        assert!(update.is_err());

        let delete = store
            .database()
            .call(|conn| conn.execute("DELETE FROM audit_log", []))
            .await;
        assert!(delete.is_err());
        assert_eq!(store.count(&AuditFilter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_filter_matches_agrees_with_sql() {
        let store = SqliteAuditStore::in_memory().await.unwrap();
        store.append(sample("INSERT", "users", 3, "admin")).await.unwrap();
        store.append(sample("LOGIN", "users", 3, "admin")).await.unwrap();

        let filter = AuditFilter::all().action(AuditAction::LOGIN);
        let all = store.query(&AuditFilter::all()).await.unwrap();
        let expected: Vec<_> = all.into_iter().filter(|e| filter.matches(e)).collect();
        assert_eq!(store.query(&filter).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docket.db");
        {
            let store = SqliteAuditStore::open(Database::open(&path).unwrap())
                .await
                .unwrap();
            store.append(sample("INSERT", "marriages", 7, "registrar")).await.unwrap();
        }
        let store = SqliteAuditStore::open(Database::open(&path).unwrap())
            .await
            .unwrap();
        let entries = store.query(&AuditFilter::all()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].table_name, "marriages");
    }
}
