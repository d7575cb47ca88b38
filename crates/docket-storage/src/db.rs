//! Embedded `SQLite` database interface.
//!
//! The [`Database`] struct wraps a single `rusqlite` connection and provides
//! async access for system stores. Statements run on Tokio's blocking pool so
//! store I/O is the only suspension point of a caller.
//!
//! # Connection Modes
//!
//! | Mode | Constructor | Backend |
//! |------|-------------|---------|
//! | Embedded | [`Database::open`] | `SQLite` file (WAL journal) |
//! | Test | [`Database::open_in_memory`] | In-memory |
//!
//! # Usage
//!
//! ```rust,ignore
//! use docket_storage::Database;
//!
//! let db = Database::open("path/to/docket.db")?;
//! db.ensure_schema("audit_log", AUDIT_SCHEMA).await?;
//! let n: i64 = db.call(|conn| conn.query_row("SELECT 1", [], |r| r.get(0))).await?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Re-export `rusqlite` for store implementations.
pub use rusqlite;

/// How long a statement waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// `SQLite` database wrapper.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    location: Option<Arc<PathBuf>>,
}

impl Database {
    /// Open (or create) a database file.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the file cannot be opened or
    /// configured.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Connection(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: Some(Arc::new(path.to_path_buf())),
        })
    }

    /// Open a private in-memory database (for tests).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the connection fails.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location: None,
        })
    }

    /// Path of the database file, or `None` for an in-memory database.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.location.as_deref().map(PathBuf::as_path)
    }

    /// Run `f` against the connection on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns the mapped `rusqlite` error from `f`, or
    /// [`StorageError::Internal`] if the worker panicked or the connection
    /// lock is poisoned.
    pub async fn call<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::Internal("database lock poisoned".to_string()))?;
            f(&mut guard).map_err(StorageError::from)
        })
        .await
        .map_err(|e| StorageError::Internal(format!("database worker failed: {e}")))?
    }

    /// Run `f` against the connection on the current thread.
    ///
    /// For synchronous callers outside a runtime.
    ///
    /// # Errors
    ///
    /// Same as [`Database::call`].
    pub fn call_blocking<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T>,
    {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StorageError::Internal("database lock poisoned".to_string()))?;
        f(&mut guard).map_err(StorageError::from)
    }

    /// Apply idempotent DDL for one store.
    ///
    /// `name` is only used for logging.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the batch fails.
    pub async fn ensure_schema(&self, name: &'static str, ddl: &'static str) -> StorageResult<()> {
        self.call(move |conn| conn.execute_batch(ddl)).await?;
        debug!(schema = name, "schema ready");
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.location)
            .finish_non_exhaustive()
    }
}
