//! Test harness utilities.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use docket_storage::Database;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Create a temporary directory for testing.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Set up test logging with the given filter.
///
/// Safe to call from many tests; only the first call installs a subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// A database file in its own temporary directory.
#[derive(Debug)]
pub struct TestDatabase {
    /// Directory holding the database; removed on drop.
    pub dir: TempDir,
}

impl TestDatabase {
    /// Create an empty directory for a database.
    #[must_use]
    pub fn new() -> Self {
        Self { dir: test_dir() }
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("docket.db")
    }

    /// Open (or reopen) the database.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be opened.
    #[must_use]
    pub fn open(&self) -> Database {
        Database::open(self.path()).expect("Failed to open test database")
    }

    /// The temporary directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Captures formatted tracing output in memory.
///
/// The subscriber installed by [`LogCapture::install`] is scoped to the
/// current thread, so use it with a current-thread runtime.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Create an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route events matching `filter` into this capture until the guard drops.
    #[must_use]
    pub fn install(&self, filter: &str) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything captured so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buf
            .lock()
            .map(|g| String::from_utf8_lossy(&g).into_owned())
            .unwrap_or_default()
    }

    /// Whether any captured line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

/// Writer handed out by [`LogCapture`].
#[derive(Debug)]
pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log capture poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir() {
        let dir = test_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_database_reopens() {
        let db = TestDatabase::new();
        let first = db.open();
        first
            .call_blocking(|conn| conn.execute_batch("CREATE TABLE t (x INTEGER)"))
            .unwrap();
        drop(first);

        assert!(db.path().exists());
        let second = db.open();
        let n: i64 = second
            .call_blocking(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE name = 't'",
                    [],
                    |row| row.get(0),
                )
            })
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn test_log_capture() {
        let capture = LogCapture::new();
        {
            let _guard = capture.install("warn");
            tracing::warn!(target: "docket_audit::gap", "audit entry not written");
            tracing::info!("filtered out");
        }
        assert!(capture.contains("audit entry not written"));
        assert!(capture.contains("docket_audit::gap"));
        assert!(!capture.contains("filtered out"));
    }
}
