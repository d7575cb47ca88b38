//! Configuration types for Docket.
//!
//! These types have no dependencies on other internal crates; the binary
//! converts them into domain types at startup. Every struct implements
//! [`Default`] so a bare `[section]` header produces a working
//! configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the database lives.
    pub storage: StorageSection,
    /// Audit write bounds.
    pub audit: AuditSection,
    /// Password rules.
    pub auth: AuthSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Database location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding `docket.db`. Empty means `<docket home>/data`.
    pub data_dir: String,
    /// Use an in-memory database.
    pub in_memory: bool,
}

impl StorageSection {
    /// File name of the database inside the data directory.
    pub const DB_FILE: &'static str = "docket.db";

    /// Resolve the database file path against the `.docket` directory.
    ///
    /// Returns `None` when storage is in-memory.
    #[must_use]
    pub fn database_path(&self, docket_home: &std::path::Path) -> Option<PathBuf> {
        if self.in_memory {
            return None;
        }
        let dir = if self.data_dir.trim().is_empty() {
            docket_home.join("data")
        } else {
            PathBuf::from(self.data_dir.trim())
        };
        Some(dir.join(Self::DB_FILE))
    }
}

// ---------------------------------------------------------------------------
// AuditSection
// ---------------------------------------------------------------------------

/// Audit write bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Upper bound on each store call, in milliseconds.
    pub write_timeout_ms: u64,
    /// Attempts for transient failures.
    pub max_attempts: u32,
    /// Pause between attempts, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            write_timeout_ms: 5000,
            max_attempts: 3,
            retry_backoff_ms: 100,
        }
    }
}

impl AuditSection {
    /// Write timeout as a [`Duration`].
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Retry backoff as a [`Duration`].
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

// ---------------------------------------------------------------------------
// AuthSection
// ---------------------------------------------------------------------------

/// Password rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Longest accepted new password, in bytes.
    pub max_password_bytes: usize,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            max_password_bytes: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["docket_audit=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
