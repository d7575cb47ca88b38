//! Bridge from `docket_config::Config` to domain types.

use std::path::{Path, PathBuf};

use docket_audit::AuditPolicy;
use docket_auth::PasswordPolicy;
use docket_config::Config;
use docket_storage::Database;
use docket_telemetry::{LogConfig, LogFormat};

/// Convert config to [`LogConfig`].
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let format = match cfg.logging.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        "full" => LogFormat::Full,
        _ => LogFormat::Compact,
    };

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);

    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }

    log_config
}

/// Convert config to [`AuditPolicy`].
#[must_use]
pub fn to_audit_policy(cfg: &Config) -> AuditPolicy {
    AuditPolicy {
        write_timeout: cfg.audit.write_timeout(),
        max_attempts: cfg.audit.max_attempts.max(1),
        retry_backoff: cfg.audit.retry_backoff(),
    }
}

/// Convert config to [`PasswordPolicy`].
#[must_use]
pub fn to_password_policy(cfg: &Config) -> PasswordPolicy {
    PasswordPolicy {
        max_bytes: cfg.auth.max_password_bytes,
    }
}

/// Database file for `cfg`, or `None` for in-memory storage.
#[must_use]
pub fn database_path(cfg: &Config, docket_home: &Path) -> Option<PathBuf> {
    cfg.storage.database_path(docket_home)
}

/// Open the database described by `cfg`.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened or created.
pub fn open_database(cfg: &Config, docket_home: &Path) -> anyhow::Result<Database> {
    let db = match database_path(cfg, docket_home) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "opening database");
            Database::open(&path)?
        },
        None => {
            tracing::debug!("opening in-memory database");
            Database::open_in_memory()?
        },
    };
    Ok(db)
}
