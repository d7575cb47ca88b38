//! Opened stores and the acting identity for one invocation.

use std::path::Path;

use anyhow::Result;
use docket_audit::{AuditLog, AuditReader};
use docket_auth::AccountService;
use docket_config::Config;
use docket_core::Actor;

use crate::config_bridge;

/// Everything a user or audit command needs.
pub(crate) struct App {
    /// Account operations, audited.
    pub(crate) accounts: AccountService,
    /// Read-only audit access.
    pub(crate) reader: AuditReader,
    /// Identity mutations are attributed to.
    pub(crate) actor: Actor,
}

impl App {
    /// Open the database described by `cfg` and wire the services to it.
    pub(crate) async fn open(cfg: &Config, docket_home: &Path, actor: Actor) -> Result<Self> {
        let db = config_bridge::open_database(cfg, docket_home)?;
        let audit = AuditLog::open(db.clone(), config_bridge::to_audit_policy(cfg)).await?;
        let accounts =
            AccountService::open(db, audit.clone(), config_bridge::to_password_policy(cfg)).await?;

        Ok(Self {
            accounts,
            reader: AuditReader::for_log(&audit),
            actor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_shares_one_database() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::default();

        let app = App::open(&cfg, dir.path(), Actor::new("admin01")).await.unwrap();
        app.accounts
            .create_account(&app.actor, &docket_test::test_new_account("clerk01"))
            .await
            .unwrap();

        let history = app.reader.history("users", 1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_name.name(), "admin01");
        assert!(dir.path().join("data").join("docket.db").exists());
    }
}
