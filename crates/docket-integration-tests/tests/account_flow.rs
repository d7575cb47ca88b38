//! Account lifecycle against an on-disk database, read back from the audit log.

mod common;

use std::time::Duration;

use common::Harness;
use docket_audit::{AuditAction, AuditFilter, AuditPolicy};
use docket_auth::{AuthError, USERS_TABLE, require_role};
use docket_core::{Actor, Role};
use docket_storage::StorageError;
use docket_test::{TEST_PASSWORD, test_new_account};

#[tokio::test]
async fn full_lifecycle_is_audited_in_order() {
    let h = Harness::new().await;
    let admin = Actor::new("admin01");

    let account = h
        .accounts
        .create_account(&admin, &test_new_account("clerk01").branch(2))
        .await
        .unwrap();
    h.accounts
        .change_password(&admin, "clerk01", "a fresh passphrase")
        .await
        .unwrap();
    h.accounts
        .update_role(&admin, "clerk01", Role::new("judge"))
        .await
        .unwrap();
    h.accounts
        .authenticate("clerk01", "a fresh passphrase")
        .await
        .unwrap();
    h.accounts.delete_account(&admin, "clerk01").await.unwrap();

    let history = h.reader.history(USERS_TABLE, account.id).await.unwrap();
    let actions: Vec<&str> = history.iter().rev().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, ["INSERT", "UPDATE", "UPDATE", "LOGIN", "DELETE"]);

    for entry in &history {
        assert!(!entry.details.contains(TEST_PASSWORD));
        assert!(!entry.details.contains("a fresh passphrase"));
    }

    let login = history
        .iter()
        .find(|e| e.action == AuditAction::LOGIN)
        .unwrap();
    assert_eq!(login.user_name.name(), "clerk01");

    let role_change = &history[2];
    assert!(role_change.details.contains("clerk -> judge"));
    assert_eq!(role_change.user_name, admin);
}

#[tokio::test]
async fn failed_logins_are_not_distinguishable() {
    let h = Harness::new().await;
    h.accounts
        .create_account(&Actor::system(), &test_new_account("clerk02"))
        .await
        .unwrap();

    let wrong = h.accounts.authenticate("clerk02", "nope").await.unwrap_err();
    let unknown = h.accounts.authenticate("nobody", "nope").await.unwrap_err();

    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());

    let logins = h
        .reader
        .count(&AuditFilter::all().action(AuditAction::LOGIN))
        .await
        .unwrap();
    assert_eq!(logins, 0);
}

#[tokio::test]
async fn accounts_and_audit_survive_reopen() {
    let h = Harness::new().await;
    h.accounts
        .create_account(&Actor::new("admin01"), &test_new_account("clerk03"))
        .await
        .unwrap();

    let h = h.reopen().await;
    let account = h
        .accounts
        .authenticate("clerk03", TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(account.role, Role::new("clerk"));

    let entries = h
        .reader
        .list(&AuditFilter::all().table(USERS_TABLE))
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, AuditAction::LOGIN);
    assert_eq!(entries[1].action, AuditAction::INSERT);
}

#[tokio::test]
async fn audit_rows_cannot_be_edited_through_the_database() {
    let h = Harness::new().await;
    h.accounts
        .create_account(&Actor::system(), &test_new_account("clerk04"))
        .await
        .unwrap();

    let db = h.db.open();
    let update = db
        .call(|conn| conn.execute("UPDATE audit_log SET details = 'forged'", []))
        .await;
    let delete = db
        .call(|conn| conn.execute("DELETE FROM audit_log", []))
        .await;
    assert!(matches!(update, Err(StorageError::Conflict(_) | StorageError::Internal(_))));
    assert!(matches!(delete, Err(StorageError::Conflict(_) | StorageError::Internal(_))));

    let entries = h.reader.list(&AuditFilter::all()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_ne!(entries[0].details, "forged");
}

#[tokio::test]
async fn role_checks_use_the_stored_role() {
    let h = Harness::new().await;
    let admin = Actor::system();
    h.accounts
        .create_account(&admin, &test_new_account("clerk05"))
        .await
        .unwrap();

    let clerk = h.accounts.authenticate("clerk05", TEST_PASSWORD).await.unwrap();
    assert!(require_role(&clerk, "clerk").is_ok());
    assert!(matches!(
        require_role(&clerk, "admin"),
        Err(AuthError::Forbidden { .. })
    ));

    h.accounts
        .update_role(&admin, "clerk05", Role::admin())
        .await
        .unwrap();
    let promoted = h.accounts.authenticate("clerk05", TEST_PASSWORD).await.unwrap();
    assert!(require_role(&promoted, "judge").is_ok());
}

#[tokio::test]
async fn configured_policy_reaches_the_audit_log() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[audit]\nwrite_timeout_ms = 250\nmax_attempts = 2\nretry_backoff_ms = 5\n",
    )
    .unwrap();

    let resolved = docket_config::loader::load_from(
        &docket_config::LoadPaths::user_only(dir.path()),
        &std::collections::HashMap::new(),
    )
    .unwrap();
    let audit = &resolved.config.audit;
    let policy = AuditPolicy {
        write_timeout: audit.write_timeout(),
        max_attempts: audit.max_attempts,
        retry_backoff: audit.retry_backoff(),
    };

    let h = Harness::open(docket_test::TestDatabase::new(), policy).await;
    assert_eq!(h.audit.policy().write_timeout, Duration::from_millis(250));
    assert_eq!(h.audit.policy().max_attempts, 2);
}
