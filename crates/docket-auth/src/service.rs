//! Account management and login.
//!
//! Each mutating operation writes its row first and then records an audit
//! entry on the best-effort path. An audit failure is reported, never
//! returned, so it cannot undo or fail the account change.

use std::sync::Arc;

use docket_audit::{AuditAction, AuditEvent, AuditLog};
use docket_core::{Actor, Role, Timestamp};
use docket_storage::Database;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::account::{Account, NewAccount};
use crate::error::{AuthError, AuthResult};
use crate::policy::{PasswordPolicy, check_role, check_username};
use crate::store::{AccountStore, SqliteAccountStore};

/// Audit table name for account changes.
pub const USERS_TABLE: &str = "users";

/// Account lifecycle and authentication.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    audit: AuditLog,
    policy: PasswordPolicy,
}

impl AccountService {
    /// Create a service over explicit collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, audit: AuditLog, policy: PasswordPolicy) -> Self {
        Self {
            store,
            audit,
            policy,
        }
    }

    /// Create a service with accounts stored in `db`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `users` table cannot be created.
    pub async fn open(db: Database, audit: AuditLog, policy: PasswordPolicy) -> AuthResult<Self> {
        let store = SqliteAccountStore::open(db).await?;
        Ok(Self::new(Arc::new(store), audit, policy))
    }

    /// The audit log entries are written to.
    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for bad input,
    /// [`AuthError::DuplicateUser`] if the name is taken, or a storage or
    /// hashing error.
    pub async fn create_account(&self, actor: &Actor, new: &NewAccount) -> AuthResult<Account> {
        check_username(&new.username)?;
        check_role(&new.role)?;
        self.policy.check(&new.password)?;

        if self.store.get(&new.username).await?.is_some() {
            return Err(AuthError::DuplicateUser(new.username.clone()));
        }

        let password_hash = hash_blocking(Zeroizing::new(new.password.clone())).await?;
        let now = Timestamp::now();
        let account = self
            .store
            .insert(Account {
                id: 0,
                username: new.username.clone(),
                password_hash,
                role: new.role.clone(),
                branch_id: new.branch_id,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(user = %account.username, role = %account.role, by = %actor, "account created");

        self.audit
            .record_best_effort(
                actor,
                AuditEvent::new(AuditAction::INSERT, USERS_TABLE)
                    .record_id(account.id)
                    .details(format!(
                        "Created user {} with role {}",
                        account.username, account.role
                    )),
            )
            .await;
        Ok(account)
    }

    /// Replace an account's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the new password is rejected,
    /// [`AuthError::UserNotFound`], or a storage or hashing error.
    pub async fn change_password(
        &self,
        actor: &Actor,
        username: &str,
        new_password: &str,
    ) -> AuthResult<Account> {
        self.policy.check(new_password)?;
        let mut account = self.require_account(username).await?;

        account.password_hash = hash_blocking(Zeroizing::new(new_password.to_owned())).await?;
        account.updated_at = Timestamp::now();
        self.store.update(&account).await?;
        info!(user = %account.username, by = %actor, "password changed");

        self.audit
            .record_best_effort(
                actor,
                AuditEvent::new(AuditAction::UPDATE, USERS_TABLE)
                    .record_id(account.id)
                    .details(format!("Changed password for user {}", account.username)),
            )
            .await;
        Ok(account)
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a blank role,
    /// [`AuthError::UserNotFound`], or a storage error.
    pub async fn update_role(&self, actor: &Actor, username: &str, role: Role) -> AuthResult<Account> {
        check_role(&role)?;
        let mut account = self.require_account(username).await?;

        let previous = std::mem::replace(&mut account.role, role);
        account.updated_at = Timestamp::now();
        self.store.update(&account).await?;
        info!(user = %account.username, from = %previous, to = %account.role, by = %actor, "role changed");

        self.audit
            .record_best_effort(
                actor,
                AuditEvent::new(AuditAction::UPDATE, USERS_TABLE)
                    .record_id(account.id)
                    .details(format!(
                        "Changed role of {}: {} -> {}",
                        account.username, previous, account.role
                    )),
            )
            .await;
        Ok(account)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] or a storage error.
    pub async fn delete_account(&self, actor: &Actor, username: &str) -> AuthResult<()> {
        let account = self.require_account(username).await?;
        if !self.store.delete(username).await? {
            return Err(AuthError::UserNotFound(username.to_owned()));
        }
        info!(user = %account.username, by = %actor, "account deleted");

        self.audit
            .record_best_effort(
                actor,
                AuditEvent::new(AuditAction::DELETE, USERS_TABLE)
                    .record_id(account.id)
                    .details(format!("Deleted user {}", account.username)),
            )
            .await;
        Ok(())
    }

    /// Check a username and password.
    ///
    /// Unknown users, wrong passwords, and corrupted stored credentials all
    /// yield [`AuthError::InvalidCredentials`] after one full key
    /// derivation. Successful logins are audited as `LOGIN`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any mismatch, or a
    /// storage error if the account cannot be looked up.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Account> {
        let password = Zeroizing::new(password.to_owned());
        let Some(account) = self.store.get(username).await? else {
            tokio::task::spawn_blocking(move || docket_crypto::burn_verification_cost(&password))
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let stored = account.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || docket_crypto::verify_password(&password, &stored))
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !verified {
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user = %account.username, "login succeeded");
        self.audit
            .record_best_effort(
                &Actor::new(account.username.as_str()),
                AuditEvent::new(AuditAction::LOGIN, USERS_TABLE)
                    .record_id(account.id)
                    .details(format!("User {} logged in", account.username)),
            )
            .await;
        Ok(account)
    }

    /// Look up an account.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn get_account(&self, username: &str) -> AuthResult<Option<Account>> {
        self.store.get(username).await
    }

    /// All accounts, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn list_accounts(&self) -> AuthResult<Vec<Account>> {
        self.store.list().await
    }

    async fn require_account(&self, username: &str) -> AuthResult<Account> {
        self.store
            .get(username)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_owned()))
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Hash on the blocking pool; PBKDF2 is CPU-bound.
async fn hash_blocking(password: Zeroizing<String>) -> AuthResult<String> {
    tokio::task::spawn_blocking(move || docket_crypto::hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(AuthError::from)
}
