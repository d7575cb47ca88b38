//! Account records.

use docket_core::{Role, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored user account.
///
/// The credential is never serialized and is redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned row id.
    pub id: i64,
    /// Unique, case-sensitive login name.
    pub username: String,
    #[serde(skip_serializing, default)]
    pub(crate) password_hash: String,
    /// Role string used for authorization.
    pub role: Role,
    /// Branch the user belongs to, if any.
    pub branch_id: Option<i64>,
    /// When the account was created.
    pub created_at: Timestamp,
    /// When the account was last changed.
    pub updated_at: Timestamp,
}

impl Account {
    /// The stored `salt:hash` credential.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("branch_id", &self.branch_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Input for creating an account.
#[derive(Clone)]
pub struct NewAccount {
    /// Login name.
    pub username: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Role string.
    pub role: Role,
    /// Branch, if any.
    pub branch_id: Option<i64>,
}

impl NewAccount {
    /// Build account input.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
            branch_id: None,
        }
    }

    /// Assign a branch.
    #[must_use]
    pub fn branch(mut self, branch_id: i64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("branch_id", &self.branch_id)
            .finish_non_exhaustive()
    }
}

impl Drop for NewAccount {
    fn drop(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.password);
    }
}
