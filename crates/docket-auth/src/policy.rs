//! Input validation and the authorization rule.

use crate::account::Account;
use crate::error::{AuthError, AuthResult};

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_BYTES: usize = 64;

/// Default longest accepted password, in bytes.
pub const DEFAULT_MAX_PASSWORD_BYTES: usize = 1024;

/// Rules for new passwords.
///
/// Only applied when a password is set. Verification accepts whatever was
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Longest accepted password, in bytes.
    pub max_bytes: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_PASSWORD_BYTES,
        }
    }
}

impl PasswordPolicy {
    /// Check a new password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if the password is blank or too long.
    pub fn check(&self, password: &str) -> AuthResult<()> {
        if password.trim().is_empty() {
            return Err(AuthError::validation("password", "must not be empty"));
        }
        if password.len() > self.max_bytes {
            return Err(AuthError::validation(
                "password",
                format!("must be at most {} bytes", self.max_bytes),
            ));
        }
        Ok(())
    }
}

/// Check a username for creation.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] if the name is blank, too long, has
/// surrounding whitespace, or contains control characters.
pub fn check_username(username: &str) -> AuthResult<()> {
    if username.trim().is_empty() {
        return Err(AuthError::validation("username", "must not be empty"));
    }
    if username.len() > MAX_USERNAME_BYTES {
        return Err(AuthError::validation(
            "username",
            format!("must be at most {MAX_USERNAME_BYTES} bytes"),
        ));
    }
    if username.trim() != username {
        return Err(AuthError::validation(
            "username",
            "must not start or end with whitespace",
        ));
    }
    if username.chars().any(char::is_control) {
        return Err(AuthError::validation(
            "username",
            "must not contain control characters",
        ));
    }
    Ok(())
}

/// Check a role string.
///
/// # Errors
///
/// Returns [`AuthError::Validation`] if the role is blank.
pub fn check_role(role: &docket_core::Role) -> AuthResult<()> {
    if role.is_empty() {
        return Err(AuthError::validation("role", "must not be empty"));
    }
    Ok(())
}

/// The only authorization rule: a role string comparison.
///
/// The admin role passes every check.
///
/// # Errors
///
/// Returns [`AuthError::Forbidden`] if the account's role does not satisfy
/// `required`.
pub fn require_role(account: &Account, required: &str) -> AuthResult<()> {
    if account.role.satisfies(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            required: required.trim().to_string(),
        })
    }
}
