//! Audit entry types.
//!
//! An entry records who changed what, when, and how. Entries are immutable
//! once written; the timestamp is always assigned by [`AuditLog`](crate::AuditLog)
//! at write time.

use std::borrow::Cow;
use std::fmt;

use docket_core::{Actor, Timestamp};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEntryId(pub i64);

impl fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verb describing the mutation.
///
/// Free text; the constants cover the conventional verbs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditAction(Cow<'static, str>);

impl AuditAction {
    /// A row was created.
    pub const INSERT: Self = Self(Cow::Borrowed("INSERT"));
    /// A row was modified.
    pub const UPDATE: Self = Self(Cow::Borrowed("UPDATE"));
    /// A row was removed.
    pub const DELETE: Self = Self(Cow::Borrowed("DELETE"));
    /// A user signed in.
    pub const LOGIN: Self = Self(Cow::Borrowed("LOGIN"));

    /// Create a custom action verb.
    #[must_use]
    pub fn new(action: impl Into<String>) -> Self {
        Self(Cow::Owned(action.into()))
    }

    /// The verb as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AuditAction {
    fn from(action: &str) -> Self {
        Self::new(action)
    }
}

impl From<String> for AuditAction {
    fn from(action: String) -> Self {
        Self::new(action)
    }
}

/// Identifier of the affected row.
///
/// Zero or negative means the action does not target a single row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Placeholder for actions without a target row.
    pub const NOT_APPLICABLE: Self = Self(0);

    /// Whether this names an actual row.
    #[must_use]
    pub fn is_applicable(self) -> bool {
        self.0 > 0
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened, as described by the caller.
///
/// Carries everything except the actor (passed explicitly) and the
/// timestamp (assigned by the log).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The action verb.
    pub action: AuditAction,
    /// Logical entity name.
    pub table_name: String,
    /// Affected row.
    pub record_id: RecordId,
    /// Free-text details, stored verbatim.
    pub details: String,
}

impl AuditEvent {
    /// Start an event for `action` on `table_name`.
    #[must_use]
    pub fn new(action: impl Into<AuditAction>, table_name: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            table_name: table_name.into(),
            record_id: RecordId::NOT_APPLICABLE,
            details: String::new(),
        }
    }

    /// Set the affected row.
    #[must_use]
    pub fn record_id(mut self, id: impl Into<RecordId>) -> Self {
        self.record_id = id.into();
        self
    }

    /// Set the details text.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }
}

/// A stamped entry on its way to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    /// The action verb.
    pub action: AuditAction,
    /// Logical entity name.
    pub table_name: String,
    /// Affected row.
    pub record_id: RecordId,
    /// Acting user.
    pub user_name: Actor,
    /// Free-text details.
    pub details: String,
    /// Write time.
    pub timestamp: Timestamp,
}

impl NewAuditEntry {
    pub(crate) fn stamp(actor: &Actor, event: AuditEvent) -> Self {
        Self {
            action: event.action,
            table_name: event.table_name,
            record_id: event.record_id,
            user_name: actor.clone(),
            details: event.details,
            timestamp: Timestamp::now(),
        }
    }

    /// Attach the store-assigned identifier.
    #[must_use]
    pub fn into_entry(self, id: AuditEntryId) -> AuditEntry {
        AuditEntry {
            id,
            action: self.action,
            table_name: self.table_name,
            record_id: self.record_id,
            user_name: self.user_name,
            details: self.details,
            timestamp: self.timestamp,
        }
    }
}

/// A persisted audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry identifier.
    pub id: AuditEntryId,
    /// The action verb.
    pub action: AuditAction,
    /// Logical entity name.
    pub table_name: String,
    /// Affected row.
    pub record_id: RecordId,
    /// Acting user, or the sentinel.
    pub user_name: Actor,
    /// Free-text details, verbatim.
    pub details: String,
    /// When the entry was written.
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_defaults() {
        let event = AuditEvent::new(AuditAction::DELETE, "hearings");
        assert_eq!(event.record_id, RecordId::NOT_APPLICABLE);
        assert!(event.details.is_empty());
        assert!(!event.record_id.is_applicable());
    }

    #[test]
    fn test_custom_action() {
        let action = AuditAction::from("EXPORT");
        assert_eq!(action.as_str(), "EXPORT");
        assert_ne!(action, AuditAction::INSERT);
        assert_eq!(AuditAction::new("INSERT"), AuditAction::INSERT);
    }

    #[test]
    fn test_stamp_uses_actor_and_current_time() {
        let before = Timestamp::now();
        let entry = NewAuditEntry::stamp(
            &Actor::system(),
            AuditEvent::new("UPDATE", "tasks").record_id(12).details("done"),
        );
        let after = Timestamp::now();

        assert!(entry.timestamp >= before && entry.timestamp <= after);
        assert!(entry.user_name.is_system());
        assert_eq!(entry.record_id, RecordId(12));
    }

    #[test]
    fn test_entry_serializes_flat() {
        let entry = NewAuditEntry::stamp(&Actor::new("clerk"), AuditEvent::new("INSERT", "branches"))
            .into_entry(AuditEntryId(3));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["action"], "INSERT");
        assert_eq!(json["user_name"], "clerk");
        assert_eq!(json["record_id"], 0);
    }
}
