//! Prelude module - commonly used types for convenient import.
//!
//! Use `use docket_audit::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuditError, AuditResult};

// Entry types
pub use crate::{AuditAction, AuditEntry, AuditEntryId, AuditEvent, RecordId};

// Log and reader
pub use crate::{AuditLog, AuditPolicy, AuditReader};

// Storage
pub use crate::{AuditFilter, AuditStore, SqliteAuditStore};

// Actor
pub use crate::Actor;
