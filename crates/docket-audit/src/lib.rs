//! Docket Audit - append-only audit logging.
//!
//! This crate provides:
//! - Flat audit entries: action, table, row, actor, details, timestamp
//! - Server-assigned, per-process monotonic timestamps
//! - A bounded, retrying write path that never fails the audited mutation
//! - Persistent storage in the `audit_log` table of the embedded database
//! - A read-only [`AuditReader`]
//!
//! # Recording Model
//!
//! The audited mutation commits first; the audit entry is written after it
//! with no shared transaction. A failed audit write is either returned to
//! the caller ([`AuditLog::record`]) or reported on the
//! [`GAP_TARGET`] tracing target ([`AuditLog::record_best_effort`]). It is
//! never propagated as a failure of the primary operation.
//!
//! The acting user is always passed explicitly. Use [`Actor::system`] when
//! there is none; the sentinel name `"System"` is recorded.
//!
//! # Example
//!
//! ```
//! use docket_audit::{AuditAction, AuditEvent, AuditFilter, AuditLog, AuditReader};
//! use docket_core::Actor;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let log = AuditLog::in_memory().await.unwrap();
//!
//! // The primary mutation has already succeeded at this point.
//! log.record_best_effort(
//!     &Actor::new("clerk01"),
//!     AuditEvent::new(AuditAction::INSERT, "hearings")
//!         .record_id(42)
//!         .details("Scheduled hearing for case 2024-117"),
//! )
//! .await;
//!
//! let reader = AuditReader::for_log(&log);
//! let entries = reader.list(&AuditFilter::all().table("hearings")).await.unwrap();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].user_name.name(), "clerk01");
//! # });
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod entry;
mod error;
mod log;
mod reader;
mod store;

pub use entry::{AuditAction, AuditEntry, AuditEntryId, AuditEvent, NewAuditEntry, RecordId};
pub use error::{AuditError, AuditResult};
pub use log::{AuditLog, AuditPolicy, GAP_TARGET};
pub use reader::AuditReader;
pub use store::{AuditFilter, AuditStore, SqliteAuditStore};

// Re-export for callers naming the actor
pub use docket_core::Actor;
