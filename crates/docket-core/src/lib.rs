//! Docket Core - Shared types for the Docket records backend.
//!
//! This crate provides:
//! - [`Timestamp`], a UTC instant that never goes backwards within a process
//! - [`Actor`], the explicit identity attributed to a mutation
//! - [`Role`], the role string carried by user accounts
//!
//! Nothing here reads ambient request or session state. Callers resolve the
//! acting user themselves and pass it down as an [`Actor`].

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod types;

pub use types::{Actor, Role, Timestamp};
