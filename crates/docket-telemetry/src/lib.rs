//! Docket Telemetry - logging and request tracing.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats and targets
//! - Request context carrying the acting user into tracing spans
//!
//! # Example
//!
//! ```rust,no_run
//! use docket_core::Actor;
//! use docket_telemetry::{LogConfig, LogFormat, RequestContext, RequestGuard, setup_logging};
//!
//! # fn main() -> Result<(), docket_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("docket_audit::gap=warn");
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("cli")
//!     .with_actor(Actor::new("clerk01"))
//!     .with_operation("user create");
//! let _guard = RequestGuard::new(ctx);
//! tracing::info!("handling request");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
