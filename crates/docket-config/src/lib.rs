//! Layered configuration for Docket.
//!
//! # Usage
//!
//! ```rust,no_run
//! use docket_config::Config;
//!
//! // defaults → /etc/docket → ~/.docket → DOCKET_* fallbacks → validate
//! let resolved = Config::load().unwrap();
//! println!("audit timeout: {:?}", resolved.config.audit.write_timeout());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **User** (`~/.docket/config.toml`)
//! 2. **System** (`/etc/docket/config.toml`)
//! 3. **Environment variables** (`DOCKET_*`), fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! This crate has no dependencies on other internal crates. Conversion to
//! domain types happens in the binary.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with source tracking.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::LoadPaths;
pub use merge::ConfigLayer;
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load() -> ConfigResult<ResolvedConfig> {
        loader::load(None)
    }

    /// Load with an explicit `.docket` directory in place of `~/.docket`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with_home(docket_home: &std::path::Path) -> ConfigResult<ResolvedConfig> {
        loader::load(Some(docket_home))
    }

    /// Load a single file, without layering.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
