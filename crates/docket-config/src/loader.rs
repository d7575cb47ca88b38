//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `/etc/docket/config.toml` (system)
//! 3. Merge `~/.docket/config.toml` (user)
//! 4. Apply `DOCKET_*` env var fallbacks for fields no file set
//! 5. Deserialize merged tree → `Config`
//! 6. Validate
//! 7. Return `ResolvedConfig`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/docket/config.toml";

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Where the loader looks for files.
#[derive(Debug, Clone)]
pub struct LoadPaths {
    /// System config file, if any.
    pub system: Option<PathBuf>,
    /// The user's `.docket` directory.
    pub user_dir: PathBuf,
}

impl LoadPaths {
    /// Standard locations under `home_dir`.
    #[must_use]
    pub fn standard(home_dir: &Path) -> Self {
        Self {
            system: Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
            user_dir: home_dir.join(".docket"),
        }
    }

    /// Only the given `.docket` directory; no system file.
    #[must_use]
    pub fn user_only(user_dir: impl Into<PathBuf>) -> Self {
        Self {
            system: None,
            user_dir: user_dir.into(),
        }
    }

    /// Standard locations, with `docket_home_override` replacing `~/.docket`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if no override is given and the
    /// home directory cannot be determined.
    pub fn resolve(docket_home_override: Option<&Path>) -> ConfigResult<Self> {
        match docket_home_override {
            Some(dir) => Ok(Self {
                system: Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
                user_dir: dir.to_path_buf(),
            }),
            None => Ok(Self::standard(&home_directory()?)),
        }
    }

    /// The user config file inside the `.docket` directory.
    #[must_use]
    pub fn user_file(&self) -> PathBuf {
        self.user_dir.join("config.toml")
    }
}

/// Load the configuration with layered file precedence.
///
/// `docket_home_override` replaces `~/.docket` (the directory itself, not
/// the home directory).
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(docket_home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_from(&LoadPaths::resolve(docket_home_override)?, &collect_env_vars())
}

/// Load from explicit locations and environment.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_from<S: ::std::hash::BuildHasher>(
    paths: &LoadPaths,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    // 2. System config.
    if let Some(system_path) = &paths.system
        && let Some(overlay) = try_load_file(system_path)?
    {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::System,
            &mut field_sources,
        );
        loaded_files.push(system_path.display().to_string());
        info!(path = %system_path.display(), "loaded system config");
    }

    // 3. User config.
    let user_path = paths.user_file();
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::User,
            &mut field_sources,
        );
        loaded_files.push(user_path.display().to_string());
        info!(path = %user_path.display(), "loaded user config");
    }

    // 4. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 6. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;
    let config: Config =
        value
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: path.display().to_string(),
                source: e,
            })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// Uses a single read to avoid races between an existence check and the
/// read.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Determine the user's home directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDir`] if the platform reports none.
pub fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
