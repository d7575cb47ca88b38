//! Environment variable fallbacks.
//!
//! Env vars are fallback, not override: they only apply to fields that no
//! config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// How an env var value is typed in the TOML tree.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Str,
    Int,
    Bool,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: Kind,
}

/// All supported `DOCKET_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "DOCKET_DATA_DIR",
        field_path: "storage.data_dir",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "DOCKET_IN_MEMORY",
        field_path: "storage.in_memory",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "DOCKET_AUDIT_WRITE_TIMEOUT_MS",
        field_path: "audit.write_timeout_ms",
        kind: Kind::Int,
    },
    EnvMapping {
        var_name: "DOCKET_AUDIT_MAX_ATTEMPTS",
        field_path: "audit.max_attempts",
        kind: Kind::Int,
    },
    EnvMapping {
        var_name: "DOCKET_AUDIT_RETRY_BACKOFF_MS",
        field_path: "audit.retry_backoff_ms",
        kind: Kind::Int,
    },
    EnvMapping {
        var_name: "DOCKET_MAX_PASSWORD_BYTES",
        field_path: "auth.max_password_bytes",
        kind: Kind::Int,
    },
    EnvMapping {
        var_name: "DOCKET_LOG_LEVEL",
        field_path: "logging.level",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "DOCKET_LOG_FORMAT",
        field_path: "logging.format",
        kind: Kind::Str,
    },
];

/// Apply environment variable fallbacks to fields that no config file set.
///
/// Fields holding only a compiled-in default are eligible. Returns the
/// number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources.get(mapping.field_path).is_some_and(ConfigLayer::is_file) {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            set_field(merged, mapping.field_path, coerce(mapping.kind, val));
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Names of all recognised environment variables.
#[must_use]
pub fn known_env_vars() -> Vec<&'static str> {
    ENV_MAPPINGS.iter().map(|m| m.var_name).collect()
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Coerce a raw env value. Unparseable numbers and booleans stay strings so
/// that deserialization reports the bad value.
fn coerce(kind: Kind, val: &str) -> toml::Value {
    match kind {
        Kind::Int => val
            .trim()
            .parse::<i64>()
            .map_or_else(|_| toml::Value::String(val.to_owned()), toml::Value::Integer),
        Kind::Bool => val
            .trim()
            .parse::<bool>()
            .map_or_else(|_| toml::Value::String(val.to_owned()), toml::Value::Boolean),
        Kind::Str => toml::Value::String(val.to_owned()),
    }
}

/// Set a dotted `section.key` field, creating the section if needed.
fn set_field(root: &mut toml::Value, path: &str, val: toml::Value) {
    let Some((section, key)) = path.split_once('.') else {
        return;
    };
    let Some(root_table) = root.as_table_mut() else {
        return;
    };
    let section_val = root_table
        .entry(section.to_owned())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    if let Some(table) = section_val.as_table_mut() {
        table.insert(key.to_owned(), val);
    }
}
