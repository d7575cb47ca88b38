//! `config` subcommands.

use anyhow::Result;
use docket_config::{LoadPaths, ResolvedConfig, ShowFormat};

use crate::config_bridge;
use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show(resolved: &ResolvedConfig, format: &str, section: Option<&str>) -> Result<()> {
    let show_format = match format {
        "json" => ShowFormat::Json,
        _ => ShowFormat::Toml,
    };

    let output = resolved
        .show(show_format, section)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

/// Report that the configuration loaded and validated.
pub(crate) fn validate(resolved: &ResolvedConfig) {
    println!("{}", Theme::success("Configuration is valid"));
    if !resolved.loaded_files.is_empty() {
        println!("\nLoaded files:");
        for path in &resolved.loaded_files {
            println!("  - {path}");
        }
    }
}

/// Show the files, database and environment variables consulted.
pub(crate) fn paths(resolved: &ResolvedConfig, paths: &LoadPaths) {
    println!("\n{}", Theme::header("Config files (lowest to highest precedence)"));
    if let Some(system) = &paths.system {
        println!("  {}", path_line(&system.display().to_string(), resolved));
    }
    println!("  {}", path_line(&paths.user_file().display().to_string(), resolved));

    let database = config_bridge::database_path(&resolved.config, &paths.user_dir)
        .map_or_else(|| "(in memory)".to_owned(), |p| p.display().to_string());
    println!("\n{}", Theme::kv("Database", &database));

    println!("\n{}", Theme::header("Environment fallbacks"));
    for var in docket_config::env::known_env_vars() {
        let state = if std::env::var_os(var).is_some() {
            "set"
        } else {
            "unset"
        };
        println!("  {var:<32} {}", Theme::dimmed(state));
    }
    println!();
}

fn path_line(path: &str, resolved: &ResolvedConfig) -> String {
    if resolved.loaded_files.iter().any(|f| f == path) {
        format!("{path} {}", Theme::dimmed("(loaded)"))
    } else {
        format!("{path} {}", Theme::dimmed("(not found)"))
    }
}
