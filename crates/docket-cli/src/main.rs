//! Docket CLI - credential and audit administration.
//!
//! Hashes and verifies credentials, manages user accounts (every change is
//! written to the audit log), and reads the audit log back.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docket_config::{LoadPaths, ResolvedConfig};
use docket_core::Actor;
use docket_telemetry::{LogConfig, LogFormat, RequestContext, RequestGuard};

mod app;
mod commands;
pub mod config_bridge;
mod prompt;
mod theme;

use app::App;
use commands::{audit, config, password, user};
use theme::Theme;

/// Docket - credential and audit administration
#[derive(Parser)]
#[command(name = "docket")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this directory instead of ~/.docket
    #[arg(long, global = true, env = "DOCKET_HOME")]
    home: Option<PathBuf>,

    /// Attribute changes to this user (default: System)
    #[arg(long = "as", global = true, env = "DOCKET_USER", value_name = "USER")]
    actor: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password and print the stored credential
    HashPassword {
        /// Read the password from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },

    /// Check a password against a stored credential (exit 1 on mismatch)
    VerifyPassword {
        /// Stored `salt:hash` credential
        stored: String,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Read the audit log
    Audit {
        #[command(subcommand)]
        command: AuditCommands,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a user
    Create {
        /// Login name
        username: String,
        /// Role string
        #[arg(long, default_value = "clerk")]
        role: String,
        /// Branch id
        #[arg(long)]
        branch: Option<i64>,
        /// Read the password from stdin
        #[arg(long)]
        stdin: bool,
    },
    /// Change a user's password
    Passwd {
        /// Login name
        username: String,
        /// Read the password from stdin
        #[arg(long)]
        stdin: bool,
    },
    /// Change a user's role
    Role {
        /// Login name
        username: String,
        /// New role string
        role: String,
    },
    /// Delete a user
    Delete {
        /// Login name
        username: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check a user's password
    Login {
        /// Login name
        username: String,
        /// Read the password from stdin
        #[arg(long)]
        stdin: bool,
    },
    /// List users
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum AuditCommands {
    /// List entries, newest first
    List {
        /// Only this table
        #[arg(long)]
        table: Option<String>,
        /// Only this record id
        #[arg(long)]
        record: Option<i64>,
        /// Only this user
        #[arg(long)]
        user: Option<String>,
        /// Only this action (INSERT, UPDATE, DELETE, LOGIN, ...)
        #[arg(long)]
        action: Option<String>,
        /// Entries at or after this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        /// Entries at or before this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
        /// Maximum entries to show
        #[arg(long, default_value = "50")]
        limit: usize,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every entry for one record
    History {
        /// Table name
        table: String,
        /// Record id
        record: i64,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Show entry counts
    Stats,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Output format: toml (default) or json
        #[arg(long, default_value = "toml")]
        format: String,
        /// Only this section
        #[arg(long)]
        section: Option<String>,
    },
    /// Validate the configuration
    Validate,
    /// Show the files and variables that are consulted
    Paths,
}

impl Commands {
    /// Name used for the request span.
    fn operation(&self) -> &'static str {
        match self {
            Self::HashPassword { .. } => "hash-password",
            Self::VerifyPassword { .. } => "verify-password",
            Self::User { command } => match command {
                UserCommands::Create { .. } => "user create",
                UserCommands::Passwd { .. } => "user passwd",
                UserCommands::Role { .. } => "user role",
                UserCommands::Delete { .. } => "user delete",
                UserCommands::Login { .. } => "user login",
                UserCommands::List { .. } => "user list",
            },
            Self::Audit { command } => match command {
                AuditCommands::List { .. } => "audit list",
                AuditCommands::History { .. } => "audit history",
                AuditCommands::Stats => "audit stats",
            },
            Self::Config { .. } => "config",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LoadPaths::resolve(cli.home.as_deref())?;
    let loaded = docket_config::loader::load_from(&paths, &docket_config::env::collect_env_vars());

    // Set up logging from config, with --verbose override.
    let log_config = if let Ok(resolved) = &loaded {
        let mut lc = config_bridge::to_log_config(&resolved.config);
        if cli.verbose {
            "debug".clone_into(&mut lc.level);
        }
        lc
    } else {
        // Fallback if config loading fails.
        let level = if cli.verbose { "debug" } else { "warn" };
        LogConfig::new(level).with_format(LogFormat::Compact)
    };
    if let Err(e) = docket_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let resolved = match loaded {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{}", Theme::error(&format!("Configuration error: {e}")));
            std::process::exit(1);
        },
    };

    let actor = Actor::from_optional(cli.actor.as_deref());
    let ctx = RequestContext::new("cli")
        .with_actor(actor.clone())
        .with_operation(cli.command.operation());

    match cli.command {
        Commands::Config { command } => {
            let _guard = RequestGuard::new(ctx);
            handle_config(&resolved, &paths, command)
        },
        Commands::HashPassword { stdin } => ctx.instrument(password::hash_password(stdin)).await,
        Commands::VerifyPassword { stored, stdin } => {
            let matched = ctx
                .instrument(password::verify_password(stored, stdin))
                .await?;
            if !matched {
                std::process::exit(1);
            }
            Ok(())
        },
        Commands::User { command } => {
            let app = App::open(&resolved.config, &paths.user_dir, actor).await?;
            ctx.instrument(handle_user(&app, command)).await
        },
        Commands::Audit { command } => {
            let app = App::open(&resolved.config, &paths.user_dir, actor).await?;
            ctx.instrument(handle_audit(&app, command)).await
        },
    }
}

async fn handle_user(app: &App, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::Create {
            username,
            role,
            branch,
            stdin,
        } => user::create(app, &username, &role, branch, stdin).await,
        UserCommands::Passwd { username, stdin } => user::passwd(app, &username, stdin).await,
        UserCommands::Role { username, role } => user::set_role(app, &username, &role).await,
        UserCommands::Delete { username, yes } => user::delete(app, &username, yes).await,
        UserCommands::Login { username, stdin } => user::login(app, &username, stdin).await,
        UserCommands::List { json } => user::list(app, json).await,
    }
}

async fn handle_audit(app: &App, command: AuditCommands) -> Result<()> {
    match command {
        AuditCommands::List {
            table,
            record,
            user,
            action,
            since,
            until,
            limit,
            json,
        } => {
            let args = audit::ListArgs {
                table,
                record,
                user,
                action,
                since,
                until,
                limit,
            };
            audit::list(app, &args, json).await
        },
        AuditCommands::History {
            table,
            record,
            json,
        } => audit::history(app, &table, record, json).await,
        AuditCommands::Stats => audit::stats(app).await,
    }
}

fn handle_config(resolved: &ResolvedConfig, paths: &LoadPaths, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { format, section } => {
            config::show(resolved, &format, section.as_deref())
        },
        ConfigCommands::Validate => {
            config::validate(resolved);
            Ok(())
        },
        ConfigCommands::Paths => {
            config::paths(resolved, paths);
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "docket", "--as", "admin01", "user", "create", "clerk01", "--role", "judge",
            "--branch", "3", "--stdin",
        ])
        .unwrap();

        assert_eq!(cli.actor.as_deref(), Some("admin01"));
        assert_eq!(cli.command.operation(), "user create");
        match cli.command {
            Commands::User {
                command:
                    UserCommands::Create {
                        username,
                        role,
                        branch,
                        stdin,
                    },
            } => {
                assert_eq!(username, "clerk01");
                assert_eq!(role, "judge");
                assert_eq!(branch, Some(3));
                assert!(stdin);
            },
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn test_parse_audit_list_defaults() {
        let cli = Cli::try_parse_from(["docket", "audit", "list", "--table", "users"]).unwrap();
        match cli.command {
            Commands::Audit {
                command: AuditCommands::List { table, limit, json, .. },
            } => {
                assert_eq!(table.as_deref(), Some("users"));
                assert_eq!(limit, 50);
                assert!(!json);
            },
            _ => panic!("expected audit list"),
        }
    }

    #[test]
    fn test_verify_password_requires_blob() {
        assert!(Cli::try_parse_from(["docket", "verify-password"]).is_err());
    }
}
