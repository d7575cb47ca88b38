//! CLI theme and styling.

use colored::Colorize;
use docket_core::{Actor, Timestamp};

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(72).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("{}: {}", key.bold(), value)
    }

    /// Format an actor, dimming the sentinel.
    pub(crate) fn actor(actor: &Actor) -> String {
        if actor.is_system() {
            actor.name().dimmed().to_string()
        } else {
            actor.name().cyan().to_string()
        }
    }

    /// Format a timestamp in local-independent UTC.
    pub(crate) fn timestamp(ts: &Timestamp) -> String {
        ts.0.format("%Y-%m-%d %H:%M:%S").to_string().dimmed().to_string()
    }
}
