//! `audit` subcommands - read the audit log.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use colored::Colorize;
use docket_audit::{AuditEntry, AuditFilter};
use docket_core::Timestamp;

use crate::app::App;
use crate::theme::Theme;

/// Filters accepted by `audit list`.
#[derive(Debug, Default)]
pub(crate) struct ListArgs {
    pub(crate) table: Option<String>,
    pub(crate) record: Option<i64>,
    pub(crate) user: Option<String>,
    pub(crate) action: Option<String>,
    pub(crate) since: Option<String>,
    pub(crate) until: Option<String>,
    pub(crate) limit: usize,
}

impl ListArgs {
    fn to_filter(&self) -> Result<AuditFilter> {
        let mut filter = AuditFilter::all().limit(self.limit);
        if let Some(table) = &self.table {
            filter = filter.table(table.as_str());
        }
        if let Some(record) = self.record {
            filter = filter.record(record);
        }
        if let Some(user) = &self.user {
            filter = filter.user(user.as_str());
        }
        if let Some(action) = &self.action {
            filter = filter.action(action.to_ascii_uppercase());
        }
        if let Some(since) = &self.since {
            filter = filter.since(parse_time(since)?);
        }
        if let Some(until) = &self.until {
            filter = filter.until(parse_time(until)?);
        }
        Ok(filter)
    }
}

/// Print entries matching `args`, newest first.
pub(crate) async fn list(app: &App, args: &ListArgs, json: bool) -> Result<()> {
    let filter = args.to_filter()?;
    let entries = app.reader.list(&filter).await?;
    print_entries(&entries, json, "No matching audit entries")
}

/// Print the history of one row.
pub(crate) async fn history(app: &App, table: &str, record: i64, json: bool) -> Result<()> {
    let entries = app.reader.history(table, record).await?;
    print_entries(&entries, json, &format!("No audit entries for {table}#{record}"))
}

/// Print the number of entries per action.
pub(crate) async fn stats(app: &App) -> Result<()> {
    let total = app.reader.count(&AuditFilter::all()).await?;

    println!("\n{}", Theme::header("Audit Log"));
    println!("{}", Theme::kv("Total entries", &total.to_string()));
    for action in ["INSERT", "UPDATE", "DELETE", "LOGIN"] {
        let n = app.reader.count(&AuditFilter::all().action(action)).await?;
        println!("  {:<8} {n}", action.dimmed());
    }
    println!();
    Ok(())
}

fn print_entries(entries: &[AuditEntry], json: bool, empty: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", Theme::info(empty));
        return Ok(());
    }

    println!("\n{}", Theme::header("Audit Entries"));
    println!(
        "{:<19}  {:<16} {:<8} {:<16} {:>8}  {}",
        "TIMESTAMP".dimmed(),
        "USER".dimmed(),
        "ACTION".dimmed(),
        "TABLE".dimmed(),
        "RECORD".dimmed(),
        "DETAILS".dimmed()
    );
    println!("{}", Theme::separator());
    for entry in entries {
        println!("{}", entry_row(entry));
    }
    println!();
    Ok(())
}

fn entry_row(entry: &AuditEntry) -> String {
    let record = if entry.record_id.is_applicable() {
        entry.record_id.to_string()
    } else {
        "-".to_owned()
    };
    format!(
        "{:<19}  {:<16} {:<8} {:<16} {:>8}  {}",
        Theme::timestamp(&entry.timestamp),
        Theme::actor(&entry.user_name),
        entry.action.as_str(),
        entry.table_name,
        record,
        Theme::dimmed(&entry.details)
    )
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC).
fn parse_time(input: &str) -> Result<Timestamp> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Timestamp::from_datetime(dt.with_timezone(&Utc)));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("invalid time '{input}': expected RFC 3339 or YYYY-MM-DD"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("invalid date '{input}'"))?;
    Ok(Timestamp::from_datetime(midnight.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_audit::{AuditAction, AuditEntryId, RecordId};
    use docket_core::Actor;

    #[test]
    fn test_parse_time() {
        let ts = parse_time("2026-03-01").unwrap();
        assert_eq!(ts.to_string(), "2026-03-01T00:00:00.000000Z");

        let ts = parse_time("2026-03-01T10:30:00+02:00").unwrap();
        assert_eq!(ts.to_string(), "2026-03-01T08:30:00.000000Z");

        assert!(parse_time("yesterday").is_err());
        assert!(parse_time("2026-13-01").is_err());
    }

    #[test]
    fn test_filter_from_args() {
        let args = ListArgs {
            table: Some("users".to_owned()),
            record: Some(4),
            user: Some("admin01".to_owned()),
            action: Some("update".to_owned()),
            since: Some("2026-01-01".to_owned()),
            until: None,
            limit: 10,
        };
        let filter = args.to_filter().unwrap();
        assert_eq!(filter.table_name.as_deref(), Some("users"));
        assert_eq!(filter.record_id, Some(RecordId(4)));
        assert_eq!(filter.user_name.as_deref(), Some("admin01"));
        assert_eq!(filter.action, Some(AuditAction::UPDATE));
        assert!(filter.since.is_some());
        assert_eq!(filter.limit, Some(10));
    }

    #[test]
    fn test_bad_since_is_rejected() {
        let args = ListArgs {
            since: Some("last week".to_owned()),
            limit: 10,
            ..ListArgs::default()
        };
        assert!(args.to_filter().is_err());
    }

    #[test]
    fn test_entry_row_hides_inapplicable_record() {
        let entry = AuditEntry {
            id: AuditEntryId(1),
            action: AuditAction::LOGIN,
            table_name: "users".to_owned(),
            record_id: RecordId::NOT_APPLICABLE,
            user_name: Actor::system(),
            details: "User clerk01 logged in".to_owned(),
            timestamp: Timestamp::now(),
        };
        let row = entry_row(&entry);
        assert!(row.contains("LOGIN"));
        assert!(row.contains("       -  "));
        assert!(row.contains("User clerk01 logged in"));
    }
}
