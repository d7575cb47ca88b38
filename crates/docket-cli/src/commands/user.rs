//! `user` subcommands.

use anyhow::Result;
use colored::Colorize;
use docket_auth::{Account, NewAccount};
use docket_core::Role;

use crate::app::App;
use crate::prompt::{confirm, read_password};
use crate::theme::Theme;

/// Create an account.
pub(crate) async fn create(
    app: &App,
    username: &str,
    role: &str,
    branch: Option<i64>,
    from_stdin: bool,
) -> Result<()> {
    let password = read_password("Password", true, from_stdin)?;
    let mut new = NewAccount::new(username, password.as_str(), Role::new(role));
    if let Some(branch_id) = branch {
        new = new.branch(branch_id);
    }

    let account = app.accounts.create_account(&app.actor, &new).await?;
    println!(
        "{}",
        Theme::success(&format!(
            "Created user {} ({})",
            account.username, account.role
        ))
    );
    Ok(())
}

/// Replace a user's password.
pub(crate) async fn passwd(app: &App, username: &str, from_stdin: bool) -> Result<()> {
    let password = read_password("New password", true, from_stdin)?;
    app.accounts
        .change_password(&app.actor, username, &password)
        .await?;
    println!(
        "{}",
        Theme::success(&format!("Password changed for {username}"))
    );
    Ok(())
}

/// Change a user's role.
pub(crate) async fn set_role(app: &App, username: &str, role: &str) -> Result<()> {
    let account = app
        .accounts
        .update_role(&app.actor, username, Role::new(role))
        .await?;
    println!(
        "{}",
        Theme::success(&format!("{} is now {}", account.username, account.role))
    );
    Ok(())
}

/// Delete a user, asking first unless `yes`.
pub(crate) async fn delete(app: &App, username: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete user {username}?"))? {
        println!("{}", Theme::warning("Cancelled"));
        return Ok(());
    }
    app.accounts.delete_account(&app.actor, username).await?;
    println!("{}", Theme::success(&format!("Deleted user {username}")));
    Ok(())
}

/// Check a user's password.
pub(crate) async fn login(app: &App, username: &str, from_stdin: bool) -> Result<()> {
    let password = read_password("Password", false, from_stdin)?;
    let account = app.accounts.authenticate(username, &password).await?;
    println!(
        "{}",
        Theme::success(&format!(
            "Authenticated {} ({})",
            account.username, account.role
        ))
    );
    Ok(())
}

/// List accounts.
pub(crate) async fn list(app: &App, json: bool) -> Result<()> {
    let accounts = app.accounts.list_accounts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("{}", Theme::info("No users"));
        return Ok(());
    }

    println!("\n{}", Theme::header("Users"));
    println!(
        "{:>6}  {:<24} {:<12} {:>6}  {}",
        "ID".dimmed(),
        "USERNAME".dimmed(),
        "ROLE".dimmed(),
        "BRANCH".dimmed(),
        "UPDATED".dimmed()
    );
    println!("{}", Theme::separator());
    for account in &accounts {
        println!("{}", account_row(account));
    }
    println!();
    Ok(())
}

fn account_row(account: &Account) -> String {
    let branch = account
        .branch_id
        .map_or_else(|| "-".to_owned(), |b| b.to_string());
    format!(
        "{:>6}  {:<24} {:<12} {:>6}  {}",
        account.id,
        account.username,
        account.role.as_str(),
        branch,
        Theme::timestamp(&account.updated_at)
    )
}
