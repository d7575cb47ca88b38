//! Password input from a terminal prompt or standard input.

use std::io::BufRead;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Password, theme::ColorfulTheme};
use zeroize::Zeroizing;

/// Read a password.
///
/// With `from_stdin`, one line is read and only its line ending is removed.
/// Otherwise the user is prompted without echo, twice when `confirm` is set.
pub(crate) fn read_password(prompt: &str, confirm: bool, from_stdin: bool) -> Result<Zeroizing<String>> {
    if from_stdin {
        let mut line = Zeroizing::new(String::new());
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read password from stdin")?;
        let len = strip_line_ending(&line).len();
        line.truncate(len);
        return Ok(line);
    }

    let theme = ColorfulTheme::default();
    let mut input = Password::with_theme(&theme).with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Repeat password", "Passwords do not match");
    }
    let password = input.interact().context("failed to read password")?;
    Ok(Zeroizing::new(password))
}

/// Ask a yes/no question, defaulting to no.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(question)
        .default(false)
        .interact()
        .context("failed to read confirmation")
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map_or(line, |s| s.strip_suffix('\r').unwrap_or(s))
}
