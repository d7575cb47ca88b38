//! `hash-password` and `verify-password`.

use anyhow::Result;

use crate::prompt::read_password;
use crate::theme::Theme;

/// Hash a password and print the storable credential.
pub(crate) async fn hash_password(from_stdin: bool) -> Result<()> {
    let password = read_password("Password", true, from_stdin)?;
    let blob = tokio::task::spawn_blocking(move || docket_crypto::hash_password(&password)).await??;
    println!("{blob}");
    Ok(())
}

/// Check a password against a stored credential. Returns whether it matched.
pub(crate) async fn verify_password(stored: String, from_stdin: bool) -> Result<bool> {
    let password = read_password("Password", false, from_stdin)?;
    let matched =
        tokio::task::spawn_blocking(move || docket_crypto::verify_password(&password, &stored))
            .await?;

    if matched {
        println!("{}", Theme::success("Password matches"));
    } else {
        println!("{}", Theme::error("Password does not match"));
    }
    Ok(matched)
}
