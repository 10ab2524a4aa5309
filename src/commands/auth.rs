//! Authentication command handlers for OAuth flow.
//!
//! This module implements the CLI commands for:
//! - `ledger auth` - Initial OAuth consent flow
//! - `ledger auth --verify` - Verify and refresh authentication

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;

/// Handles the `ledger auth` command - runs the OAuth consent flow
///
/// This is the only command that opens a browser for OAuth authentication. It prints the consent
/// URL, waits for the redirect on the local callback port and saves the tokens to token.json.
///
/// # Errors
/// Returns an error if OAuth flow fails or if client_secret.json is missing
pub async fn auth(config: &Config) -> Result<Out<()>> {
    let _ = TokenProvider::initialize(config.client_secret_path(), config.token_path()).await?;
    Ok("Authentication complete, tokens saved".into())
}

/// Handles the `ledger auth --verify` command - verifies authentication
///
/// This command never opens a browser. It loads the cached tokens and refreshes them, failing
/// with a message telling the user to run `ledger auth` when they cannot be used.
///
/// # Errors
/// Returns an error if verification fails, credentials are missing, or tokens are invalid.
pub async fn auth_verify(config: &Config) -> Result<Out<()>> {
    let mut token_provider = TokenProvider::load(config.client_secret_path(), config.token_path())
        .await
        .context(
            "Unable to use the existing tokens found in the token JSON file. \n\n\
            You should run 'ledger auth' (without the --verify flag).",
        )?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")?;
    Ok("Your OAuth token is valid!".into())
}
