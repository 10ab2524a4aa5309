use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its subdirectories and:
/// - Creates an initial `config.json` file using `sheet_url`
/// - Moves `secret_file` into its default location in the data dir
/// - Stores `channel_access_token` in the secrets dir, readable by the owner only
///
/// # Arguments
/// - `ledger_home` - The directory that will be the root of data directory, e.g. `$HOME/ledger`
/// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed to start the Google
///   OAuth workflow.
/// - `channel_access_token` - The LINE Messaging API token used to reply and broadcast.
/// - `sheet_url` - The URL of the Google Sheet that holds the monthly tables.
///
/// # Errors
/// - Returns an error if any file operations fail or if the URL or token is unusable.
pub async fn init(
    ledger_home: &Path,
    secret_file: &Path,
    channel_access_token: &str,
    sheet_url: &str,
) -> Result<Out<()>> {
    let config = Config::create(ledger_home, secret_file, channel_access_token, sheet_url)
        .await
        .context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the ledger directory and config at {}",
        config.config_path().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("client_secret.json");
        std::fs::write(
            &secret,
            r#"{"installed": {"client_id": "id", "client_secret": "s",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"}}"#,
        )
        .unwrap();
        let home = dir.path().join("ledger");

        let out = init(
            &home,
            &secret,
            "token",
            "https://docs.google.com/spreadsheets/d/abc123/edit",
        )
        .await
        .unwrap();
        let config = Config::load(&home).await.unwrap();
        assert!(out
            .message()
            .ends_with(&config.config_path().display().to_string()));
        assert_eq!(config.spreadsheet_id(), "abc123");
        assert!(!secret.exists());
        assert_eq!(config.channel_access_token().await.unwrap(), "token");
    }

    #[tokio::test]
    async fn test_init_rejects_empty_token() {
        let dir = TempDir::new().unwrap();
        let secret = dir.path().join("client_secret.json");
        std::fs::write(&secret, "{}").unwrap();
        let result = init(
            &dir.path().join("ledger"),
            &secret,
            "  ",
            "https://docs.google.com/spreadsheets/d/abc123",
        )
        .await;
        assert!(result.is_err());
    }
}
