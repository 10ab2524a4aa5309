//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::test_sheet::{get_state, set_state, Tabs};
use crate::Config;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up a ledger home directory with a Config whose spreadsheet id is
/// unique, so each test gets its own in-memory sheet. Holds TempDir to keep the directory alive
/// for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ledger");
        let secret_path = temp_dir.path().join("client_secret.json");

        let secret_content = r#"{
            "installed": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;
        std::fs::write(&secret_path, secret_content).unwrap();

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{rand}/edit");
        let config = Config::create(&root, &secret_path, "test-channel-token", &sheet_url)
            .await
            .unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Gets the tabs of the in-memory sheet associated with this environment.
    pub fn get_state(&self) -> Tabs {
        get_state(self.config.spreadsheet_id())
    }

    /// Sets the tabs of the in-memory sheet associated with this environment.
    pub fn set_state(&self, tabs: Tabs) {
        set_state(self.config.spreadsheet_id(), tabs)
    }
}
