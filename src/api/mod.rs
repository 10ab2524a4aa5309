//! The collaborators that the interpreter talks to: the spreadsheet holding the monthly ledger
//! tables, the LINE Messaging API, and the display-name store.
//!
//! Each collaborator is a trait so that the whole program can run top-to-bottom without Google or
//! LINE when `Mode::Testing` is selected.

mod files;
mod google_sheet;
mod ledger;
mod messenger;
mod oauth;
pub(crate) mod test_sheet;
mod users;

use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub(crate) use google_sheet::GoogleSheet;
pub use ledger::Ledger;
pub(crate) use messenger::{LineMessenger, LINE_API_URL};
pub use messenger::{Delivery, TestMessenger};
pub(crate) use oauth::TokenProvider;
pub(crate) use test_sheet::TestSheet;
pub use users::{UserNames, UNSET_NAME};

/// OAuth scopes required for Sheets API access.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// When this environment variable is set to a non-empty value the in-memory collaborators are used.
const TEST_MODE_VAR: &str = "LEDGER_IN_TEST_MODE";

/// Which implementation of the collaborators to use.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Talk to Google Sheets and the LINE Messaging API.
    #[default]
    Google,
    /// Keep the sheet in memory and record outgoing messages instead of sending them.
    Testing,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Google,
        }
    }
}

/// Row-level access to the tabs of one spreadsheet. Row numbers are 1-based and row 1 of every
/// ledger tab is its header.
#[async_trait::async_trait]
pub trait Sheet {
    /// Whether a tab named `name` exists.
    async fn exists(&mut self, name: &str) -> Result<bool>;

    /// Inserts a new tab named `name` as the first tab and writes `header` into its first row.
    async fn create(&mut self, name: &str, header: &[String]) -> Result<()>;

    /// All non-empty rows of the tab, header included.
    async fn get(&mut self, name: &str) -> Result<Vec<Vec<String>>>;

    /// The number of the last non-empty row, or 0 for an empty tab.
    async fn last_row(&mut self, name: &str) -> Result<usize>;

    async fn get_row(&mut self, name: &str, row: usize) -> Result<Vec<String>>;

    /// Overwrites the cells of row `row`, starting from column A.
    async fn write_row(&mut self, name: &str, row: usize, values: &[String]) -> Result<()>;

    /// Removes row `row`, shifting the rows below it up.
    async fn delete_row(&mut self, name: &str, row: usize) -> Result<()>;
}

/// Sends text messages to the chat.
#[async_trait::async_trait]
pub trait Messenger {
    /// Answers the sender of the message that produced `reply_token`.
    async fn reply(&mut self, reply_token: &str, text: &str) -> Result<()>;

    /// Sends `text` to every friend of the bot.
    async fn broadcast(&mut self, text: &str) -> Result<()>;
}

/// Creates the `Sheet` implementation for `mode`.
pub async fn sheet(config: &Config, mode: Mode) -> Result<Box<dyn Sheet + Send>> {
    debug!("Creating the {mode} sheet for spreadsheet {}", config.spreadsheet_id());
    let sheet: Box<dyn Sheet + Send> = match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            Box::new(GoogleSheet::new(config.spreadsheet_id(), token_provider))
        }
        Mode::Testing => Box::new(TestSheet::new(config.spreadsheet_id())),
    };
    Ok(sheet)
}

/// Creates the `Messenger` implementation for `mode`.
pub async fn messenger(config: &Config, mode: Mode) -> Result<Box<dyn Messenger + Send>> {
    let messenger: Box<dyn Messenger + Send> = match mode {
        Mode::Google => Box::new(LineMessenger::new(
            config.line_api_url(),
            config.channel_access_token().await?,
        )),
        Mode::Testing => Box::new(TestMessenger::default()),
    };
    Ok(messenger)
}
