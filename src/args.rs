//! These structs provide the CLI interface for the ledger CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger: a LINE bot that keeps a household expense ledger in a Google sheet.
///
/// Members of a LINE chat send messages such as "コーヒー 300" to record an expense, "削除" to
/// delete the last record, "合計" or "合計 2023年6月" to see totals, and "表示名設定 太郎" to
/// choose the name their records are filed under. Each month is kept in its own tab of the sheet.
///
/// You will need a Google OAuth client for the Sheets API and the channel access token of a LINE
/// Messaging API channel whose webhook URL points at `ledger serve`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need a few things ready beforehand.
    ///
    /// - Decide what directory you want to store data in and pass this as --ledger-home. By
    ///   default, it will be $HOME/ledger.
    ///
    /// - Get the URL of the Google Sheet that will hold the monthly tables and pass it as
    ///   --sheet-url.
    ///
    /// - Create an OAuth client for a desktop application in Google Cloud Console, with
    ///   "http://localhost" as a redirect URI, download its JSON and pass it as --client-secret.
    ///
    /// - Issue a long-lived channel access token for your LINE Messaging API channel and pass it
    ///   as --channel-access-token.
    Init(InitArgs),
    /// Authenticate with Google Sheets via OAuth.
    Auth(AuthArgs),
    /// Run the webhook server that the LINE platform posts chat messages to.
    Serve(ServeArgs),
    /// Interpret one chat message against the ledger and print the answer instead of sending it.
    Exec(ExecArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the ledger configuration and secrets are held. Defaults to ~/ledger
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// (Not shown): Args for the `ledger init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to your Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    #[arg(long)]
    sheet_url: String,

    /// The path to your downloaded OAuth client credentials. This file will be moved to the
    /// default secrets location in the main data directory.
    #[arg(long)]
    client_secret: PathBuf,

    /// The channel access token of your LINE Messaging API channel.
    #[arg(long, env = "LEDGER_CHANNEL_ACCESS_TOKEN", hide_env_values = true)]
    channel_access_token: String,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        client_secret: impl Into<PathBuf>,
        channel_access_token: impl Into<String>,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            client_secret: client_secret.into(),
            channel_access_token: channel_access_token.into(),
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn client_secret(&self) -> &Path {
        &self.client_secret
    }

    pub fn channel_access_token(&self) -> &str {
        &self.channel_access_token
    }
}

/// (Not shown): Args for the `ledger auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh authentication.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// (Not shown): Args for the `ledger serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// The address to listen on for webhook calls.
    #[arg(long, env = "LEDGER_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

impl ServeArgs {
    pub fn new(listen: SocketAddr) -> Self {
        Self { listen }
    }

    pub fn listen(&self) -> SocketAddr {
        self.listen
    }
}

/// (Not shown): Args for the `ledger exec` command.
#[derive(Debug, Parser, Clone)]
pub struct ExecArgs {
    /// The LINE user id of the sender, which selects the display name.
    #[arg(long)]
    user_id: String,

    /// The message id written to the ID column of a record.
    #[arg(long, default_value = "cli")]
    message_id: String,

    /// The chat message, e.g. "コーヒー 300 飲料".
    text: String,
}

impl ExecArgs {
    pub fn new(
        user_id: impl Into<String>,
        message_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message_id: message_id.into(),
            text: text.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                ledger home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exec() {
        let args = Args::try_parse_from([
            "ledger",
            "--ledger-home",
            "/tmp/ledger",
            "exec",
            "--user-id",
            "U1",
            "コーヒー 300",
        ])
        .unwrap();
        assert_eq!(args.common().ledger_home().path(), Path::new("/tmp/ledger"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        match args.command() {
            Command::Exec(exec) => {
                assert_eq!(exec.user_id(), "U1");
                assert_eq!(exec.message_id(), "cli");
                assert_eq!(exec.text(), "コーヒー 300");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let args = Args::try_parse_from([
            "ledger",
            "--log-level",
            "debug",
            "serve",
            "--listen",
            "127.0.0.1:9000",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        match args.command() {
            Command::Serve(serve) => assert_eq!(serve.listen().port(), 9000),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
