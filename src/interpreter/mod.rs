//! The command interpreter: turns the text of one chat message into a ledger operation, runs it,
//! and describes the outcome as a `Response`.
//!
//! The first word of a message selects the command:
//!
//! | first word   | command                                         |
//! |--------------|-------------------------------------------------|
//! | `表示名設定` | set the sender's display name                   |
//! | `合計`       | totals for the current or a given month         |
//! | `削除`       | delete the last record of the current month     |
//! | anything else| record an expense: `品目 金額 [カテゴリ]`       |
//!
//! Problems with what the user typed become a `BadRequest` response rather than an error. Errors
//! are reserved for the collaborators (the sheet and the display-name store).

mod delete;
mod record;
mod set_name;
mod sum;

use crate::api::{Ledger, UserNames};
use crate::error::Invalid;
use crate::model::{parse_amount, Column, Event, LedgerRow, Period, Tokens};
use crate::Result;
use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SET_NAME: &str = "表示名設定";
const SUM: &str = "合計";
const DELETE: &str = "削除";

/// The category of a record that does not name one.
pub const DEFAULT_CATEGORY: &str = "食料品";

/// The outcome of a command. The status decides how the message is delivered.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The command succeeded and only the sender needs to know.
    Ok,
    /// The command changed the ledger and everybody is told.
    Created,
    /// The message did not have the shape its command requires.
    BadRequest,
    /// There was nothing to do.
    NotFound,
}

serde_plain::derive_display_from_serialize!(Status);
serde_plain::derive_fromstr_from_deserialize!(Status);

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::BadRequest => 400,
            Status::NotFound => 404,
        }
    }

    pub fn channel(self) -> Channel {
        match self {
            Status::Created => Channel::Broadcast,
            _ => Channel::Reply,
        }
    }
}

/// How a response reaches the chat.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Sent to every friend of the bot.
    Broadcast,
    /// Sent only to the sender, using the reply token of the message.
    Reply,
}

/// The status and text produced by a command.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Response {
    status: Status,
    message: String,
}

impl Response {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Status::Ok, message)
    }

    pub fn created(message: impl Into<String>) -> Self {
        Self::new(Status::Created, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn channel(&self) -> Channel {
        self.status.channel()
    }
}

impl From<Invalid> for Response {
    fn from(invalid: Invalid) -> Self {
        Self::new(Status::BadRequest, invalid.to_string())
    }
}

/// A validated chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetName { name: String },
    /// `None` means the current month.
    Sum { period: Option<Period> },
    Delete,
    Record {
        item: String,
        amount: f64,
        category: String,
    },
}

impl Command {
    /// Selects and validates the command of a tokenized message. `today` supplies the year of a
    /// month-only period such as `6月`.
    pub fn parse<D: Datelike>(tokens: &Tokens, today: &D) -> std::result::Result<Self, Invalid> {
        match tokens.first() {
            SET_NAME => {
                if tokens.second().is_empty() {
                    return Err(Invalid::UserName);
                }
                Ok(Command::SetName {
                    name: tokens.second().to_string(),
                })
            }
            SUM => {
                if tokens.second().is_empty() {
                    return Ok(Command::Sum { period: None });
                }
                let period = Period::parse(tokens.second(), today).ok_or(Invalid::Sum)?;
                Ok(Command::Sum {
                    period: Some(period),
                })
            }
            DELETE => Ok(Command::Delete),
            item => {
                if item.is_empty() {
                    return Err(Invalid::Record);
                }
                let amount = parse_amount(tokens.second()).ok_or(Invalid::Record)?;
                let category = match tokens.third() {
                    "" => DEFAULT_CATEGORY,
                    category => category,
                };
                Ok(Command::Record {
                    item: item.to_string(),
                    amount,
                    category: category.to_string(),
                })
            }
        }
    }
}

/// Runs the message carried by `event` against the ledger at time `now`.
///
/// # Errors
/// Only failures of the sheet or of the display-name store are errors. Everything the user can
/// get wrong is reported in the returned `Response`.
pub async fn dispatch(
    event: &Event,
    ledger: &mut Ledger,
    users: &mut UserNames,
    now: &DateTime<FixedOffset>,
) -> Result<Response> {
    let tokens = Tokens::new(event.text());
    let command = match Command::parse(&tokens, now) {
        Ok(command) => command,
        Err(invalid) => {
            debug!("Message {} is invalid: {invalid:?}", event.message_id());
            return Ok(invalid.into());
        }
    };
    debug!("Message {} is {command:?}", event.message_id());
    match command {
        Command::SetName { name } => set_name::run(users, event.user_id(), &name).await,
        Command::Sum { period } => sum::run(ledger, period, now).await,
        Command::Delete => delete::run(ledger, users.get(event.user_id()), now).await,
        Command::Record {
            item,
            amount,
            category,
        } => {
            let recorder = users.get(event.user_id()).to_string();
            let row = LedgerRow::new(
                event.message_id(),
                crate::model::format_timestamp(now),
                Period::of(now).label(),
                category,
                item,
                amount,
                recorder,
            );
            record::run(ledger, &row, now).await
        }
    }
}

const RULE: &str = "==============";

/// The block of labelled fields that record and delete confirmations share. `input_day` replaces
/// the stored timestamp cell.
fn summary(row: &LedgerRow, input_day: &str) -> String {
    let fields = [
        (Column::InputDay, input_day),
        (Column::Category, row.cell(Column::Category)),
        (Column::Item, row.cell(Column::Item)),
        (Column::Amount, row.cell(Column::Amount)),
        (Column::UserName, row.cell(Column::UserName)),
    ];
    let mut text = String::from(RULE);
    text.push('\n');
    for (column, value) in fields {
        text.push_str(&format!("{}:{value}\n", column.header()));
    }
    text.push_str(RULE);
    text
}
