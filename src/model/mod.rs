//! Types that represent the ledger data model, such as `LedgerRow`, `Period` and `Sums`, and the
//! parsing of chat text into those types.
mod amount;
mod period;
mod row;
mod schema;
mod sums;
mod tokens;
mod webhook;

pub use amount::{coerce_amount, format_amount, parse_amount};
pub use period::{format_timestamp, jst, now, reformat_timestamp, Period};
pub use row::LedgerRow;
pub use schema::{header_row, Column, ColumnSpec, SCHEMA, WIDTH};
pub use sums::{aggregate, Sums, DIMENSIONS};
pub use tokens::Tokens;
pub use webhook::{Event, WebhookPayload};
