use crate::api::Ledger;
use crate::interpreter::{summary, Response};
use crate::model::{reformat_timestamp, Column, Period};
use crate::Result;
use chrono::{DateTime, FixedOffset};
use tracing::info;

const NOTHING_TO_DELETE: &str = "削除する記録がありません。";

/// Deletes the last data row of the current month's table. `requester` is the display name of
/// the sender, which need not be the name on the deleted row.
pub(super) async fn run(
    ledger: &mut Ledger,
    requester: &str,
    now: &DateTime<FixedOffset>,
) -> Result<Response> {
    let period = Period::of(now);
    let (number, row) = match ledger.last(&period).await? {
        Some(last) => last,
        None => return Ok(Response::not_found(NOTHING_TO_DELETE)),
    };
    ledger.delete(&period, number).await?;
    info!(
        "Deleted row {number} (message {}) of {period}",
        row.cell(Column::MessageId)
    );
    let input_day = reformat_timestamp(row.cell(Column::InputDay));
    Ok(Response::created(format!(
        "{requester}さんが最後の記録を削除しました！\n{}",
        summary(&row, &input_day)
    )))
}
