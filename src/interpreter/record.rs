use crate::api::Ledger;
use crate::interpreter::{summary, Response};
use crate::model::{Column, LedgerRow, Period};
use crate::Result;
use chrono::{DateTime, FixedOffset};
use tracing::info;

/// Appends `row` to the table of the current month and announces it.
pub(super) async fn run(
    ledger: &mut Ledger,
    row: &LedgerRow,
    now: &DateTime<FixedOffset>,
) -> Result<Response> {
    let period = Period::of(now);
    let number = ledger.append(&period, row).await?;
    info!(
        "Recorded message {} as row {number} of {period}",
        row.cell(Column::MessageId)
    );
    Ok(Response::created(format!(
        "{}さんが下記内容で記録しました！\n{}",
        row.cell(Column::UserName),
        summary(row, row.cell(Column::InputDay))
    )))
}
