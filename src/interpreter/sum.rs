//! Totals by period, recorder and category for one monthly table.

use crate::api::Ledger;
use crate::interpreter::Response;
use crate::model::{aggregate, format_amount, Period, Sums};
use crate::Result;
use chrono::{DateTime, FixedOffset};
use tracing::debug;

const RULE: &str = "=====================";
const NO_DATA: &str = "該当するデータはありませんでした。";

/// Sums the table of `period`, or of the current month when `period` is `None`. A table that was
/// asked for by name but does not exist sums to nothing. The current month's table is created if
/// it is missing.
pub(super) async fn run(
    ledger: &mut Ledger,
    period: Option<Period>,
    now: &DateTime<FixedOffset>,
) -> Result<Response> {
    let rows = match period {
        Some(period) => ledger.rows(&period, false).await?,
        None => ledger.rows(&Period::of(now), true).await?,
    };
    debug!("Summing {} rows", rows.len());
    Ok(Response::ok(render(&aggregate(&rows))))
}

fn render(all: &[Sums]) -> String {
    let mut text = String::from("合計金額は下記の通りです！\n");
    for sums in all {
        text.push_str(RULE);
        text.push('\n');
        text.push_str(&format!("{}ごとの合計金額\n", sums.column().header()));
        if sums.is_empty() {
            text.push_str(NO_DATA);
            text.push('\n');
        }
        for (key, total) in sums.iter() {
            text.push_str(&format!("{key}: {}円\n", format_amount(total)));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSheet;
    use crate::model::LedgerRow;
    use chrono::TimeZone;

    fn row(category: &str, amount: &str, user: &str) -> LedgerRow {
        LedgerRow::from_cells(&[
            "id",
            "2023/06/05, 08:30",
            "2023年6月",
            category,
            "品",
            amount,
            user,
        ])
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(
            render(&aggregate(&[])),
            "合計金額は下記の通りです！\n\
            =====================\n日付ごとの合計金額\n該当するデータはありませんでした。\n\
            =====================\n記録者ごとの合計金額\n該当するデータはありませんでした。\n\
            =====================\nカテゴリごとの合計金額\n該当するデータはありませんでした。\n"
        );
    }

    #[test]
    fn test_render_totals() {
        let rows = vec![
            row("食料品", "300", "太郎"),
            row("日用品", "abc", "花子"),
            row("食料品", "0.5", "花子"),
        ];
        assert_eq!(
            render(&aggregate(&rows)),
            "合計金額は下記の通りです！\n\
            =====================\n日付ごとの合計金額\n2023年6月: NaN円\n\
            =====================\n記録者ごとの合計金額\n太郎: 300円\n花子: NaN円\n\
            =====================\nカテゴリごとの合計金額\n食料品: 300.5円\n日用品: NaN円\n"
        );
    }

    #[tokio::test]
    async fn test_named_period_is_not_created() {
        let mut ledger = Ledger::new(Box::new(TestSheet::new(uuid::Uuid::new_v4().to_string())));
        let now = crate::model::jst()
            .with_ymd_and_hms(2023, 6, 5, 8, 30, 0)
            .unwrap();
        let may = Period::new(2023, 5).unwrap();
        let response = run(&mut ledger, Some(may), &now).await.unwrap();
        assert_eq!(response.status().code(), 200);
        assert_eq!(response.message().matches(NO_DATA).count(), 3);

        ledger.append(&Period::of(&now), &row("食料品", "120", "太郎")).await.unwrap();
        let response = run(&mut ledger, None, &now).await.unwrap();
        assert!(response.message().contains("2023年6月: 120円\n"));
        assert!(ledger.rows(&may, false).await.unwrap().is_empty());
    }
}
