//! Access to the monthly ledger tables of the spreadsheet. Each month has its own tab named after
//! its period label, e.g. `2023年6月`, whose first row is the header.

use crate::api::Sheet;
use crate::model::{header_row, LedgerRow, Period};
use crate::Result;
use tracing::{debug, info};

/// The first row of a table that holds data. Row 1 is the header.
const FIRST_DATA_ROW: usize = 2;

/// Reads and writes ledger rows through a dynamically-dispatched `Sheet`.
pub struct Ledger {
    sheet: Box<dyn Sheet + Send>,
}

impl Ledger {
    pub fn new(sheet: Box<dyn Sheet + Send>) -> Self {
        Self { sheet }
    }

    /// Returns the name of the table for `period`, creating the table with its header first if it
    /// does not exist.
    pub async fn get_or_create(&mut self, period: &Period) -> Result<String> {
        let name = period.label();
        if !self.sheet.exists(&name).await? {
            info!("Creating the ledger table {name}");
            self.sheet.create(&name, &header_row()).await?;
        }
        Ok(name)
    }

    /// The data rows of the table for `period`, in insertion order. When `create` is false a
    /// missing table has no rows and is left missing.
    pub async fn rows(&mut self, period: &Period, create: bool) -> Result<Vec<LedgerRow>> {
        let name = if create {
            self.get_or_create(period).await?
        } else {
            let name = period.label();
            if !self.sheet.exists(&name).await? {
                debug!("The ledger table {name} does not exist");
                return Ok(Vec::new());
            }
            name
        };
        let values = self.sheet.get(&name).await?;
        Ok(values
            .iter()
            .skip(FIRST_DATA_ROW - 1)
            .map(|cells| LedgerRow::from_cells(cells))
            .collect())
    }

    /// Writes `row` one past the last row of the table for `period` and returns its row number.
    pub async fn append(&mut self, period: &Period, row: &LedgerRow) -> Result<usize> {
        let name = self.get_or_create(period).await?;
        let number = self.sheet.last_row(&name).await?.max(FIRST_DATA_ROW - 1) + 1;
        self.sheet.write_row(&name, number, &row.to_cells()).await?;
        debug!("Wrote row {number} of {name}");
        Ok(number)
    }

    /// The last data row of the table for `period` with its row number, creating the table if it
    /// does not exist. `None` when the table has no data rows.
    pub async fn last(&mut self, period: &Period) -> Result<Option<(usize, LedgerRow)>> {
        let name = self.get_or_create(period).await?;
        let number = self.sheet.last_row(&name).await?;
        if number < FIRST_DATA_ROW {
            return Ok(None);
        }
        let cells = self.sheet.get_row(&name, number).await?;
        Ok(Some((number, LedgerRow::from_cells(&cells))))
    }

    /// Removes row `number` of the table for `period`.
    pub async fn delete(&mut self, period: &Period, number: usize) -> Result<()> {
        let name = period.label();
        self.sheet.delete_row(&name, number).await?;
        debug!("Deleted row {number} of {name}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSheet;
    use crate::model::Column;

    fn ledger() -> Ledger {
        Ledger::new(Box::new(TestSheet::new(uuid::Uuid::new_v4().to_string())))
    }

    fn row(id: &str, amount: f64) -> LedgerRow {
        LedgerRow::new(id, "2023/06/05, 08:30", "2023年6月", "食料品", "パン", amount, "太郎")
    }

    #[tokio::test]
    async fn test_append_and_read() {
        let mut ledger = ledger();
        let june = Period::new(2023, 6).unwrap();
        assert!(ledger.rows(&june, false).await.unwrap().is_empty());
        assert!(ledger.last(&june).await.unwrap().is_none());

        assert_eq!(ledger.append(&june, &row("m1", 100.0)).await.unwrap(), 2);
        assert_eq!(ledger.append(&june, &row("m2", 250.5)).await.unwrap(), 3);

        let rows = ledger.rows(&june, false).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].cell(Column::Amount), "250.5");

        let (number, last) = ledger.last(&june).await.unwrap().unwrap();
        assert_eq!(number, 3);
        assert_eq!(last, row("m2", 250.5));
    }

    #[tokio::test]
    async fn test_rows_without_create() {
        let mut ledger = ledger();
        let may = Period::new(2023, 5).unwrap();
        assert!(ledger.rows(&may, false).await.unwrap().is_empty());
        assert!(!ledger.sheet.exists("2023年5月").await.unwrap());
        assert!(ledger.rows(&may, true).await.unwrap().is_empty());
        assert!(ledger.sheet.exists("2023年5月").await.unwrap());
        assert_eq!(ledger.sheet.get_row("2023年5月", 1).await.unwrap(), header_row());
    }

    #[tokio::test]
    async fn test_delete_last() {
        let mut ledger = ledger();
        let june = Period::new(2023, 6).unwrap();
        ledger.append(&june, &row("m1", 1.0)).await.unwrap();
        ledger.append(&june, &row("m2", 2.0)).await.unwrap();
        let (number, _) = ledger.last(&june).await.unwrap().unwrap();
        ledger.delete(&june, number).await.unwrap();

        let (number, last) = ledger.last(&june).await.unwrap().unwrap();
        assert_eq!(number, 2);
        assert_eq!(last.cell(Column::MessageId), "m1");
    }
}
