use crate::model::amount::format_amount;
use crate::model::schema::{Column, SCHEMA};
use serde::{Deserialize, Serialize};

/// One data row of a monthly ledger table. Every field holds the cell text exactly as it is
/// written to or read from the sheet.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerRow {
    pub(crate) message_id: String,
    pub(crate) input_day: String,
    pub(crate) year_month: String,
    pub(crate) category: String,
    pub(crate) item: String,
    pub(crate) amount: String,
    pub(crate) user_name: String,
}

impl LedgerRow {
    /// Builds the row written by a record command.
    pub fn new(
        message_id: impl Into<String>,
        input_day: impl Into<String>,
        year_month: impl Into<String>,
        category: impl Into<String>,
        item: impl Into<String>,
        amount: f64,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            input_day: input_day.into(),
            year_month: year_month.into(),
            category: category.into(),
            item: item.into(),
            amount: format_amount(amount),
            user_name: user_name.into(),
        }
    }

    /// Reads a row from sheet cells. Missing trailing cells are empty and cells beyond the schema
    /// are ignored.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Self {
        let mut row = Self::default();
        for spec in SCHEMA.iter() {
            if let Some(value) = cells.get(spec.column.position()) {
                *row.cell_mut(spec.column) = value.as_ref().to_string();
            }
        }
        row
    }

    /// The cells of this row in sheet order.
    pub fn to_cells(&self) -> Vec<String> {
        SCHEMA
            .iter()
            .map(|spec| self.cell(spec.column).to_string())
            .collect()
    }

    pub fn cell(&self, column: Column) -> &str {
        match column {
            Column::MessageId => &self.message_id,
            Column::InputDay => &self.input_day,
            Column::YearMonth => &self.year_month,
            Column::Category => &self.category,
            Column::Item => &self.item,
            Column::Amount => &self.amount,
            Column::UserName => &self.user_name,
        }
    }

    fn cell_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::MessageId => &mut self.message_id,
            Column::InputDay => &mut self.input_day,
            Column::YearMonth => &mut self.year_month,
            Column::Category => &mut self.category,
            Column::Item => &mut self.item,
            Column::Amount => &mut self.amount,
            Column::UserName => &mut self.user_name,
        }
    }
}

impl From<LedgerRow> for Vec<String> {
    fn from(row: LedgerRow) -> Self {
        row.to_cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schema::WIDTH;

    #[test]
    fn test_cells_follow_schema() {
        let row = LedgerRow::new("m1", "2023/06/05, 08:30", "2023年6月", "食料品", "パン", 150.0, "太郎");
        let cells = row.to_cells();
        assert_eq!(cells.len(), WIDTH);
        for spec in SCHEMA.iter() {
            assert_eq!(cells[spec.number - 1], row.cell(spec.column));
        }
        assert_eq!(cells[Column::Amount.position()], "150");
        assert_eq!(LedgerRow::from_cells(&cells), row);
    }

    #[test]
    fn test_from_short_row() {
        let row = LedgerRow::from_cells(&["m1", "2023/06/05, 08:30"]);
        assert_eq!(row.cell(Column::InputDay), "2023/06/05, 08:30");
        assert_eq!(row.cell(Column::UserName), "");
    }

    #[test]
    fn test_from_long_row() {
        let cells = ["1", "2", "3", "4", "5", "6", "7", "extra"];
        let row = LedgerRow::from_cells(&cells);
        assert_eq!(row.to_cells().len(), WIDTH);
        assert_eq!(row.cell(Column::UserName), "7");
    }
}
