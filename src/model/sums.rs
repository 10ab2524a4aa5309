//! Grouped totals over the rows of a ledger table.

use crate::model::amount::coerce_amount;
use crate::model::period::Period;
use crate::model::row::LedgerRow;
use crate::model::schema::Column;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The columns that totals are grouped by, in the order they are reported.
pub const DIMENSIONS: [Column; 3] = [Column::YearMonth, Column::UserName, Column::Category];

/// Totals keyed by the value of one column, iterated in the order keys were first seen.
///
/// A NaN amount poisons its key: once a NaN has been added, the total for that key stays NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sums {
    column: Column,
    totals: IndexMap<String, f64>,
}

impl Sums {
    pub fn new(column: Column) -> Self {
        Self {
            column,
            totals: IndexMap::new(),
        }
    }

    /// The column these totals are grouped by.
    pub fn column(&self) -> Column {
        self.column
    }

    pub fn add(&mut self, key: impl Into<String>, amount: f64) {
        *self.totals.entry(key.into()).or_insert(0.0) += amount;
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.totals.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(key, total)| (key.as_str(), *total))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Computes one `Sums` for each of the `DIMENSIONS`, in that order.
///
/// The period of a row is read from the row's own date cell rather than from the table it lives
/// in, so a table may contribute to more than one period.
pub fn aggregate(rows: &[LedgerRow]) -> Vec<Sums> {
    let amounts: Vec<f64> = rows
        .iter()
        .map(|row| {
            let amount = coerce_amount(row.cell(Column::Amount));
            if amount.is_nan() {
                warn!(
                    "Amount '{}' of message {} is not a number, its totals will be NaN",
                    row.cell(Column::Amount),
                    row.cell(Column::MessageId)
                );
            }
            amount
        })
        .collect();

    DIMENSIONS
        .iter()
        .map(|&column| {
            let mut sums = Sums::new(column);
            for (row, amount) in rows.iter().zip(amounts.iter()) {
                sums.add(group_key(row, column), *amount);
            }
            sums
        })
        .collect()
}

fn group_key(row: &LedgerRow, column: Column) -> String {
    let cell = row.cell(column);
    match column {
        Column::YearMonth => Period::from_cell(cell)
            .map(|period| period.label())
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}
