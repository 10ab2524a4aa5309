//! The fixed layout of a monthly ledger table. Writing a record, reading back the deleted row, and
//! labelling the sum blocks all go through this one descriptor.

use serde::{Deserialize, Serialize};

/// The columns of a ledger table, in sheet order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    MessageId = 0,
    InputDay = 1,
    YearMonth = 2,
    Category = 3,
    Item = 4,
    Amount = 5,
    UserName = 6,
}

serde_plain::derive_display_from_serialize!(Column);
serde_plain::derive_fromstr_from_deserialize!(Column);

/// One entry of the schema descriptor.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ColumnSpec {
    /// 1-based column number in the sheet.
    pub number: usize,
    pub column: Column,
    /// The header cell text, also used to label fields in chat replies.
    pub header: &'static str,
}

/// The ledger table layout. Entry `i` describes column number `i + 1`.
pub const SCHEMA: [ColumnSpec; 7] = [
    ColumnSpec {
        number: 1,
        column: Column::MessageId,
        header: "ID",
    },
    ColumnSpec {
        number: 2,
        column: Column::InputDay,
        header: "入力日時",
    },
    ColumnSpec {
        number: 3,
        column: Column::YearMonth,
        header: "日付",
    },
    ColumnSpec {
        number: 4,
        column: Column::Category,
        header: "カテゴリ",
    },
    ColumnSpec {
        number: 5,
        column: Column::Item,
        header: "品目",
    },
    ColumnSpec {
        number: 6,
        column: Column::Amount,
        header: "価格",
    },
    ColumnSpec {
        number: 7,
        column: Column::UserName,
        header: "記録者",
    },
];

/// The number of columns in a ledger table.
pub const WIDTH: usize = SCHEMA.len();

impl Column {
    pub fn spec(self) -> &'static ColumnSpec {
        &SCHEMA[self as usize]
    }

    /// 0-based position within a row.
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn header(self) -> &'static str {
        self.spec().header
    }

    /// The sheet column letter, e.g. `A` for the message id.
    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

/// The header row written into a new ledger table.
pub fn header_row() -> Vec<String> {
    SCHEMA.iter().map(|spec| spec.header.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_in_lock_step() {
        for (ix, spec) in SCHEMA.iter().enumerate() {
            assert_eq!(spec.column.position(), ix);
            assert_eq!(spec.number, ix + 1);
            assert_eq!(spec.column.spec(), spec);
        }
    }

    #[test]
    fn test_header_row() {
        assert_eq!(
            header_row(),
            vec!["ID", "入力日時", "日付", "カテゴリ", "品目", "価格", "記録者"]
        );
    }

    #[test]
    fn test_letters() {
        assert_eq!(Column::MessageId.letter(), 'A');
        assert_eq!(Column::UserName.letter(), 'G');
    }

    #[test]
    fn test_display_from_str() {
        assert_eq!(Column::UserName.to_string(), "user_name");
        assert_eq!("year_month".parse::<Column>().unwrap(), Column::YearMonth);
    }
}
