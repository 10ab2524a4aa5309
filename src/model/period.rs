//! Calendar months and the timestamps written into the ledger.
//!
//! All dates are interpreted in Japan Standard Time. Japan does not observe daylight saving, so a
//! fixed UTC+9 offset is exact.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

const JST_OFFSET_SECONDS: i32 = 9 * 3600;

/// The pattern used for the input-timestamp column, e.g. `2023/06/05, 08:30`.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d, %H:%M";

/// Japan Standard Time.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECONDS).unwrap_or(Utc.fix())
}

/// The current time in Japan Standard Time.
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&jst())
}

/// Formats `time` with the input-timestamp pattern, e.g. `2023/06/05, 08:30`.
pub fn format_timestamp(time: &DateTime<FixedOffset>) -> String {
    time.with_timezone(&jst()).format(TIMESTAMP_FORMAT).to_string()
}

/// Renders a stored timestamp cell in the input-timestamp pattern. Cells that are not recognized
/// as a date and time are returned unchanged.
pub fn reformat_timestamp(cell: &str) -> String {
    let cell = cell.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT) {
        return naive.format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(cell) {
        return format_timestamp(&time);
    }
    cell.to_string()
}

/// A calendar month. Its label, e.g. `2023年6月`, names the monthly ledger table and is the
/// grouping key of the period dimension when summing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses the period argument of a sum by searching it for `2023年6月` or `6月`, so text
    /// around the period such as `6月分` is ignored. The month-only form takes its year from
    /// `today`. The full form is tried first. Returns `None` when neither is found or the month is
    /// outside `1..=12`.
    pub fn parse<D: Datelike>(text: &str, today: &D) -> Option<Self> {
        if let Some(caps) = YEAR_MONTH_PATTERN.captures(text) {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            return Self::new(year, month);
        }
        if let Some(caps) = MONTH_PATTERN.captures(text) {
            let month = caps[1].parse().ok()?;
            return Self::new(today.year(), month);
        }
        None
    }

    /// Reads the month back out of a stored date cell. Besides a label like `2023年6月`, the
    /// spreadsheet may hand back the cell as a date, so a few date renderings are accepted.
    pub fn from_cell(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        if let Some(caps) = YEAR_MONTH_PATTERN.captures(cell) {
            return Self::new(caps[1].parse().ok()?, caps[2].parse().ok()?);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT) {
            return Some(Self::of(&naive));
        }
        for format in ["%Y/%m/%d", "%Y-%m-%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
                return Some(Self::of(&date));
            }
        }
        DateTime::parse_from_rfc3339(cell)
            .ok()
            .map(|time| Self::of(&time.with_timezone(&jst())))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The canonical name of this month, e.g. `2023年6月`. The month is not zero-padded.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}年{}月", self.year, self.month)
    }
}

static YEAR_MONTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,4})年([0-9]{1,2})月").expect("Invalid regex pattern")
});

static MONTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2})月").expect("Invalid regex pattern"));

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_year_and_month() {
        let today = date(2025, 1, 15);
        assert_eq!(Period::parse("2023年6月", &today), Period::new(2023, 6));
        assert_eq!(Period::parse("2023年12月", &today), Period::new(2023, 12));
        assert_eq!(Period::parse("99年1月", &today), Period::new(99, 1));
    }

    #[test]
    fn test_parse_month_uses_current_year() {
        let today = date(2025, 1, 15);
        assert_eq!(Period::parse("6月", &today), Period::new(2025, 6));
        assert_eq!(Period::parse("06月", &today), Period::new(2025, 6));
    }

    #[test]
    fn test_parse_rejects() {
        let today = date(2025, 1, 15);
        assert_eq!(Period::parse("", &today), None);
        assert_eq!(Period::parse("13月", &today), None);
        assert_eq!(Period::parse("0月", &today), None);
        assert_eq!(Period::parse("2023年13月", &today), None);
        assert_eq!(Period::parse("6", &today), None);
        assert_eq!(Period::parse("六月", &today), None);
        assert_eq!(Period::parse("６月", &today), None);
        assert_eq!(Period::parse("先月", &today), None);
    }

    #[test]
    fn test_parse_finds_period_inside_text() {
        let today = date(2023, 6, 5);
        assert_eq!(Period::parse("6月分", &today), Period::new(2023, 6));
        assert_eq!(Period::parse("2023年6月分", &today), Period::new(2023, 6));
        assert_eq!(Period::parse("今月6月", &today), Period::new(2023, 6));
        assert_eq!(Period::parse("去年2022年12月まで", &today), Period::new(2022, 12));
        assert_eq!(Period::parse("第13月", &today), None);
    }

    #[test]
    fn test_label() {
        assert_eq!(Period::new(2023, 6).unwrap().label(), "2023年6月");
        assert_eq!(Period::new(2023, 11).unwrap().label(), "2023年11月");
    }

    #[test]
    fn test_same_month_same_label() {
        let first = Period::of(&date(2024, 2, 1));
        let last = Period::of(&date(2024, 2, 29));
        assert_eq!(first.label(), last.label());
        assert_ne!(first.label(), Period::of(&date(2024, 3, 1)).label());
        assert_ne!(first.label(), Period::of(&date(2023, 2, 1)).label());
    }

    #[test]
    fn test_label_uses_japan_time() {
        // 2023-06-30 16:00 UTC is already July 1st in Japan.
        let utc = Utc.with_ymd_and_hms(2023, 6, 30, 16, 0, 0).unwrap();
        let period = Period::of(&utc.with_timezone(&jst()));
        assert_eq!(period.label(), "2023年7月");
    }

    #[test]
    fn test_from_cell() {
        let june = Period::new(2023, 6);
        assert_eq!(Period::from_cell("2023年6月"), june);
        assert_eq!(Period::from_cell("2023/06/01"), june);
        assert_eq!(Period::from_cell("2023-06-01"), june);
        assert_eq!(Period::from_cell("2023/06/05, 08:30"), june);
        assert_eq!(Period::from_cell("2023-05-31T20:00:00Z"), june);
        assert_eq!(Period::from_cell("garbage"), None);
    }

    #[test]
    fn test_format_timestamp() {
        let utc = Utc.with_ymd_and_hms(2023, 6, 4, 23, 30, 0).unwrap();
        assert_eq!(format_timestamp(&utc.with_timezone(&jst())), "2023/06/05, 08:30");
    }

    #[test]
    fn test_reformat_timestamp() {
        assert_eq!(reformat_timestamp("2023/06/05, 08:30"), "2023/06/05, 08:30");
        assert_eq!(reformat_timestamp("2023-06-04T23:30:00Z"), "2023/06/05, 08:30");
        assert_eq!(reformat_timestamp("yesterday"), "yesterday");
    }
}
