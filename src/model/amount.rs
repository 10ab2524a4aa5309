//! Numbers typed by users and numbers read back from ledger cells.
//!
//! The two directions differ. A new record must carry a well-formed finite
//! number. A stored cell is coerced leniently: its longest numeric prefix is used (`300円` is 300)
//! and a cell with no numeric prefix becomes NaN, which then contaminates any sum it is added to.

/// Parses the amount argument of a record. The whole string must be a finite decimal number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerces a stored amount cell to a number using its longest numeric prefix. Leading whitespace
/// is skipped. Returns NaN when the cell does not start with a number.
pub fn coerce_amount(cell: &str) -> f64 {
    let s = cell.trim_start();
    let body = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    if body.starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Renders a number the way it is written to the sheet and shown in replies: integers without a
/// fractional part, `NaN` for not-a-number, `Infinity` for overflowed totals, and exponent form
/// such as `1e+21` or `1.5e-7` outside `[1e-6, 1e21)`.
pub fn format_amount(value: f64) -> String {
    if value == 0.0 {
        // Avoids "-0".
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude >= EXPONENT_ABOVE || magnitude < EXPONENT_BELOW {
        let text = format!("{value:e}");
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        };
    }
    value.to_string()
}

const EXPONENT_ABOVE: f64 = 1e21;
const EXPONENT_BELOW: f64 = 1e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("300"), Some(300.0));
        assert_eq!(parse_amount("12.5"), Some(12.5));
        assert_eq!(parse_amount("-40"), Some(-40.0));
        assert_eq!(parse_amount("1e3"), Some(1000.0));
    }

    #[test]
    fn test_parse_amount_rejects() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("300円"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("Infinity"), None);
        assert_eq!(parse_amount("1e999"), None);
        assert_eq!(parse_amount("３００"), None);
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount("300"), 300.0);
        assert_eq!(coerce_amount("  12.5"), 12.5);
        assert_eq!(coerce_amount("300円"), 300.0);
        assert_eq!(coerce_amount("-7.25abc"), -7.25);
        assert_eq!(coerce_amount(".5"), 0.5);
        assert_eq!(coerce_amount("5."), 5.0);
        assert_eq!(coerce_amount("2e2x"), 200.0);
        assert_eq!(coerce_amount("2e"), 2.0);
        assert_eq!(coerce_amount("1,000"), 1.0);
        assert_eq!(coerce_amount("Infinity"), f64::INFINITY);
        assert_eq!(coerce_amount("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_coerce_amount_nan() {
        assert!(coerce_amount("abc").is_nan());
        assert!(coerce_amount("").is_nan());
        assert!(coerce_amount(".").is_nan());
        assert!(coerce_amount("-").is_nan());
        assert!(coerce_amount("¥300").is_nan());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(300.0), "300");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(-0.0), "0");
        assert_eq!(format_amount(f64::NAN), "NaN");
        assert_eq!(format_amount(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_format_amount_exponent() {
        assert_eq!(format_amount(1e21), "1e+21");
        assert_eq!(format_amount(-2.5e22), "-2.5e+22");
        assert_eq!(format_amount(1e20), "100000000000000000000");
        assert_eq!(format_amount(1e-7), "1e-7");
        assert_eq!(format_amount(1.5e-7), "1.5e-7");
        assert_eq!(format_amount(0.000001), "0.000001");
    }
}
