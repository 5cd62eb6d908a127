//! Cell value coercion
//!
//! Permissive parsing for the formats real exports contain. Cells that do
//! not coerce make their row a skip, never a hard failure.

use crate::workbook::Cell;
use chrono::{Duration, NaiveDate};

/// Date formats tried in order for textual date cells
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%y",
];

/// Datetime formats tried when the plain date formats fail
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Truthy spellings accepted for availability-style cells
const TRUTHY: &[&str] = &["waar", "true", "ja", "yes", "1"];

/// Falsy spellings accepted for availability-style cells
const FALSY: &[&str] = &["onwaar", "false", "nee", "no", "0"];

/// Parse a cell as a calendar date
///
/// Numeric cells are treated as Excel serial day numbers (days since
/// 1899-12-30) when they fall in a plausible range, which is how xlsx
/// readers commonly surface date columns.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            for format in DATE_FORMATS {
                if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                    return Some(date);
                }
            }
            for format in DATETIME_FORMATS {
                if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text, format) {
                    return Some(dt.date());
                }
            }
            None
        }
        Cell::Number(serial) => {
            // Plausible serial range: 1950-01-01 (18264) .. 2050-01-01 (54789)
            let serial = *serial;
            if !(18_264.0..=54_789.0).contains(&serial) {
                return None;
            }
            let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
            epoch.checked_add_signed(Duration::days(serial as i64))
        }
        Cell::Bool(_) | Cell::Empty => None,
    }
}

/// Parse a cell as a quantity
///
/// Booleans and truthy/falsy availability spellings coerce to 1/0, which
/// recovers stock sheets that only export a deliverability flag.
pub fn parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(value) => value.is_finite().then_some(*value),
        Cell::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Cell::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            if let Ok(value) = text.parse::<f64>() {
                return value.is_finite().then_some(value);
            }
            let lowered = text.to_lowercase();
            if TRUTHY.contains(&lowered.as_str()) {
                return Some(1.0);
            }
            if FALSY.contains(&lowered.as_str()) {
                return Some(0.0);
            }
            None
        }
        Cell::Empty => None,
    }
}

/// Normalize a product identifier so different sheets match
///
/// Numeric ids round-trip without a float suffix (`1234.0` becomes
/// `"1234"`), text ids are trimmed, and anything empty or boolean yields
/// `""` so the row gets skipped.
pub fn normalize_product(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) => {
            if value.fract() == 0.0 && value.is_finite() {
                format!("{}", *value as i64)
            } else {
                format!("{value}")
            }
        }
        Cell::Text(text) => {
            let s = text.trim();
            match s.strip_suffix(".0") {
                Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                    digits.to_string()
                }
                _ => s.to_string(),
            }
        }
        Cell::Bool(_) | Cell::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        for text in ["2024-03-04", "04-03-2024", "04/03/2024", "2024/03/04"] {
            assert_eq!(parse_date(&Cell::text(text)), Some(expected), "{text}");
        }
        assert_eq!(
            parse_date(&Cell::text("2024-03-04 13:30:00")),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_date_excel_serial() {
        // 2024-03-04 is serial 45355 from the 1899-12-30 epoch.
        assert_eq!(
            parse_date(&Cell::number(45_355.0)),
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
        // Ordinary quantities are not dates.
        assert_eq!(parse_date(&Cell::number(12.0)), None);
    }

    #[test]
    fn test_parse_date_garbage() {
        assert_eq!(parse_date(&Cell::text("next tuesday")), None);
        assert_eq!(parse_date(&Cell::Empty), None);
        assert_eq!(parse_date(&Cell::Bool(true)), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&Cell::number(4.5)), Some(4.5));
        assert_eq!(parse_number(&Cell::text(" 12 ")), Some(12.0));
        assert_eq!(parse_number(&Cell::text("abc")), None);
        assert_eq!(parse_number(&Cell::Empty), None);
    }

    #[test]
    fn test_parse_number_availability_spellings() {
        assert_eq!(parse_number(&Cell::Bool(true)), Some(1.0));
        assert_eq!(parse_number(&Cell::text("WAAR")), Some(1.0));
        assert_eq!(parse_number(&Cell::text("ja")), Some(1.0));
        assert_eq!(parse_number(&Cell::text("nee")), Some(0.0));
        assert_eq!(parse_number(&Cell::text("false")), Some(0.0));
    }

    #[test]
    fn test_normalize_product() {
        assert_eq!(normalize_product(&Cell::number(1234.0)), "1234");
        assert_eq!(normalize_product(&Cell::text(" 1234 ")), "1234");
        assert_eq!(normalize_product(&Cell::text("1234.0")), "1234");
        assert_eq!(normalize_product(&Cell::text("P-1")), "P-1");
        assert_eq!(normalize_product(&Cell::Bool(true)), "");
        assert_eq!(normalize_product(&Cell::Empty), "");
    }
}
