//! Positional column map: slices columns out of a line by their nominal
//! character offsets.
//!
//! This is the deterministic fallback when pattern extraction cannot
//! place a value. Offsets count characters, not bytes.

use crate::formatter::TIERED;
use crate::patterns::DATE_RE;
use crate::types::{ColumnSpec, FieldType};
use regex::Regex;
use std::sync::LazyLock;

static POSITIONAL_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?[0-9][0-9,]*\.[0-9]{2}[-+]?$").expect("valid positional amount regex")
});

static POSITIONAL_RATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}(?:\.[0-9]+)?%?$").expect("valid positional rate regex")
});

static POSITIONAL_NA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-*\s*N\s*[./]?\s*A\.?\s*-*$").expect("valid positional n.a. regex")
});

/// Slice one column out of a line.
///
/// A line that ends inside the column yields the part that is present; a
/// line that ends before the column yields an empty string.
pub fn slice_column(line: &str, column: &ColumnSpec) -> String {
    line.chars()
        .skip(column.start)
        .take(column.end - column.start)
        .collect()
}

/// Slice every column of a layout out of a line.
pub fn extract_positional(line: &str, columns: &[ColumnSpec]) -> Vec<String> {
    columns.iter().map(|column| slice_column(line, column)).collect()
}

/// Slice one column, keeping it only if it looks like a value of the
/// column's type. Returns the trimmed slice.
pub fn backfill(line: &str, column: &ColumnSpec) -> Option<String> {
    let slice = slice_column(line, column);
    let value = slice.trim();
    if value.is_empty() || !is_plausible(value, column.field_type) {
        return None;
    }
    Some(value.to_string())
}

/// Type gate for positional slices.
pub fn is_plausible(value: &str, field_type: FieldType) -> bool {
    match field_type {
        FieldType::Number => value.chars().all(|c| c.is_ascii_digit()),
        FieldType::Date => {
            POSITIONAL_NA_RE.is_match(value)
                || DATE_RE.find(value).is_some_and(|m| m.as_str().len() == value.len())
        }
        FieldType::Currency => POSITIONAL_AMOUNT_RE.is_match(value),
        FieldType::Percentage => {
            POSITIONAL_RATE_RE.is_match(value) || value.to_uppercase().starts_with(&TIERED[..4])
        }
        FieldType::Flag => {
            value.len() == 1 && matches!(value.to_ascii_uppercase().as_str(), "Y" | "N" | "R")
        }
        FieldType::Text => value.chars().any(|c| c.is_alphabetic()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnSpec] = &[
        ColumnSpec::new("Id", 0, 4, FieldType::Number),
        ColumnSpec::new("Name", 4, 10, FieldType::Text),
        ColumnSpec::new("Amount", 10, 18, FieldType::Currency),
    ];

    #[test]
    fn test_extract_positional_short_line() {
        assert_eq!(
            extract_positional("1234JOHN  ", COLUMNS),
            vec!["1234".to_string(), "JOHN  ".to_string(), String::new()]
        );
        assert_eq!(
            extract_positional("1234JOHN    12.5", COLUMNS),
            vec!["1234".to_string(), "JOHN  ".to_string(), "  12.5".to_string()]
        );
        assert_eq!(extract_positional("", COLUMNS), vec![String::new(); 3]);
    }

    #[test]
    fn test_extract_positional_counts_chars() {
        let line = "12é4NAMÉ      1.00";
        let values = extract_positional(line, COLUMNS);
        assert_eq!(values[0], "12é4");
        assert_eq!(values[1], "NAMÉ  ");
        assert_eq!(values[2], "    1.00");
    }

    #[test]
    fn test_extract_positional_is_deterministic() {
        let line = "9999ACME CO 1,000.00-";
        assert_eq!(extract_positional(line, COLUMNS), extract_positional(line, COLUMNS));
    }

    #[test]
    fn test_backfill_rejects_noise() {
        let line = "12ABJOHN  1,000.00";
        assert_eq!(backfill(line, &COLUMNS[0]), None);
        assert_eq!(backfill(line, &COLUMNS[1]).as_deref(), Some("JOHN"));
        assert_eq!(backfill(line, &COLUMNS[2]).as_deref(), Some("1,000.00"));
    }

    #[test]
    fn test_plausibility() {
        assert!(is_plausible("--N.A--", FieldType::Date));
        assert!(is_plausible("01/01/2020", FieldType::Date));
        assert!(!is_plausible("01/01/2020 X", FieldType::Date));
        assert!(is_plausible("TIERED", FieldType::Percentage));
        assert!(is_plausible("8.75", FieldType::Percentage));
        assert!(!is_plausible("STANDARD", FieldType::Percentage));
        assert!(is_plausible("y", FieldType::Flag));
        assert!(!is_plausible("YES", FieldType::Flag));
        assert!(!is_plausible("12.50", FieldType::Text));
    }
}
