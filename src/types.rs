//! Common types shared by every report parser.

use crate::error::Error;
use crate::reports::gl_balance::LedgerTotals;
use crate::reports::sdv_lockers::LockerAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Value type of a report column.
///
/// Drives both normalization in the formatter and which extraction
/// steps may fill a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Digit-run identifiers (customer, account, GL codes).
    Number,
    /// Free text such as names and descriptions.
    Text,
    /// `DD/MM/YYYY` or `DD-MM-YYYY` dates, or the not-applicable sentinel.
    Date,
    /// Fixed-point amounts, possibly signed with a trailing marker.
    Currency,
    /// Interest rates.
    Percentage,
    /// Single-letter `Y`/`N`/`R` indicators.
    Flag,
}

impl FieldType {
    /// Lowercase name used in configuration and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
            FieldType::Flag => "flag",
        }
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "number" => Ok(FieldType::Number),
            "text" => Ok(FieldType::Text),
            "date" => Ok(FieldType::Date),
            "currency" | "amount" => Ok(FieldType::Currency),
            "percentage" | "percent" | "rate" => Ok(FieldType::Percentage),
            "flag" => Ok(FieldType::Flag),
            _ => Err(Error::InvalidFieldType(s.to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named column of a report layout.
///
/// `start..end` is the nominal character range (0-based, end-exclusive)
/// used by the positional fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Header name, also the key used by downstream consumers.
    pub name: &'static str,
    /// First character offset of the column.
    pub start: usize,
    /// Offset one past the last character of the column.
    pub end: usize,
    /// Value type of the column.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl ColumnSpec {
    /// Define a column. Usable in `const` layout tables.
    pub const fn new(name: &'static str, start: usize, end: usize, field_type: FieldType) -> Self {
        assert!(start <= end, "column start must not exceed end");
        Self {
            name,
            start,
            end,
            field_type,
        }
    }
}

/// Header-block facts of a report (report id, run date, branch, ...).
///
/// Keys that were not found are absent, never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportMetadata(BTreeMap<String, String>);

impl ReportMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value unless it is blank or the key is already set.
    ///
    /// Returns `true` when the value was stored.
    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.0.contains_key(key) {
            return false;
        }
        self.0.insert(key.to_string(), value.to_string());
        true
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of recorded keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One extracted row: one value per column, in column order.
pub type ParsedRow = Vec<String>;

/// A line range `start..end` (end-exclusive) holding report data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Index of the first data line.
    pub start: usize,
    /// Index one past the last data line.
    pub end: usize,
}

/// A line that looked like data but lacked a required identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// 1-based line number in the document.
    pub line_number: usize,
    /// Why the row was dropped.
    pub reason: String,
    /// The raw line.
    pub text: String,
}

/// Report-specific summary attached to a parse result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportInfo {
    /// Locker register analysis.
    Lockers(LockerAnalysis),
    /// General ledger totals.
    Ledger(LedgerTotals),
}

/// Tabular output of a report parser.
///
/// Every row has exactly `headers.len()` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    /// Column names in declaration order.
    pub headers: Vec<String>,
    /// Extracted rows.
    pub data: Vec<ParsedRow>,
    /// Header-block facts.
    pub metadata: ReportMetadata,
    /// Optional report-specific summary.
    #[serde(rename = "reportInfo", skip_serializing_if = "Option::is_none")]
    pub report_info: Option<ReportInfo>,
    /// Lines dropped for missing identifiers (only when collection is enabled).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedLine>,
}

impl ParseResult {
    /// Create a result with headers and nothing else.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            data: Vec::new(),
            metadata: ReportMetadata::new(),
            report_info: None,
            rejected: Vec::new(),
        }
    }

    /// Whether no rows were found ("no records" rather than an error).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Position of a column by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of one column across all rows.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let index = self.column_index(name)?;
        Some(self.data.iter().map(move |row| row.get(index).map_or("", String::as_str)))
    }
}
