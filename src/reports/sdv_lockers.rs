//! Safe deposit locker register (`sdv-lockers`).
//!
//! Registers are bracketed by `BEGIN LOCKER REGISTER` / `END LOCKER
//! REGISTER`; anything between an `END` and the next `BEGIN` (pending
//! allotments, vault notes) is not part of the register.

use crate::classifier::{LineClassifier, Signal};
use crate::engine::ReportLayout;
use crate::extraction::{ExtractionChain, Pick, Step};
use crate::formatter::CurrencyStyle;
use crate::patterns::{keyword_regex, BRACKETED_CODE_RE, CURRENCY_RE, DATE_RE};
use crate::sections::SectionScanner;
use crate::types::{ColumnSpec, FieldType, ParseResult, ParsedRow, ReportInfo};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

pub const KEY: &str = "sdv-lockers";

const SIZE: usize = 3;
const ANNUAL_RENT: usize = 7;
const ARREARS: usize = 8;
const STATUS: usize = 9;

pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Customer Number", 2, 12, FieldType::Number),
    ColumnSpec::new("Account Number", 14, 26, FieldType::Number),
    ColumnSpec::new("Locker Number", 27, 35, FieldType::Text),
    ColumnSpec::new("Locker Size", 36, 44, FieldType::Text),
    ColumnSpec::new("Hirer Name", 44, 74, FieldType::Text),
    ColumnSpec::new("Allotment Date", 74, 84, FieldType::Date),
    ColumnSpec::new("Rent Due Date", 86, 96, FieldType::Date),
    ColumnSpec::new("Annual Rent", 96, 110, FieldType::Currency),
    ColumnSpec::new("Rent Arrears", 110, 124, FieldType::Currency),
    ColumnSpec::new("Status", 126, 140, FieldType::Text),
    ColumnSpec::new("Nominee Registered", 140, 144, FieldType::Flag),
    ColumnSpec::new("Joint Hirers", 144, 148, FieldType::Flag),
];

const SIZES: &[&str] = &["SMALL", "MEDIUM", "LARGE", "XLARGE"];
const STATUSES: &[&str] = &["ACTIVE", "SURRENDERED", "BREAK OPEN", "FROZEN"];

static BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^BEGIN\s+LOCKER\s+REGISTER").expect("valid register begin regex")
});
static END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^END\s+LOCKER\s+REGISTER").expect("valid register end regex"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CUSTOMER\s+NO").expect("valid locker header regex"));
static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(SIZES));
static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(STATUSES));

pub fn layout() -> ReportLayout {
    ReportLayout {
        key: KEY,
        columns: COLUMNS,
        classifier: LineClassifier::new(90, 10)
            .signal(Signal::new("locker code", &BRACKETED_CODE_RE))
            .signal(Signal::new("date", &DATE_RE))
            .signal(Signal::new("amount", &CURRENCY_RE))
            .signal(Signal::new("size", &SIZE_RE))
            .signal(Signal::new("status", &STATUS_RE))
            .threshold(3)
            .total_markers(&["VAULT TOTAL"]),
        sections: Some(SectionScanner::bracket(&BEGIN_RE, &END_RE).header(&HEADER_RE)),
        chain: ExtractionChain::new(vec![
            Step::LeadingId { column: 0, min_digits: 10 },
            Step::SecondaryId {
                column: 1,
                after: 0,
                min_digits: 10,
            },
            Step::BracketedCode { column: 2 },
            Step::Keyword {
                column: SIZE,
                words: &SIZE_RE,
                rate: None,
                pick: Pick::First,
            },
            Step::Dates,
            Step::Currency {
                forward: vec![ANNUAL_RENT, ARREARS],
                trailing: None,
            },
            Step::Keyword {
                column: STATUS,
                words: &STATUS_RE,
                rate: None,
                pick: Pick::Last,
            },
            Step::TrailingFlags,
            Step::DerivedSpan {
                column: 4,
                after: SIZE,
                before: 5,
            },
        ]),
        required: vec![0, 1],
        currency: CurrencyStyle::StripSeparators,
        summarize: Some(summarize),
    }
}

/// Summary of a locker register.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LockerAnalysis {
    pub total_lockers: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_size: BTreeMap<String, usize>,
    pub total_annual_rent: Decimal,
    pub total_arrears: Decimal,
    /// Lockers with a non-zero arrears amount.
    pub lockers_in_arrears: usize,
}

/// Row filter for [`filter_analysis`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockerFilter {
    pub status: Option<String>,
    pub size: Option<String>,
    /// `Some(true)` keeps lockers in arrears, `Some(false)` the others.
    pub in_arrears: Option<bool>,
}

impl LockerFilter {
    fn matches(&self, row: &ParsedRow) -> bool {
        let field = |index: usize| row.get(index).map_or("", String::as_str);
        self.status
            .as_deref()
            .map_or(true, |status| field(STATUS).eq_ignore_ascii_case(status))
            && self
                .size
                .as_deref()
                .map_or(true, |size| field(SIZE).eq_ignore_ascii_case(size))
            && self
                .in_arrears
                .map_or(true, |wanted| (amount(field(ARREARS)) > Decimal::ZERO) == wanted)
    }
}

/// Analyse every row of a locker register.
pub fn analyze(rows: &[ParsedRow]) -> LockerAnalysis {
    let mut analysis = LockerAnalysis::default();
    for row in rows {
        let field = |index: usize| row.get(index).map_or("", String::as_str);

        analysis.total_lockers += 1;
        if !field(STATUS).is_empty() {
            *analysis.by_status.entry(field(STATUS).to_string()).or_default() += 1;
        }
        if !field(SIZE).is_empty() {
            *analysis.by_size.entry(field(SIZE).to_string()).or_default() += 1;
        }

        analysis.total_annual_rent += amount(field(ANNUAL_RENT));
        let arrears = amount(field(ARREARS));
        analysis.total_arrears += arrears;
        if arrears > Decimal::ZERO {
            analysis.lockers_in_arrears += 1;
        }
    }
    analysis
}

/// Analyse only the rows of a parse result that match a filter.
pub fn filter_analysis(result: &ParseResult, filter: &LockerFilter) -> LockerAnalysis {
    let rows: Vec<ParsedRow> = result
        .data
        .iter()
        .filter(|row| filter.matches(row))
        .cloned()
        .collect();
    analyze(&rows)
}

fn summarize(result: &ParseResult) -> ReportInfo {
    ReportInfo::Lockers(analyze(&result.data))
}

fn amount(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::diagnostics::NullSink;
    use crate::engine::{ReportEngine, ReportParser};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const FIXTURE: &str = include_str!("../../fixtures/sdv_lockers.txt");

    fn parse() -> ParseResult {
        ReportEngine::with_sink(layout(), ParseOptions::default(), Arc::new(NullSink))
            .parse(FIXTURE)
    }

    fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_fixture_rows() {
        let result = parse();
        assert_eq!(result.data.len(), 5);
        assert_eq!(
            result.data[2],
            vec![
                "8012345680",
                "801234567892",
                "L-009",
                "LARGE",
                "VIJAY R RAO",
                "15/09/2016",
                "15/09/2023",
                "6000.00",
                "12980.00",
                "BREAK OPEN",
                "N",
                "N",
            ]
        );
        let hirers: Vec<&str> = result.column("Hirer Name").unwrap().collect();
        assert!(!hirers.contains(&"WAITLISTED HIRER"));
    }

    fn hirers(content: &str) -> Vec<String> {
        let result = ReportEngine::with_sink(layout(), ParseOptions::default(), Arc::new(NullSink))
            .parse(content);
        result.column("Hirer Name").unwrap().map(str::to_string).collect()
    }

    #[test]
    fn test_stray_end_before_register() {
        let content = format!("END LOCKER REGISTER\n{FIXTURE}");
        assert_eq!(
            hirers(&content),
            vec!["ARJUN MEHTA", "NEHA KAPOOR", "VIJAY R RAO", "ANITA DESAI", "GEETHA S"]
        );
    }

    #[test]
    fn test_missing_end_runs_to_next_begin() {
        let content = FIXTURE.replacen("END LOCKER REGISTER\n", "", 1);
        assert_eq!(
            hirers(&content),
            vec![
                "ARJUN MEHTA",
                "NEHA KAPOOR",
                "VIJAY R RAO",
                "WAITLISTED HIRER",
                "ANITA DESAI",
                "GEETHA S",
            ]
        );
    }

    #[test]
    fn test_rows_after_last_end_are_ignored() {
        let waitlisted = FIXTURE
            .lines()
            .find(|line| line.contains("WAITLISTED HIRER"))
            .unwrap();
        let content = format!("{FIXTURE}{waitlisted}\n");
        assert_eq!(hirers(&content).len(), 5);
    }

    #[test]
    fn test_analysis() {
        let result = parse();
        let expected = LockerAnalysis {
            total_lockers: 5,
            by_status: counts(&[("ACTIVE", 3), ("BREAK OPEN", 1), ("SURRENDERED", 1)]),
            by_size: counts(&[("LARGE", 1), ("MEDIUM", 1), ("SMALL", 2), ("XLARGE", 1)]),
            total_annual_rent: Decimal::new(2_100_000, 2),
            total_arrears: Decimal::new(1_652_000, 2),
            lockers_in_arrears: 2,
        };
        assert_eq!(result.report_info, Some(ReportInfo::Lockers(expected)));
    }

    #[test]
    fn test_filter_analysis() {
        let result = parse();

        let active = filter_analysis(
            &result,
            &LockerFilter {
                status: Some("active".to_string()),
                ..LockerFilter::default()
            },
        );
        assert_eq!(active.total_lockers, 3);
        assert_eq!(active.total_annual_rent, Decimal::new(1_350_000, 2));
        assert_eq!(active.lockers_in_arrears, 1);

        let small_clear = filter_analysis(
            &result,
            &LockerFilter {
                size: Some("SMALL".to_string()),
                in_arrears: Some(false),
                ..LockerFilter::default()
            },
        );
        assert_eq!(small_clear.total_lockers, 2);
        assert_eq!(small_clear.by_status, counts(&[("ACTIVE", 1), ("SURRENDERED", 1)]));

        assert_eq!(filter_analysis(&result, &LockerFilter::default()), analyze(&result.data));
    }

    #[test]
    fn test_analysis_of_nothing() {
        assert_eq!(analyze(&[]), LockerAnalysis::default());
    }
}
