//! General ledger balance sheet (`gl-balance-sheet`).
//!
//! One section per schedule. GL codes are nine digits, shorter than the
//! customer identifiers of the account-level reports.

use crate::classifier::{LineClassifier, Signal};
use crate::engine::ReportLayout;
use crate::extraction::{ExtractionChain, Pick, Step};
use crate::formatter::CurrencyStyle;
use crate::patterns::{keyword_regex, CURRENCY_RE, DATE_RE};
use crate::sections::SectionScanner;
use crate::types::{ColumnSpec, FieldType, ParseResult, ReportInfo};
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::LazyLock;

pub const KEY: &str = "gl-balance-sheet";

const DEBITS: usize = 3;
const CREDITS: usize = 4;
const CLOSING: usize = 5;
const SIDE: usize = 6;

pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("GL Code", 2, 11, FieldType::Number),
    ColumnSpec::new("Description", 12, 52, FieldType::Text),
    ColumnSpec::new("Opening Balance", 52, 70, FieldType::Currency),
    ColumnSpec::new("Debits", 70, 88, FieldType::Currency),
    ColumnSpec::new("Credits", 88, 106, FieldType::Currency),
    ColumnSpec::new("Closing Balance", 106, 124, FieldType::Currency),
    ColumnSpec::new("Balance Side", 125, 127, FieldType::Text),
    ColumnSpec::new("Last Transaction Date", 130, 140, FieldType::Date),
];

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SCHEDULE\s*-\s*[0-9]+").expect("valid schedule marker regex"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GL\s+CODE").expect("valid gl header regex"));
static SIDE_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(&["DR", "CR"]));

pub fn layout() -> ReportLayout {
    ReportLayout {
        key: KEY,
        columns: COLUMNS,
        classifier: LineClassifier::new(60, 8)
            .signal(Signal::at_least("amounts", &CURRENCY_RE, 3))
            .signal(Signal::new("side", &SIDE_RE))
            .signal(Signal::new("date", &DATE_RE))
            .threshold(2)
            .total_markers(&["SCHEDULE TOTAL"]),
        sections: Some(SectionScanner::restart(&MARKER_RE).header(&HEADER_RE)),
        chain: ExtractionChain::new(vec![
            Step::LeadingId { column: 0, min_digits: 8 },
            Step::Keyword {
                column: SIDE,
                words: &SIDE_RE,
                rate: None,
                pick: Pick::Last,
            },
            Step::Currency {
                forward: vec![2, DEBITS, CREDITS, CLOSING],
                trailing: None,
            },
            Step::Dates,
            Step::DerivedSpan {
                column: 1,
                after: 0,
                before: 2,
            },
        ]),
        required: vec![0, CLOSING],
        currency: CurrencyStyle::StripSeparators,
        summarize: Some(summarize),
    }
}

/// Ledger-wide totals of a balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerTotals {
    pub accounts: usize,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    /// Sum of closing balances on the debit side.
    pub closing_debit: Decimal,
    /// Sum of closing balances on the credit side.
    pub closing_credit: Decimal,
    /// `closing_credit - closing_debit`.
    pub difference: Decimal,
}

/// Compute totals over the rows of a balance sheet result.
pub fn ledger_totals(result: &ParseResult) -> LedgerTotals {
    let mut totals = LedgerTotals::default();
    for row in &result.data {
        let field = |index: usize| row.get(index).map_or("", String::as_str);
        totals.accounts += 1;
        totals.total_debits += amount(field(DEBITS));
        totals.total_credits += amount(field(CREDITS));
        match field(SIDE) {
            "DR" => totals.closing_debit += amount(field(CLOSING)),
            "CR" => totals.closing_credit += amount(field(CLOSING)),
            _ => {}
        }
    }
    totals.difference = totals.closing_credit - totals.closing_debit;
    totals
}

fn summarize(result: &ParseResult) -> ReportInfo {
    ReportInfo::Ledger(ledger_totals(result))
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

    const FIXTURE: &str = include_str!("../../fixtures/gl_balance_sheet.txt");

    fn parse() -> ParseResult {
        ReportEngine::with_sink(layout(), ParseOptions::default(), Arc::new(NullSink))
            .parse(FIXTURE)
    }

    #[test]
    fn test_fixture_rows() {
        let result = parse();
        assert_eq!(result.data.len(), 6);
        assert_eq!(
            result.data[2],
            vec![
                "120100010",
                "SAVINGS BANK DEPOSITS",
                "48210455.20",
                "12450300.00",
                "15890125.50",
                "51650280.70",
                "CR",
                "30/03/2024",
            ]
        );
        assert_eq!(result.data[5][1], "FIXED ASSETS");
        assert_eq!(result.data[5][7], "--N.A--");
        let sides: Vec<&str> = result.column("Balance Side").unwrap().collect();
        assert_eq!(sides, vec!["CR", "CR", "CR", "DR", "DR", "DR"]);
    }

    #[test]
    fn test_totals() {
        let expected = LedgerTotals {
            accounts: 6,
            total_debits: Decimal::new(2_178_030_000, 2),
            total_credits: Decimal::new(2_411_562_550, 2),
            closing_debit: Decimal::new(4_321_450_000, 2),
            closing_credit: Decimal::new(5_815_028_070, 2),
            difference: Decimal::new(1_493_578_070, 2),
        };
        assert_eq!(parse().report_info, Some(ReportInfo::Ledger(expected)));
    }

    #[test]
    fn test_schedule_total_is_not_a_row() {
        let classifier = layout().classifier;
        assert!(!classifier.is_data_line(
            "                                        SCHEDULE TOTAL:     54,460,455.20     12,450,300.00     16,140,125.50     58,150,280.70"
        ));
    }
}
