//! Loans balance file (`bank-loans`).
//!
//! One section per loan product, each opened by a `PRODUCT :` line and a
//! repeated column header.

use crate::classifier::{LineClassifier, Signal};
use crate::engine::ReportLayout;
use crate::extraction::{ExtractionChain, Pick, RateKeyword, Step};
use crate::formatter::CurrencyStyle;
use crate::patterns::{
    keyword_regex, rate_keyword_regex, BRACKETED_CODE_RE, CURRENCY_RE, DATE_RE, FLAG_RE,
};
use crate::sections::SectionScanner;
use crate::types::{ColumnSpec, FieldType};
use regex::Regex;
use std::sync::LazyLock;

pub const KEY: &str = "bank-loans";

pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Customer Number", 2, 12, FieldType::Number),
    ColumnSpec::new("Account Number", 14, 28, FieldType::Number),
    ColumnSpec::new("Product Code", 29, 36, FieldType::Text),
    ColumnSpec::new("Borrower Name", 38, 70, FieldType::Text),
    ColumnSpec::new("Sanction Date", 70, 80, FieldType::Date),
    ColumnSpec::new("Maturity Date", 82, 92, FieldType::Date),
    ColumnSpec::new("Sanctioned Limit", 92, 110, FieldType::Currency),
    ColumnSpec::new("Outstanding Balance", 110, 128, FieldType::Currency),
    ColumnSpec::new("Overdue Amount", 128, 142, FieldType::Currency),
    ColumnSpec::new("Interest Rate", 142, 149, FieldType::Percentage),
    ColumnSpec::new("Asset Classification", 150, 162, FieldType::Text),
    ColumnSpec::new("Restructured", 163, 164, FieldType::Flag),
    ColumnSpec::new("Interest Accrued", 166, 182, FieldType::Currency),
];

const ASSET_CLASSES: &[&str] = &["STANDARD", "SUB-STANDARD", "SUBSTANDARD", "DOUBTFUL", "LOSS"];

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PRODUCT\s*:").expect("valid product marker regex"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CUSTOMER\s+NO").expect("valid loans header regex"));
static ASSET_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(ASSET_CLASSES));
static RATE_ASSET_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| rate_keyword_regex(ASSET_CLASSES));

pub fn layout() -> ReportLayout {
    ReportLayout {
        key: KEY,
        columns: COLUMNS,
        classifier: LineClassifier::new(100, 10)
            .signal(Signal::new("product code", &BRACKETED_CODE_RE))
            .signal(Signal::new("date", &DATE_RE))
            .signal(Signal::at_least("amounts", &CURRENCY_RE, 2))
            .signal(Signal::new("asset class", &ASSET_CLASS_RE))
            .signal(Signal::new("flag", &FLAG_RE))
            .threshold(3),
        sections: Some(SectionScanner::restart(&MARKER_RE).header(&HEADER_RE)),
        chain: ExtractionChain::new(vec![
            Step::LeadingId { column: 0, min_digits: 10 },
            Step::SecondaryId {
                column: 1,
                after: 0,
                min_digits: 10,
            },
            Step::BracketedCode { column: 2 },
            Step::Dates,
            Step::Keyword {
                column: 10,
                words: &ASSET_CLASS_RE,
                rate: Some(RateKeyword {
                    column: 9,
                    pattern: &RATE_ASSET_CLASS_RE,
                }),
                pick: Pick::First,
            },
            Step::Currency {
                forward: vec![6, 7, 8],
                trailing: Some(12),
            },
            Step::TrailingFlags,
            Step::DerivedSpan {
                column: 3,
                after: 2,
                before: 4,
            },
        ]),
        required: vec![0, 1],
        currency: CurrencyStyle::StripSeparators,
        summarize: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::diagnostics::NullSink;
    use crate::engine::{ReportEngine, ReportParser};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const FIXTURE: &str = include_str!("../../fixtures/loans_balance.txt");

    fn parse(content: &str) -> crate::types::ParseResult {
        ReportEngine::with_sink(layout(), ParseOptions::default(), Arc::new(NullSink))
            .parse(content)
    }

    #[test]
    fn test_fixture() {
        let result = parse(FIXTURE);
        assert_eq!(result.data.len(), 6);
        assert_eq!(
            result.data[1],
            vec![
                "5012345679",
                "50123456789013",
                "HL-01",
                "PRIYA NAIR",
                "01/07/2019",
                "01/07/2039",
                "3000000.00",
                "2654100.00",
                "25400.00",
                "8.50",
                "SUB-STANDARD",
                "Y",
                "18790.10",
            ]
        );

        let names: Vec<&str> = result.column("Borrower Name").unwrap().collect();
        assert_eq!(
            names,
            vec![
                "RAMESH KUMAR",
                "PRIYA NAIR",
                "ANAND K MURTHY",
                "FATIMA SHAIKH",
                "JOHN D SOUZA",
                "MEERA PILLAI",
            ]
        );
        assert_eq!(result.metadata.get("report_id"), Some("LN-BAL-014"));
        assert_eq!(result.metadata.get("branch_name"), Some("CHURCH STREET"));
    }

    #[test]
    fn test_tiered_rate_comes_from_position() {
        let result = parse(FIXTURE);
        let anand = &result.data[2];
        assert_eq!(anand[9], "TIERED");
        assert_eq!(anand[10], "STANDARD");
        assert_eq!(anand[12], "7612.50");
    }

    #[test]
    fn test_not_applicable_maturity() {
        let result = parse(FIXTURE);
        let meera = &result.data[5];
        assert_eq!(meera[4], "30/09/2023");
        assert_eq!(meera[5], "--N.A--");
        assert_eq!(meera[6], "950000.00");
        assert_eq!(meera[12], "6825.75");
    }

    #[test]
    fn test_rows_outside_products_are_ignored() {
        let row = FIXTURE.lines().find(|l| l.contains("RAMESH KUMAR")).unwrap();
        let content = format!("REPORT ID: LN\n{row}\n");
        assert!(parse(&content).is_empty());
    }
}
