//! New CC/OD balance file (`new-cc-od-balance`).
//!
//! Cash credit and overdraft accounts grouped by `SEGMENT :`. Balances
//! carry a trailing sign: `-` for debit balances, `+` for credit.

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

pub const KEY: &str = "new-cc-od-balance";

pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Account Number", 2, 16, FieldType::Number),
    ColumnSpec::new("Customer Number", 17, 27, FieldType::Number),
    ColumnSpec::new("Account Name", 28, 58, FieldType::Text),
    ColumnSpec::new("Product Code", 58, 65, FieldType::Text),
    ColumnSpec::new("Sanction Date", 66, 76, FieldType::Date),
    ColumnSpec::new("Limit Expiry Date", 78, 88, FieldType::Date),
    ColumnSpec::new("Sanctioned Limit", 88, 106, FieldType::Currency),
    ColumnSpec::new("Drawing Power", 106, 124, FieldType::Currency),
    ColumnSpec::new("Balance", 124, 142, FieldType::Currency),
    ColumnSpec::new("Irregular Amount", 142, 158, FieldType::Currency),
    ColumnSpec::new("Interest Rate", 158, 165, FieldType::Percentage),
    ColumnSpec::new("Account Status", 166, 178, FieldType::Text),
    ColumnSpec::new("Renewal Due", 178, 182, FieldType::Flag),
    ColumnSpec::new("Stock Statement", 182, 186, FieldType::Flag),
    ColumnSpec::new("Unapplied Interest", 186, 202, FieldType::Currency),
];

const STATUSES: &[&str] = &["REGULAR", "IRREGULAR", "OVERDUE", "NPA", "SMA-0", "SMA-1", "SMA-2"];

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SEGMENT\s*:").expect("valid segment marker regex"));
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ACCOUNT\s+NO").expect("valid cc/od header regex"));
static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(STATUSES));
static RATE_STATUS_RE: LazyLock<Regex> = LazyLock::new(|| rate_keyword_regex(STATUSES));

pub fn layout() -> ReportLayout {
    ReportLayout {
        key: KEY,
        columns: COLUMNS,
        classifier: LineClassifier::new(120, 10)
            .signal(Signal::new("product code", &BRACKETED_CODE_RE))
            .signal(Signal::new("date", &DATE_RE))
            .signal(Signal::at_least("amounts", &CURRENCY_RE, 2))
            .signal(Signal::new("status", &STATUS_RE))
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
            Step::BracketedCode { column: 3 },
            Step::Dates,
            Step::Keyword {
                column: 11,
                words: &STATUS_RE,
                rate: Some(RateKeyword {
                    column: 10,
                    pattern: &RATE_STATUS_RE,
                }),
                pick: Pick::First,
            },
            Step::Currency {
                forward: vec![6, 7, 8, 9],
                trailing: Some(14),
            },
            Step::TrailingFlags,
            Step::DerivedSpan {
                column: 2,
                after: 1,
                before: 3,
            },
        ]),
        required: vec![0, 1],
        currency: CurrencyStyle::StripSeparators,
        summarize: None,
    }
}
