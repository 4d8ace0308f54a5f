//! Deposits balance file (`bank-deposits`).
//!
//! Single-section report, one account per line. Amounts keep their
//! thousands separators.

use crate::classifier::{LineClassifier, Signal};
use crate::engine::ReportLayout;
use crate::extraction::{ExtractionChain, Pick, RateKeyword, Step};
use crate::formatter::CurrencyStyle;
use crate::patterns::{keyword_regex, rate_keyword_regex, BRACKETED_CODE_RE, CURRENCY_RE, DATE_RE};
use crate::types::{ColumnSpec, FieldType};
use regex::Regex;
use std::sync::LazyLock;

pub const KEY: &str = "bank-deposits";

pub const CUSTOMER_NUMBER: usize = 0;
pub const ACCOUNT_NUMBER: usize = 4;
pub const BALANCE: usize = 6;

pub const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("Customer Number", 2, 12, FieldType::Number),
    ColumnSpec::new("Product Code", 12, 19, FieldType::Text),
    ColumnSpec::new("Account Type", 19, 45, FieldType::Text),
    ColumnSpec::new("Open Date", 45, 55, FieldType::Date),
    ColumnSpec::new("Account Number", 59, 72, FieldType::Number),
    ColumnSpec::new("Customer Name", 72, 99, FieldType::Text),
    ColumnSpec::new("Balance", 99, 115, FieldType::Currency),
    ColumnSpec::new("Hold Amount", 115, 127, FieldType::Currency),
    ColumnSpec::new("Lien Amount", 127, 143, FieldType::Currency),
    ColumnSpec::new("Maturity Date", 145, 157, FieldType::Date),
    ColumnSpec::new("Interest Rate", 157, 163, FieldType::Percentage),
    ColumnSpec::new("Status", 164, 178, FieldType::Text),
    ColumnSpec::new("Nomination", 178, 183, FieldType::Flag),
    ColumnSpec::new("KYC Complete", 183, 188, FieldType::Flag),
    ColumnSpec::new("Freeze", 188, 193, FieldType::Flag),
    ColumnSpec::new("Interest Available", 193, 200, FieldType::Currency),
];

const STATUSES: &[&str] = &[
    "OPEN",
    "INOPERATIVE",
    "DORMANT UNCLAIMED",
    "DORMANT UNCLA",
    "CLOSED",
    "FROZEN",
    "MATURED",
];

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| keyword_regex(STATUSES));
static RATE_STATUS_RE: LazyLock<Regex> = LazyLock::new(|| rate_keyword_regex(STATUSES));

pub fn layout() -> ReportLayout {
    ReportLayout {
        key: KEY,
        columns: COLUMNS,
        classifier: LineClassifier::new(50, 10)
            .signal(Signal::new("product code", &BRACKETED_CODE_RE))
            .signal(Signal::new("date", &DATE_RE))
            .signal(Signal::new("amount", &CURRENCY_RE))
            .signal(Signal::new("status", &STATUS_RE))
            .threshold(3),
        sections: None,
        chain: ExtractionChain::new(vec![
            Step::LeadingId {
                column: CUSTOMER_NUMBER,
                min_digits: 10,
            },
            Step::SecondaryId {
                column: ACCOUNT_NUMBER,
                after: CUSTOMER_NUMBER,
                min_digits: 10,
            },
            Step::BracketedCode { column: 1 },
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
                forward: vec![BALANCE, 7, 8],
                trailing: Some(15),
            },
            Step::TrailingFlags,
            Step::DerivedSpan {
                column: 2,
                after: 1,
                before: 3,
            },
            Step::DerivedSpan {
                column: 5,
                after: ACCOUNT_NUMBER,
                before: BALANCE,
            },
        ]),
        required: vec![CUSTOMER_NUMBER, ACCOUNT_NUMBER],
        currency: CurrencyStyle::PreserveSeparators,
        summarize: None,
    }
}
