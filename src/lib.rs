//! Bank Report Parser Library
//!
//! A library for turning fixed-width, mainframe-style bank reports into
//! tabular rows.
//!
//! # Supported Reports
//!
//! - **bank-deposits**: deposits balance file
//! - **bank-loans**: loans balance file, one section per product
//! - **new-cc-od-balance**: cash credit / overdraft balances by segment
//! - **sdv-lockers**: safe deposit locker register
//! - **gl-balance-sheet**: general ledger balance sheet by schedule
//!
//! # How a report is read
//!
//! Each report type is a static layout: a column table, a line classifier,
//! an optional section scanner and a pattern extraction chain. Values are
//! located by pattern first and by nominal column offset second, then
//! normalized per column type. Bad lines are skipped; empty reports are
//! valid results.
//!
//! # Examples
//!
//! ## Parsing a deposits balance file
//!
//! ```no_run
//! use bank_report_parser::{ReportKind, ReportParser};
//! use bank_report_parser::config::ParseOptions;
//!
//! let content = std::fs::read_to_string("deposits_balance_file.txt")?;
//! let parser = ReportKind::Deposits.default_parser(ParseOptions::default());
//! let result = parser.parse(&content);
//! println!("{} accounts", result.data.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Selecting a parser by key
//!
//! ```no_run
//! use bank_report_parser::ParserRegistry;
//! use bank_report_parser::config::ParseOptions;
//! use bank_report_parser::diagnostics::LogSink;
//! use std::sync::Arc;
//!
//! let registry = ParserRegistry::builtin(ParseOptions::default(), Arc::new(LogSink));
//! let result = registry.parse("sdv-lockers", "")?;
//! assert!(result.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod filename;
pub mod formatter;
pub mod metadata;
pub mod patterns;
pub mod positional;
pub mod registry;
pub mod reports;
pub mod sections;
pub mod types;

use std::str::FromStr;
use std::sync::Arc;

// Re-export commonly used types
pub use engine::{ReportEngine, ReportLayout, ReportParser};
pub use error::{Error, Result};
pub use registry::ParserRegistry;
pub use types::{ColumnSpec, FieldType, ParseResult, ParsedRow, ReportInfo, ReportMetadata};

use config::ParseOptions;
use diagnostics::DiagnosticSink;

/// Built-in report types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Deposits balance file
    Deposits,
    /// Loans balance file
    Loans,
    /// New CC/OD balance file
    CcOd,
    /// Safe deposit locker register
    SdvLockers,
    /// General ledger balance sheet
    GlBalanceSheet,
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bank-deposits" | "deposits" | "deposit" => Ok(ReportKind::Deposits),
            "bank-loans" | "loans" | "loan" => Ok(ReportKind::Loans),
            "new-cc-od-balance" | "cc-od" | "ccod" | "cc/od" => Ok(ReportKind::CcOd),
            "sdv-lockers" | "sdv" | "lockers" => Ok(ReportKind::SdvLockers),
            "gl-balance-sheet" | "gl" | "balance-sheet" => Ok(ReportKind::GlBalanceSheet),
            _ => Err(Error::UnsupportedParser(s.to_string())),
        }
    }
}

impl ReportKind {
    /// Every built-in report type.
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Deposits,
        ReportKind::Loans,
        ReportKind::CcOd,
        ReportKind::SdvLockers,
        ReportKind::GlBalanceSheet,
    ];

    /// Registry key.
    pub fn key(&self) -> &'static str {
        match self {
            ReportKind::Deposits => reports::deposits::KEY,
            ReportKind::Loans => reports::loans::KEY,
            ReportKind::CcOd => reports::cc_od::KEY,
            ReportKind::SdvLockers => reports::sdv_lockers::KEY,
            ReportKind::GlBalanceSheet => reports::gl_balance::KEY,
        }
    }

    /// Human-readable report title.
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Deposits => "Deposits Balance File",
            ReportKind::Loans => "Loans Balance File",
            ReportKind::CcOd => "New CC/OD Balance File",
            ReportKind::SdvLockers => "SDV Locker Register",
            ReportKind::GlBalanceSheet => "GL Balance Sheet",
        }
    }

    /// Static layout of the report type.
    pub fn layout(&self) -> ReportLayout {
        match self {
            ReportKind::Deposits => reports::deposits::layout(),
            ReportKind::Loans => reports::loans::layout(),
            ReportKind::CcOd => reports::cc_od::layout(),
            ReportKind::SdvLockers => reports::sdv_lockers::layout(),
            ReportKind::GlBalanceSheet => reports::gl_balance::layout(),
        }
    }

    /// Parser for the report type reporting to `sink`.
    pub fn parser(&self, options: ParseOptions, sink: Arc<dyn DiagnosticSink>) -> ReportEngine {
        ReportEngine::with_sink(self.layout(), options, sink)
    }

    /// Parser for the report type logging through the `log` facade.
    pub fn default_parser(&self, options: ParseOptions) -> ReportEngine {
        ReportEngine::new(self.layout(), options)
    }
}
