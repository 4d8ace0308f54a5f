//! Report parser orchestration.
//!
//! A [`ReportEngine`] owns one report layout and turns documents into
//! [`ParseResult`]s: metadata, sections, line classification, pattern
//! extraction, positional backfill and formatting, in that order. It holds
//! no per-document state, so one engine can parse many documents from
//! many threads.

use crate::classifier::{LineClassifier, LineKind};
use crate::config::ParseOptions;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Level, LogSink};
use crate::error::Error;
use crate::extraction::ExtractionChain;
use crate::formatter::{format_field, CurrencyStyle};
use crate::metadata::extract_metadata;
use crate::positional::{backfill, extract_positional};
use crate::sections::SectionScanner;
use crate::types::{ColumnSpec, ParseResult, ParsedRow, RejectedLine, ReportInfo, Section};
use std::sync::Arc;

/// Static description of one report type.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    /// Registry key.
    pub key: &'static str,
    /// Column table, also the positional fallback layout.
    pub columns: &'static [ColumnSpec],
    pub classifier: LineClassifier,
    /// `None` for single-section reports.
    pub sections: Option<SectionScanner>,
    pub chain: ExtractionChain,
    /// Columns that must be non-empty for a row to be kept.
    pub required: Vec<usize>,
    pub currency: CurrencyStyle,
    /// Report-specific summary computed from the finished rows.
    pub summarize: Option<fn(&ParseResult) -> ReportInfo>,
}

/// Common surface of every report parser.
pub trait ReportParser: Send + Sync {
    /// Registry key of the report type.
    fn key(&self) -> &'static str;

    /// Column table of the report type.
    fn columns(&self) -> &'static [ColumnSpec];

    /// Column names in declaration order.
    fn headers(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name.to_string()).collect()
    }

    /// Parse a whole document. Never fails: bad lines are skipped and an
    /// empty document gives an empty result.
    fn parse(&self, content: &str) -> ParseResult;
}

/// Layout-driven parser shared by all report types.
#[derive(Clone)]
pub struct ReportEngine {
    layout: ReportLayout,
    options: ParseOptions,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for ReportEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEngine")
            .field("key", &self.layout.key)
            .field("options", &self.options)
            .finish()
    }
}

impl ReportEngine {
    /// Engine logging through the `log` facade.
    pub fn new(layout: ReportLayout, options: ParseOptions) -> Self {
        Self::with_sink(layout, options, Arc::new(LogSink))
    }

    /// Engine reporting to a caller-provided sink.
    pub fn with_sink(
        layout: ReportLayout,
        options: ParseOptions,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self { layout, options, sink }
    }

    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// Extract and format one line that is already known to be data.
    ///
    /// `line_number` is 1-based and only used for diagnostics.
    pub fn parse_row(&self, line: &str, line_number: usize) -> ParsedRow {
        let columns = self.layout.columns;

        let extracted = if self.options.debug {
            self.layout.chain.extract_with(line, columns, |step, column, value| {
                self.debug(
                    Some(line_number),
                    format!("{step} filled {}: {value:?}", columns[column].name),
                );
            })
        } else {
            self.layout.chain.extract(line, columns)
        };

        let raw: Vec<String> = match extracted {
            Ok(slots) => slots
                .into_iter()
                .zip(columns)
                .map(|(slot, column)| match slot {
                    Some(slot) => slot.value,
                    None => backfill(line, column).unwrap_or_default(),
                })
                .collect(),
            Err(err) => {
                let err = Error::Extraction {
                    line: line_number,
                    message: err.to_string(),
                };
                self.emit(
                    Level::Warn,
                    Some(line_number),
                    format!("{err}; using positional layout"),
                );
                extract_positional(line, columns)
            }
        };

        raw.iter()
            .zip(columns)
            .map(|(value, column)| format_field(value, column.field_type, self.layout.currency))
            .collect()
    }

    fn sections(&self, lines: &[&str]) -> Vec<Section> {
        match &self.layout.sections {
            Some(scanner) => {
                let sections = scanner.find_sections(lines);
                if sections.is_empty() {
                    self.emit(Level::Warn, None, "no report sections found");
                }
                sections
            }
            None => vec![Section {
                start: 0,
                end: lines.len(),
            }],
        }
    }

    fn missing_required(&self, row: &ParsedRow) -> Vec<&'static str> {
        self.layout
            .required
            .iter()
            .filter(|&&index| row.get(index).map_or(true, |value| value.is_empty()))
            .map(|&index| self.layout.columns.get(index).map_or("?", |c| c.name))
            .collect()
    }

    fn emit(&self, level: Level, line: Option<usize>, message: impl Into<String>) {
        self.sink
            .emit(Diagnostic::new(level, self.layout.key, line, message));
    }

    fn debug(&self, line: Option<usize>, message: impl Into<String>) {
        if self.options.debug {
            self.emit(Level::Debug, line, message);
        }
    }
}

impl ReportParser for ReportEngine {
    fn key(&self) -> &'static str {
        self.layout.key
    }

    fn columns(&self) -> &'static [ColumnSpec] {
        self.layout.columns
    }

    fn parse(&self, content: &str) -> ParseResult {
        let lines: Vec<&str> = content.lines().collect();
        let classifier: &LineClassifier = &self.layout.classifier;

        let mut result = ParseResult::new(self.headers());
        result.metadata = extract_metadata(&lines, self.options.metadata_lines);

        let sections = self.sections(&lines);
        let mut rejected = 0;

        for section in &sections {
            for index in section.start..section.end.min(lines.len()) {
                let line = lines[index];
                let line_number = index + 1;

                let kind = classifier.classify(line);
                match kind {
                    LineKind::Data => {}
                    LineKind::Blank => continue,
                    LineKind::WeakVote => {
                        let missing = classifier.missing_signals(line).join(", ");
                        self.debug(
                            Some(line_number),
                            format!("skipped: {kind:?} (missing {missing})"),
                        );
                        continue;
                    }
                    _ => {
                        self.debug(Some(line_number), format!("skipped: {kind:?}"));
                        continue;
                    }
                }

                let row = self.parse_row(line, line_number);
                let missing = self.missing_required(&row);
                if missing.is_empty() {
                    result.data.push(row);
                    continue;
                }

                rejected += 1;
                let reason = format!("missing {}", missing.join(", "));
                self.debug(Some(line_number), format!("rejected: {reason}"));
                if self.options.collect_rejected {
                    result.rejected.push(RejectedLine {
                        line_number,
                        reason,
                        text: line.to_string(),
                    });
                }
            }
        }

        if let Some(summarize) = self.layout.summarize {
            result.report_info = Some(summarize(&result));
        }

        self.emit(
            Level::Info,
            None,
            format!(
                "{} rows from {} sections ({} lines, {} rejected)",
                result.data.len(),
                sections.len(),
                lines.len(),
                rejected
            ),
        );

        result
    }
}
