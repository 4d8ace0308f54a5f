//! Line classifier: decides whether a raw report line carries a data row.
//!
//! The decision is a structural vote rather than a single pattern, since
//! real rows differ in which optional fields are present.

use crate::patterns::LEADING_DIGITS_RE;
use regex::Regex;

/// Tokens that only appear on column-header and page-header lines.
pub const HEADER_TOKENS: &[&str] = &[
    "CUSTOMER NUMBER",
    "CUSTOMER NO",
    "ACCOUNT NO",
    "ACCOUNT NUMBER",
    "BRANCH :",
    "BRANCH:",
    "REPORT ID:",
    "REPORT ID :",
    "PAGE NO",
    "RUN DATE",
    "PROCESS DATE",
];

/// Markers of total and summary lines.
pub const TOTAL_MARKERS: &[&str] = &["SEGMENT TOTAL", "PRODUCT TOTAL", "GRAND TOTAL", "SUB TOTAL"];

const SEPARATOR_RUNS: &[&str] = &["---", "===", "___", "***"];

/// Outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace only.
    Blank,
    /// Shorter than the report's minimum row length.
    TooShort,
    /// Rule line made of `-`, `=`, ...
    Separator,
    /// Segment, product or grand total.
    Total,
    /// Column or page header.
    Header,
    /// Does not start with the identifier digit run.
    Unanchored,
    /// Starts like a row but too few structural elements were found.
    WeakVote,
    /// A data row.
    Data,
}

/// One structural element that counts towards the vote.
#[derive(Debug, Clone)]
pub struct Signal {
    /// Name used in diagnostics.
    pub name: &'static str,
    /// Pattern looked for anywhere in the line.
    pub pattern: &'static Regex,
    /// Matches needed for the signal to count.
    pub min_matches: usize,
}

impl Signal {
    /// Signal satisfied by a single match.
    pub fn new(name: &'static str, pattern: &'static Regex) -> Self {
        Self {
            name,
            pattern,
            min_matches: 1,
        }
    }

    /// Signal that needs at least `min_matches` matches.
    pub fn at_least(name: &'static str, pattern: &'static Regex, min_matches: usize) -> Self {
        Self {
            name,
            pattern,
            min_matches,
        }
    }

    fn is_present(&self, line: &str) -> bool {
        self.pattern.find_iter(line).take(self.min_matches).count() >= self.min_matches
    }
}

/// Per-report line classifier.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    min_length: usize,
    anchor_digits: usize,
    threshold: usize,
    signals: Vec<Signal>,
    header_tokens: Vec<&'static str>,
    total_markers: Vec<&'static str>,
}

impl LineClassifier {
    /// Classifier with a minimum trimmed length and identifier anchor width.
    ///
    /// Without signals every anchored line of sufficient length is data.
    pub fn new(min_length: usize, anchor_digits: usize) -> Self {
        Self {
            min_length,
            anchor_digits,
            threshold: 0,
            signals: Vec::new(),
            header_tokens: HEADER_TOKENS.to_vec(),
            total_markers: TOTAL_MARKERS.to_vec(),
        }
    }

    /// Add a structural signal to the vote.
    pub fn signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// Number of signals a data line must satisfy.
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Extra header tokens specific to one report.
    pub fn header_tokens(mut self, tokens: &[&'static str]) -> Self {
        self.header_tokens.extend_from_slice(tokens);
        self
    }

    /// Extra total markers specific to one report.
    pub fn total_markers(mut self, markers: &[&'static str]) -> Self {
        self.total_markers.extend_from_slice(markers);
        self
    }

    /// Classify a line.
    pub fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if trimmed.chars().count() < self.min_length {
            return LineKind::TooShort;
        }
        if SEPARATOR_RUNS.iter().any(|run| trimmed.contains(run)) {
            return LineKind::Separator;
        }

        let upper = trimmed.to_uppercase();
        if self.total_markers.iter().any(|m| upper.contains(m)) {
            return LineKind::Total;
        }
        if self.header_tokens.iter().any(|t| upper.contains(t)) {
            return LineKind::Header;
        }

        let anchored = LEADING_DIGITS_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .is_some_and(|m| m.as_str().chars().count() >= self.anchor_digits);
        if !anchored {
            return LineKind::Unanchored;
        }

        if self.vote(line) < self.threshold {
            return LineKind::WeakVote;
        }
        LineKind::Data
    }

    /// Whether a line is a data row.
    pub fn is_data_line(&self, line: &str) -> bool {
        self.classify(line) == LineKind::Data
    }

    /// Number of signals present in the line.
    pub fn vote(&self, line: &str) -> usize {
        self.signals.iter().filter(|s| s.is_present(line)).count()
    }

    /// Names of the signals absent from the line.
    pub fn missing_signals(&self, line: &str) -> Vec<&'static str> {
        self.signals
            .iter()
            .filter(|s| !s.is_present(line))
            .map(|s| s.name)
            .collect()
    }
}
