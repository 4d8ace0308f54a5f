//! Section scanner: finds the line ranges of a report that hold data.
//!
//! Multi-page and multi-segment reports mark each data block with a
//! marker line, often followed by a repeated column-header line.

use crate::types::Section;
use regex::Regex;

/// Longest distance searched for a column header after a marker.
pub const MAX_HEADER_LOOKAHEAD: usize = 10;

/// Per-report section scanner.
#[derive(Debug, Clone)]
pub struct SectionScanner {
    marker: &'static Regex,
    close: Option<&'static Regex>,
    header: Option<&'static Regex>,
    lookahead: usize,
}

impl SectionScanner {
    /// Scanner where each marker line starts a new section.
    ///
    /// Markers are matched against trimmed lines.
    pub fn restart(marker: &'static Regex) -> Self {
        Self {
            marker,
            close: None,
            header: None,
            lookahead: MAX_HEADER_LOOKAHEAD,
        }
    }

    /// Scanner for sections bracketed by an opening and a closing marker.
    ///
    /// An opening marker always starts a section, ending any open one. A
    /// closing marker ends the open section and is ignored otherwise, so
    /// lines outside a bracket never belong to a section.
    pub fn bracket(open: &'static Regex, close: &'static Regex) -> Self {
        Self {
            close: Some(close),
            ..Self::restart(open)
        }
    }

    /// Column-header pattern marking where data really starts.
    pub fn header(mut self, header: &'static Regex) -> Self {
        self.header = Some(header);
        self
    }

    /// Lines searched for the header after a marker (capped).
    pub fn lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead.min(MAX_HEADER_LOOKAHEAD);
        self
    }

    /// Whether a line opens a section.
    pub fn is_marker(&self, line: &str) -> bool {
        self.marker.is_match(line.trim())
    }

    fn is_close(&self, line: &str) -> bool {
        self.close.is_some_and(|close| close.is_match(line.trim()))
    }

    /// Locate all sections in a document.
    ///
    /// An empty list is a valid outcome (no markers in the document).
    pub fn find_sections(&self, lines: &[&str]) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut open: Option<usize> = None;

        for (index, line) in lines.iter().enumerate() {
            if self.is_marker(line) {
                if let Some(start) = open.take() {
                    sections.push(Section { start, end: index });
                }
                open = Some(self.data_start(lines, index));
            } else if self.is_close(line) {
                if let Some(start) = open.take() {
                    sections.push(Section { start, end: index });
                }
            }
        }

        if let Some(start) = open {
            sections.push(Section {
                start: start.min(lines.len()),
                end: lines.len(),
            });
        }

        sections
    }

    fn data_start(&self, lines: &[&str], marker: usize) -> usize {
        let Some(header) = self.header else {
            return marker + 1;
        };

        let last = (marker + self.lookahead).min(lines.len().saturating_sub(1));
        for index in marker + 1..=last {
            let line = lines[index];
            if self.is_marker(line) || self.is_close(line) {
                break;
            }
            if header.is_match(line) {
                return index + 1;
            }
        }
        marker + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static MARKER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^PRODUCT\s*:").expect("valid marker regex"));
    static HEADER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"CUSTOMER\s+NO").expect("valid header regex"));
    static BEGIN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^BEGIN\s+REGISTER").expect("valid begin regex"));
    static END_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^END\s+REGISTER").expect("valid end regex"));

    #[test]
    fn test_restart_sections_skip_header() {
        let lines = vec![
            "REPORT ID: X",        // 0
            "PRODUCT : HL-01",     // 1
            "=====",               // 2
            "  CUSTOMER NO  ...",  // 3
            "row a",               // 4
            "row b",               // 5
            "  PRODUCT : VL-02",   // 6
            "row c",               // 7
        ];
        let scanner = SectionScanner::restart(&MARKER_RE).header(&HEADER_RE);
        assert_eq!(
            scanner.find_sections(&lines),
            vec![Section { start: 4, end: 6 }, Section { start: 7, end: 8 }]
        );
    }

    #[test]
    fn test_header_outside_lookahead_is_ignored() {
        let mut lines = vec!["PRODUCT : A"];
        lines.extend(std::iter::repeat("filler").take(12));
        lines.push("CUSTOMER NO");
        let scanner = SectionScanner::restart(&MARKER_RE).header(&HEADER_RE);
        assert_eq!(scanner.find_sections(&lines), vec![Section { start: 1, end: 14 }]);

        let short = scanner.clone().lookahead(3);
        let lines = vec!["PRODUCT : A", "x", "x", "x", "CUSTOMER NO", "row"];
        assert_eq!(short.find_sections(&lines), vec![Section { start: 1, end: 6 }]);
    }

    #[test]
    fn test_header_search_stops_at_next_marker() {
        let lines = vec!["PRODUCT : A", "PRODUCT : B", "CUSTOMER NO", "row"];
        let scanner = SectionScanner::restart(&MARKER_RE).header(&HEADER_RE);
        assert_eq!(
            scanner.find_sections(&lines),
            vec![Section { start: 1, end: 1 }, Section { start: 3, end: 4 }]
        );
    }

    #[test]
    fn test_bracket_sections() {
        let lines = vec![
            "BEGIN REGISTER A", // 0
            "row",              // 1
            "END REGISTER",     // 2
            "outside",          // 3
            "BEGIN REGISTER B", // 4
            "row",              // 5
            "row",              // 6
        ];
        let scanner = SectionScanner::bracket(&BEGIN_RE, &END_RE);
        assert_eq!(
            scanner.find_sections(&lines),
            vec![Section { start: 1, end: 2 }, Section { start: 5, end: 7 }]
        );
    }

    #[test]
    fn test_bracket_stray_end_is_ignored() {
        let lines = vec![
            "END REGISTER",     // 0
            "outside",          // 1
            "BEGIN REGISTER A", // 2
            "row",              // 3
            "END REGISTER",     // 4
            "END REGISTER",     // 5
            "outside",          // 6
        ];
        let scanner = SectionScanner::bracket(&BEGIN_RE, &END_RE);
        assert_eq!(scanner.find_sections(&lines), vec![Section { start: 3, end: 4 }]);
    }

    #[test]
    fn test_bracket_begin_closes_open_section() {
        let lines = vec![
            "BEGIN REGISTER A", // 0
            "row",              // 1
            "BEGIN REGISTER B", // 2
            "row",              // 3
            "END REGISTER",     // 4
        ];
        let scanner = SectionScanner::bracket(&BEGIN_RE, &END_RE);
        assert_eq!(
            scanner.find_sections(&lines),
            vec![Section { start: 1, end: 2 }, Section { start: 3, end: 4 }]
        );
    }

    #[test]
    fn test_no_markers() {
        let scanner = SectionScanner::restart(&MARKER_RE);
        assert!(scanner.find_sections(&["a", "b"]).is_empty());
        assert!(scanner.find_sections(&[]).is_empty());
    }
}
