//! Header-block metadata: labeled facts from the top of a report.
//!
//! A label runs up to the next known label on the same line. Values are
//! cut at the first wide gap, since mainframe headers pad unrelated
//! captions (bank name, report title) between labeled fields.

use crate::formatter::format_date;
use crate::types::ReportMetadata;
use regex::Regex;
use std::sync::LazyLock;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<label>REPORT\s+ID|RUN\s+DATE|PROCESS\s+DATE|BRANCH\s+CODE|BRANCH\s+NAME|BRANCH|REGION|ZONE|PAGE\s+NO)\s*:",
    )
    .expect("valid metadata label regex")
});

static WIDE_GAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{3,}").expect("valid gap regex"));

static BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<code>[0-9]+)\s*-\s*(?P<name>.+)$").expect("valid branch regex")
});

static AS_ON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bAS\s+ON\s*:?\s*(?P<date>[0-9]{2}[/-][0-9]{2}[/-][0-9]{4})\b")
        .expect("valid as-on regex")
});

/// Default number of leading lines scanned for metadata.
pub const DEFAULT_METADATA_LINES: usize = 15;

/// Extract labeled facts from the first `max_lines` lines.
///
/// The first occurrence of a key wins, so repeated page headers do not
/// overwrite it. Page numbers are not recorded.
pub fn extract_metadata(lines: &[&str], max_lines: usize) -> ReportMetadata {
    let mut metadata = ReportMetadata::new();

    for line in lines.iter().take(max_lines) {
        let labels: Vec<_> = LABEL_RE.captures_iter(line).collect();
        for (index, caps) in labels.iter().enumerate() {
            let (Some(whole), Some(label)) = (caps.get(0), caps.name("label")) else {
                continue;
            };
            let value_end = labels
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(line.len(), |next| next.start());
            let Some(raw) = line.get(whole.end()..value_end) else {
                continue;
            };
            let value = first_field(raw);
            record(&mut metadata, &canonical_key(label.as_str()), value);
        }

        if let Some(date) = AS_ON_RE.captures(line).and_then(|caps| caps.name("date")) {
            metadata.insert("as_on_date", &format_date(date.as_str()));
        }
    }

    metadata
}

fn first_field(raw: &str) -> &str {
    let trimmed = raw.trim();
    match WIDE_GAP_RE.find(trimmed) {
        Some(gap) => &trimmed[..gap.start()],
        None => trimmed,
    }
}

fn canonical_key(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn record(metadata: &mut ReportMetadata, key: &str, value: &str) {
    match key {
        "page_no" => {}
        "run_date" | "process_date" => {
            metadata.insert(key, &format_date(value));
        }
        "branch" => {
            metadata.insert("branch", value);
            if let Some(caps) = BRANCH_RE.captures(value) {
                metadata.insert("branch_code", &caps["code"]);
                metadata.insert("branch_name", caps["name"].trim());
            }
        }
        _ => {
            metadata.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "\
REPORT ID: DEP-BAL-001                   BANK OF EXAMPLE LTD                    RUN DATE: 05/04/2024
BRANCH : 0123 - MG ROAD                  REGION: SOUTH          ZONE: BANGALORE
PROCESS DATE: 31-03-2024                                                        PAGE NO: 1
                                  DEPOSITS BALANCE FILE AS ON 31/03/2024";

    #[test]
    fn test_extract_header_block() {
        let lines: Vec<&str> = HEADER.lines().collect();
        let metadata = extract_metadata(&lines, DEFAULT_METADATA_LINES);
        let pairs: Vec<(&str, &str)> = metadata.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("as_on_date", "31/03/2024"),
                ("branch", "0123 - MG ROAD"),
                ("branch_code", "0123"),
                ("branch_name", "MG ROAD"),
                ("process_date", "31/03/2024"),
                ("region", "SOUTH"),
                ("report_id", "DEP-BAL-001"),
                ("run_date", "05/04/2024"),
                ("zone", "BANGALORE"),
            ]
        );
    }

    #[test]
    fn test_first_value_wins_and_window_is_bounded() {
        let lines = vec!["REPORT ID: A", "REPORT ID: B", "REGION: NORTH"];
        let metadata = extract_metadata(&lines, 2);
        assert_eq!(metadata.get("report_id"), Some("A"));
        assert_eq!(metadata.get("region"), None);
    }

    #[test]
    fn test_blank_values_are_omitted() {
        let lines = vec!["REPORT ID:            RUN DATE: 01/01/2024", "ZONE:"];
        let metadata = extract_metadata(&lines, DEFAULT_METADATA_LINES);
        assert_eq!(metadata.get("report_id"), None);
        assert_eq!(metadata.get("zone"), None);
        assert_eq!(metadata.get("run_date"), Some("01/01/2024"));
    }

    #[test]
    fn test_empty_document() {
        assert!(extract_metadata(&[], DEFAULT_METADATA_LINES).is_empty());
    }
}
