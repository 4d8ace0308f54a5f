//! Compiled patterns shared by the classifier, the extraction chain and
//! the formatter. All are linear-time `regex` automata.

use regex::Regex;
use std::sync::LazyLock;

/// `DD/MM/YYYY` or `DD-MM-YYYY` anywhere in a line.
pub static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9]{2}[/-][0-9]{2}[/-][0-9]{4}\b").expect("valid date regex")
});

/// Not-applicable marker inside a line (`--N.A--`, `N.A`, `N/A`).
pub static NOT_APPLICABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:-+\s*)?\bN\s*[./]\s*A\b\.?(?:\s*-+)?").expect("valid n.a. regex")
});

/// Amount with exactly two decimals and an optional trailing sign.
pub static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9][0-9,]*\.[0-9]{2}\b[-+]?").expect("valid currency regex"));

/// Standalone single-letter flag.
pub static FLAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[YNR]\b").expect("valid flag regex"));

/// Any run of digits.
pub static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit regex"));

/// Digit run at the start of a line, after leading whitespace.
pub static LEADING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]+)").expect("valid leading id regex"));

/// Parenthesized product or locker code such as `(SB-01)`.
pub static BRACKETED_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([A-Z0-9][A-Z0-9/-]*)\)").expect("valid bracketed code regex")
});

/// Build an alternation regex over a closed keyword vocabulary.
///
/// Longer words are tried first so `SUB-STANDARD` wins over `STANDARD`.
pub fn keyword_regex(words: &[&str]) -> Regex {
    Regex::new(&format!(r"\b(?P<word>{})\b", alternation(words))).expect("valid keyword regex")
}

/// Build a rate-then-keyword regex (`4.50 OPEN`).
pub fn rate_keyword_regex(words: &[&str]) -> Regex {
    Regex::new(&format!(
        r"\b(?P<rate>[0-9]{{1,3}}\.[0-9]{{2}})\s+(?P<word>{})\b",
        alternation(words)
    ))
    .expect("valid rate keyword regex")
}

fn alternation(words: &[&str]) -> String {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by_key(|w| std::cmp::Reverse(w.len()));
    sorted
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_keeps_trailing_sign() {
        let found: Vec<&str> = CURRENCY_RE
            .find_iter("  3,987,654.32-   0.00  12,500.00+ 15/03/2018")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["3,987,654.32-", "0.00", "12,500.00+"]);
    }

    #[test]
    fn test_not_applicable_span() {
        let line = "0.00  --N.A--       4.50";
        let m = NOT_APPLICABLE_RE.find(line).unwrap();
        assert_eq!(m.as_str(), "--N.A--");
    }

    #[test]
    fn test_keyword_prefers_longest() {
        let re = keyword_regex(&["STANDARD", "SUB-STANDARD"]);
        let caps = re.captures("8.50 SUB-STANDARD Y").unwrap();
        assert_eq!(&caps["word"], "SUB-STANDARD");
    }

    #[test]
    fn test_rate_keyword() {
        let re = rate_keyword_regex(&["OPEN", "DORMANT UNCLA"]);
        let caps = re.captures("0.00  --N.A--       3.50 DORMANT UNCLA  N").unwrap();
        assert_eq!(&caps["rate"], "3.50");
        assert_eq!(&caps["word"], "DORMANT UNCLA");
    }
}
