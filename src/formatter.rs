//! Field formatter: turns a raw column substring into its normalized form.
//!
//! Formatting never fails. When a value cannot be normalized the trimmed
//! input is returned unchanged, so no data is dropped.

use crate::types::FieldType;
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::LazyLock;

/// Canonical not-applicable date marker.
pub const NOT_APPLICABLE: &str = "--N.A--";

/// Canonical tiered-rate marker.
pub const TIERED: &str = "TIERED";

static AMOUNT_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9][0-9,]*(?:\.[0-9]+)?$").expect("valid amount regex"));

static EMBEDDED_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9,]*\.[0-9]{2}").expect("valid embedded amount regex"));

static DATE_PARTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{4})$").expect("valid date parts regex")
});

static NOT_APPLICABLE_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-*\s*N\s*[./]?\s*A\.?\s*-*$").expect("valid n.a. value regex")
});

static RATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid rate regex"));

static TIERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^TIER").expect("valid tiered regex"));

/// How thousands separators are treated in currency columns.
///
/// Sibling report formats disagree here, so both behaviours are kept as
/// named strategies and each report layout picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrencyStyle {
    /// `1,234.56` becomes `1234.56`.
    #[default]
    StripSeparators,
    /// `1,234.56` stays `1,234.56`; grouping follows the input.
    PreserveSeparators,
}

/// Normalize a raw value with the default currency style.
pub fn format(raw: &str, field_type: FieldType) -> String {
    format_field(raw, field_type, CurrencyStyle::default())
}

/// Normalize a raw value according to its column type.
pub fn format_field(raw: &str, field_type: FieldType, style: CurrencyStyle) -> String {
    match field_type {
        FieldType::Currency => match style {
            CurrencyStyle::StripSeparators => format_currency_strip_separators(raw),
            CurrencyStyle::PreserveSeparators => format_currency_preserve_separators(raw),
        },
        FieldType::Date => format_date(raw),
        FieldType::Percentage => format_percentage(raw),
        FieldType::Flag => format_flag(raw),
        FieldType::Number => format_number(raw),
        FieldType::Text => format_text(raw),
    }
}

/// Fixed-point amount with two decimals and no grouping.
///
/// Trailing `-`/`+` markers become a leading minus (or nothing).
pub fn format_currency_strip_separators(raw: &str) -> String {
    normalize_currency(raw, false)
}

/// Fixed-point amount with two decimals, keeping thousands separators.
pub fn format_currency_preserve_separators(raw: &str) -> String {
    normalize_currency(raw, true)
}

fn normalize_currency(raw: &str, keep_grouping: bool) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(amount) = signed_amount(&compact, keep_grouping) {
        return amount;
    }

    // Recover the first well-formed amount from noisy input
    if let Some(m) = EMBEDDED_AMOUNT_RE.find(&compact) {
        let mut candidate = m.as_str().to_string();
        if compact[m.end()..].starts_with('-') {
            candidate.push('-');
        }
        if let Some(amount) = signed_amount(&candidate, keep_grouping) {
            return amount;
        }
    }

    trimmed.to_string()
}

fn signed_amount(compact: &str, keep_grouping: bool) -> Option<String> {
    let (negative, body) = if let Some(rest) = compact.strip_suffix('-') {
        (true, rest)
    } else if let Some(rest) = compact.strip_suffix('+') {
        (false, rest)
    } else if let Some(rest) = compact.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = compact.strip_prefix('+') {
        (false, rest)
    } else {
        (false, compact)
    };

    if !AMOUNT_BODY_RE.is_match(body) {
        return None;
    }

    let mut amount = Decimal::from_str(&body.replace(',', ""))
        .ok()?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);

    let fixed = amount.to_string();
    let digits = if keep_grouping && body.contains(',') {
        regroup(&fixed, body)
    } else {
        fixed
    };

    if negative && !amount.is_zero() {
        Some(format!("-{digits}"))
    } else {
        Some(digits)
    }
}

/// Re-apply the digit grouping seen in `input` to `fixed`.
///
/// A two-digit middle group marks Indian grouping (`25,00,000`);
/// anything else is grouped in threes.
fn regroup(fixed: &str, input: &str) -> String {
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed, "00"));
    let input_int = input.split('.').next().unwrap_or(input);
    let groups: Vec<&str> = input_int.split(',').collect();
    let indian = groups.len() > 2 && groups[1..groups.len() - 1].iter().any(|g| g.len() == 2);

    let digits: Vec<char> = int_part.chars().collect();
    let mut parts: Vec<String> = Vec::new();
    let mut end = digits.len();
    let mut width = 3;
    while end > 0 {
        let start = end.saturating_sub(width);
        parts.push(digits[start..end].iter().collect());
        end = start;
        if indian {
            width = 2;
        }
    }
    parts.reverse();
    format!("{}.{}", parts.join(","), frac_part)
}

/// Canonical `DD/MM/YYYY` date or the not-applicable sentinel.
///
/// Unrecognized values pass through trimmed.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if NOT_APPLICABLE_VALUE_RE.is_match(trimmed) {
        return NOT_APPLICABLE.to_string();
    }

    if let Some(caps) = DATE_PARTS_RE.captures(trimmed) {
        let day = caps[1].parse::<u32>().ok();
        let month = caps[2].parse::<u32>().ok();
        let year = caps[3].parse::<i32>().ok();
        if let (Some(day), Some(month), Some(year)) = (day, month, year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return date.format("%d/%m/%Y").to_string();
            }
        }
    }

    trimmed.to_string()
}

/// First numeric run of a rate, or the tiered marker.
pub fn format_percentage(raw: &str) -> String {
    let trimmed = raw.trim();
    if TIERED_RE.is_match(trimmed) {
        return TIERED.to_string();
    }
    match RATE_RE.find(trimmed) {
        Some(m) => m.as_str().to_string(),
        None => trimmed.to_string(),
    }
}

/// First `Y`/`N`/`R` letter, uppercased.
pub fn format_flag(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .find(|c| matches!(c, 'Y' | 'N' | 'R'))
        .map(String::from)
        .unwrap_or_else(|| trimmed.to_uppercase())
}

/// First digit run, or the input without whitespace.
pub fn format_number(raw: &str) -> String {
    match crate::patterns::DIGIT_RUN_RE.find(raw) {
        Some(m) => m.as_str().to_string(),
        None => raw.chars().filter(|c| !c.is_whitespace()).collect(),
    }
}

/// Whitespace runs collapsed to single spaces.
pub fn format_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
