//! Pattern extraction chain.
//!
//! Real report lines drift from their nominal column layout, so values are
//! located by pattern rather than by offset. A chain is an ordered list of
//! steps; each step fills zero or more empty column slots and records the
//! byte span it consumed. Later steps skip anything overlapping a claimed
//! span, and derived text columns are cut out between resolved spans.
//!
//! Slots left empty by the chain are backfilled positionally by the caller.

use crate::patterns::{
    BRACKETED_CODE_RE, CURRENCY_RE, DATE_RE, DIGIT_RUN_RE, FLAG_RE, LEADING_DIGITS_RE,
    NOT_APPLICABLE_RE,
};
use crate::types::{ColumnSpec, FieldType};
use regex::Regex;
use std::ops::Range;
use thiserror::Error;

/// A value found in a line together with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Raw matched text.
    pub value: String,
    /// Byte range of the match within the line.
    pub span: Range<usize>,
}

impl Slot {
    fn new(value: &str, span: Range<usize>) -> Self {
        Self {
            value: value.to_string(),
            span,
        }
    }
}

/// Which occurrence a keyword step keeps when several match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    First,
    Last,
}

/// Rate column captured together with a keyword (`4.50 OPEN`).
#[derive(Debug, Clone)]
pub struct RateKeyword {
    /// Column receiving the rate.
    pub column: usize,
    /// Pattern with `rate` and `word` groups.
    pub pattern: &'static Regex,
}

/// One extraction step. Column references are indices into the layout.
#[derive(Debug, Clone)]
pub enum Step {
    /// Digit run at line start.
    LeadingId { column: usize, min_digits: usize },
    /// Next distinct digit run after the `after` column's match.
    SecondaryId {
        column: usize,
        after: usize,
        min_digits: usize,
    },
    /// Parenthesized code; the slot value is the code without parentheses.
    BracketedCode { column: usize },
    /// Every date in the line, assigned to empty date columns in order.
    Dates,
    /// Closed-vocabulary keyword, optionally preceded by a rate.
    Keyword {
        column: usize,
        words: &'static Regex,
        rate: Option<RateKeyword>,
        pick: Pick,
    },
    /// Amounts: first matches go to `forward`, and the last match goes to
    /// `trailing` when there are more matches than forward columns.
    Currency {
        forward: Vec<usize>,
        trailing: Option<usize>,
    },
    /// Last single-letter flags, assigned to the last flag columns.
    TrailingFlags,
    /// Text between the end of `after` and the start of `before`.
    DerivedSpan {
        column: usize,
        after: usize,
        before: usize,
    },
}

impl Step {
    /// Short step name used in traces.
    pub fn name(&self) -> &'static str {
        match self {
            Step::LeadingId { .. } => "leading-id",
            Step::SecondaryId { .. } => "secondary-id",
            Step::BracketedCode { .. } => "bracketed-code",
            Step::Dates => "dates",
            Step::Keyword { .. } => "keyword",
            Step::Currency { .. } => "currency",
            Step::TrailingFlags => "trailing-flags",
            Step::DerivedSpan { .. } => "derived-span",
        }
    }
}

/// Failure of a chain on one line. The caller falls back to a full
/// positional parse of that line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("{step} step refers to column {column} but the layout has {count} columns")]
    UnknownColumn {
        step: &'static str,
        column: usize,
        count: usize,
    },
    #[error("{step} step produced span {start}..{end} outside the line")]
    InvalidSpan {
        step: &'static str,
        start: usize,
        end: usize,
    },
}

/// Ordered extraction steps for one report layout.
#[derive(Debug, Clone, Default)]
pub struct ExtractionChain {
    steps: Vec<Step>,
}

impl ExtractionChain {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Run the chain over a line.
    ///
    /// The result has one entry per column; `None` means no step placed a
    /// value there.
    pub fn extract(
        &self,
        line: &str,
        columns: &[ColumnSpec],
    ) -> Result<Vec<Option<Slot>>, ChainError> {
        self.extract_with(line, columns, |_, _, _| {})
    }

    /// Run the chain, reporting every filled slot as `(step, column, value)`.
    pub fn extract_with<F>(
        &self,
        line: &str,
        columns: &[ColumnSpec],
        mut on_fill: F,
    ) -> Result<Vec<Option<Slot>>, ChainError>
    where
        F: FnMut(&'static str, usize, &str),
    {
        let mut slots: Vec<Option<Slot>> = vec![None; columns.len()];
        for step in &self.steps {
            let before: Vec<bool> = slots.iter().map(Option::is_some).collect();
            apply(step, line, columns, &mut slots)?;
            for (index, slot) in slots.iter().enumerate() {
                if let (false, Some(slot)) = (before[index], slot) {
                    on_fill(step.name(), index, &slot.value);
                }
            }
        }
        Ok(slots)
    }
}

fn apply(
    step: &Step,
    line: &str,
    columns: &[ColumnSpec],
    slots: &mut [Option<Slot>],
) -> Result<(), ChainError> {
    let name = step.name();
    match step {
        Step::LeadingId { column, min_digits } => {
            check_column(name, *column, slots.len())?;
            if slots[*column].is_some() {
                return Ok(());
            }
            if let Some(m) = LEADING_DIGITS_RE.captures(line).and_then(|caps| caps.get(1)) {
                if m.as_str().chars().count() >= *min_digits {
                    slots[*column] = Some(Slot::new(m.as_str(), m.range()));
                }
            }
        }

        Step::SecondaryId {
            column,
            after,
            min_digits,
        } => {
            check_column(name, *column, slots.len())?;
            check_column(name, *after, slots.len())?;
            if slots[*column].is_some() {
                return Ok(());
            }
            let Some(anchor) = slots[*after].clone() else {
                return Ok(());
            };
            let rest = line.get(anchor.span.end..).ok_or(ChainError::InvalidSpan {
                step: name,
                start: anchor.span.end,
                end: line.len(),
            })?;
            let found = DIGIT_RUN_RE
                .find_iter(rest)
                .map(|m| (m.as_str(), anchor.span.end + m.start()..anchor.span.end + m.end()))
                .find(|(value, span)| {
                    value.chars().count() >= *min_digits
                        && *value != anchor.value
                        && !is_claimed(slots, span)
                });
            if let Some((value, span)) = found {
                slots[*column] = Some(Slot::new(value, span));
            }
        }

        Step::BracketedCode { column } => {
            check_column(name, *column, slots.len())?;
            if slots[*column].is_some() {
                return Ok(());
            }
            let found = BRACKETED_CODE_RE.captures_iter(line).find_map(|caps| {
                let whole = caps.get(0)?;
                let code = caps.get(1)?;
                (!is_claimed(slots, &whole.range()))
                    .then(|| Slot::new(code.as_str(), whole.range()))
            });
            if found.is_some() {
                slots[*column] = found;
            }
        }

        Step::Dates => {
            let targets = empty_columns_of(columns, slots, FieldType::Date);
            if targets.is_empty() {
                return Ok(());
            }
            let mut found = unclaimed_matches(&DATE_RE, line, slots);
            if found.len() < targets.len() {
                found.extend(unclaimed_matches(&NOT_APPLICABLE_RE, line, slots));
                found.sort_by_key(|slot| slot.span.start);
            }
            for (column, slot) in targets.into_iter().zip(found) {
                slots[column] = Some(slot);
            }
        }

        Step::Keyword {
            column,
            words,
            rate,
            pick,
        } => {
            check_column(name, *column, slots.len())?;
            if slots[*column].is_some() {
                return Ok(());
            }

            if let Some(rate) = rate {
                check_column(name, rate.column, slots.len())?;
                if slots[rate.column].is_none() {
                    let candidates: Vec<(Slot, Slot)> = rate
                        .pattern
                        .captures_iter(line)
                        .filter_map(|caps| {
                            let whole = caps.get(0)?;
                            let rate = caps.name("rate")?;
                            let word = caps.name("word")?;
                            (!is_claimed(slots, &whole.range())).then(|| {
                                (
                                    Slot::new(rate.as_str(), rate.range()),
                                    Slot::new(word.as_str(), word.range()),
                                )
                            })
                        })
                        .collect();
                    if let Some((rate_slot, word_slot)) = choose(candidates, *pick) {
                        slots[rate.column] = Some(rate_slot);
                        slots[*column] = Some(word_slot);
                        return Ok(());
                    }
                }
            }

            let candidates: Vec<Slot> = words
                .captures_iter(line)
                .filter_map(|caps| {
                    let word = caps.name("word").or_else(|| caps.get(0))?;
                    (!is_claimed(slots, &word.range()))
                        .then(|| Slot::new(word.as_str(), word.range()))
                })
                .collect();
            if let Some(slot) = choose(candidates, *pick) {
                slots[*column] = Some(slot);
            }
        }

        Step::Currency { forward, trailing } => {
            for column in forward.iter().chain(trailing.iter()) {
                check_column(name, *column, slots.len())?;
            }
            let mut found = unclaimed_matches(&CURRENCY_RE, line, slots);
            if let Some(trailing) = trailing {
                if found.len() > forward.len() {
                    if let Some(last) = found.pop() {
                        fill(slots, *trailing, last);
                    }
                }
            }
            for (column, slot) in forward.iter().zip(found) {
                fill(slots, *column, slot);
            }
        }

        Step::TrailingFlags => {
            let targets = empty_columns_of(columns, slots, FieldType::Flag);
            let found = unclaimed_matches(&FLAG_RE, line, slots);
            let count = targets.len().min(found.len());
            let targets = &targets[targets.len() - count..];
            let found = &found[found.len() - count..];
            for (column, slot) in targets.iter().zip(found) {
                slots[*column] = Some(slot.clone());
            }
        }

        Step::DerivedSpan { column, after, before } => {
            check_column(name, *column, slots.len())?;
            check_column(name, *after, slots.len())?;
            check_column(name, *before, slots.len())?;
            if slots[*column].is_some() {
                return Ok(());
            }
            let (Some(left), Some(right)) = (&slots[*after], &slots[*before]) else {
                return Ok(());
            };
            let (start, end) = (left.span.end, right.span.start);
            if start >= end {
                return Ok(());
            }
            let text = line.get(start..end).ok_or(ChainError::InvalidSpan {
                step: name,
                start,
                end,
            })?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(());
            }
            let offset = start + (text.len() - text.trim_start().len());
            slots[*column] = Some(Slot::new(trimmed, offset..offset + trimmed.len()));
        }
    }
    Ok(())
}

fn check_column(step: &'static str, column: usize, count: usize) -> Result<(), ChainError> {
    if column < count {
        Ok(())
    } else {
        Err(ChainError::UnknownColumn { step, column, count })
    }
}

fn fill(slots: &mut [Option<Slot>], column: usize, slot: Slot) {
    if slots[column].is_none() {
        slots[column] = Some(slot);
    }
}

fn choose<T>(mut candidates: Vec<T>, pick: Pick) -> Option<T> {
    match pick {
        Pick::First if !candidates.is_empty() => Some(candidates.remove(0)),
        Pick::First => None,
        Pick::Last => candidates.pop(),
    }
}

fn is_claimed(slots: &[Option<Slot>], span: &Range<usize>) -> bool {
    slots
        .iter()
        .flatten()
        .any(|slot| slot.span.start < span.end && span.start < slot.span.end)
}

fn unclaimed_matches(pattern: &Regex, line: &str, slots: &[Option<Slot>]) -> Vec<Slot> {
    pattern
        .find_iter(line)
        .filter(|m| !is_claimed(slots, &m.range()))
        .map(|m| Slot::new(m.as_str(), m.range()))
        .collect()
}

fn empty_columns_of(
    columns: &[ColumnSpec],
    slots: &[Option<Slot>],
    field_type: FieldType,
) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(index, column)| {
            column.field_type == field_type && slots.get(*index).is_some_and(Option::is_none)
        })
        .map(|(index, _)| index)
        .collect()
}
