//! Report type detection from file names.

use crate::config::FilenameRule;
use crate::error::{Error, Result};
use std::path::Path;

/// Built-in `(prefix, registry key)` table.
pub const BUILTIN_RULES: &[(&str, &str)] = &[
    ("deposits_balance_file", "bank-deposits"),
    ("loans_balance_file", "bank-loans"),
    ("loan_balance_file", "bank-loans"),
    ("new_cc_od_balance_file", "new-cc-od-balance"),
    ("cc_od_balance_file", "new-cc-od-balance"),
    ("sdv_locker", "sdv-lockers"),
    ("locker_register", "sdv-lockers"),
    ("gl_balance", "gl-balance-sheet"),
    ("balance_sheet", "gl-balance-sheet"),
];

/// Pick a registry key for a file path.
///
/// `rules` are tried first, then the built-in table. Only the base name
/// of the path is matched.
pub fn detect_report_key(path: impl AsRef<Path>, rules: &[FilenameRule]) -> Result<String> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(rule) = rules.iter().find(|rule| rule.matches(&file_name)) {
        return Ok(rule.report.clone());
    }

    let lower = file_name.to_lowercase();
    BUILTIN_RULES
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
        .map(|(_, key)| key.to_string())
        .ok_or_else(|| Error::UndetectedReport(path.display().to_string()))
}
