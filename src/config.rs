//! Parser options and the TOML configuration file.

use crate::error::Result;
use crate::metadata::DEFAULT_METADATA_LINES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options fixed at parser construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Emit per-line debug diagnostics.
    pub debug: bool,
    /// Keep data-looking lines that lacked required fields.
    pub collect_rejected: bool,
    /// Leading lines scanned for header metadata.
    pub metadata_lines: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            debug: false,
            collect_rejected: false,
            metadata_lines: DEFAULT_METADATA_LINES,
        }
    }
}

/// Maps a file-name prefix to a registry key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameRule {
    /// Case-insensitive prefix of the file's base name.
    pub prefix: String,
    /// Registry key of the report.
    pub report: String,
}

impl FilenameRule {
    pub fn new(prefix: &str, report: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            report: report.to_string(),
        }
    }

    /// Whether a base file name starts with this rule's prefix.
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.to_lowercase().starts_with(&self.prefix.to_lowercase())
    }
}

/// Contents of a configuration file.
///
/// ```toml
/// [parser]
/// debug = true
/// metadata_lines = 12
///
/// [[filename_rules]]
/// prefix = "dep_bal"
/// report = "bank-deposits"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParseOptions,
    /// Consulted before the built-in file-name rules.
    pub filename_rules: Vec<FilenameRule>,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
