//! Parser registry: report-type keys mapped to parse functions.

use crate::config::{FilenameRule, ParseOptions};
use crate::diagnostics::DiagnosticSink;
use crate::engine::ReportParser;
use crate::error::{Error, Result};
use crate::filename::detect_report_key;
use crate::types::ParseResult;
use crate::ReportKind;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A registered parse function.
pub type ParseFn = Arc<dyn Fn(&str) -> ParseResult + Send + Sync>;

/// Explicit key-to-parser mapping.
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, ParseFn>,
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.parsers.keys()).finish()
    }
}

impl ParserRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in report type.
    pub fn builtin(options: ParseOptions, sink: Arc<dyn DiagnosticSink>) -> Self {
        let mut registry = Self::new();
        for kind in ReportKind::ALL {
            registry.register(Arc::new(kind.parser(options, Arc::clone(&sink))));
        }
        registry
    }

    /// Register a parse function under a key, replacing any previous one.
    pub fn register_parser<F>(&mut self, key: impl Into<String>, parse: F)
    where
        F: Fn(&str) -> ParseResult + Send + Sync + 'static,
    {
        self.parsers.insert(key.into(), Arc::new(parse));
    }

    /// Register a report parser under its own key.
    pub fn register(&mut self, parser: Arc<dyn ReportParser>) {
        let key = parser.key();
        self.register_parser(key, move |content: &str| parser.parse(content));
    }

    /// Look up the parse function for a key.
    pub fn get_parser(&self, key: &str) -> Option<ParseFn> {
        self.parsers.get(key).cloned()
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    /// Parse with the parser registered under `key`.
    ///
    /// An unknown key is the only error: data problems never fail a parse.
    pub fn parse(&self, key: &str, content: &str) -> Result<ParseResult> {
        let parse = self
            .parsers
            .get(key)
            .ok_or_else(|| Error::UnsupportedParser(key.to_string()))?;
        Ok(parse(content))
    }

    /// Detect the report type from a file name, then parse.
    pub fn parse_named(
        &self,
        path: impl AsRef<Path>,
        content: &str,
        rules: &[FilenameRule],
    ) -> Result<ParseResult> {
        let key = detect_report_key(path, rules)?;
        self.parse(&key, content)
    }
}
