//! Bank Report Compare - CLI tool for comparing two runs of the same bank report.

use bank_report_parser::{
    config::Config, filename::detect_report_key, FieldType, ParseResult, ReportKind, ReportParser,
    Result,
};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;

#[derive(Parser)]
#[command(name = "bank_report_compare")]
#[command(about = "Compare two bank reports of the same type row by row", long_about = None)]
struct Cli {
    /// First file path
    #[arg(long = "file1")]
    file1: String,

    /// Second file path
    #[arg(long = "file2")]
    file2: String,

    /// Report type key (detected from the first file name if not provided)
    #[arg(short, long)]
    report: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    pretty_env_logger::init();

    let config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    let key = match cli.report {
        Some(ref report) => report.clone(),
        None => detect_report_key(&cli.file1, &config.filename_rules)?,
    };
    let kind = key.parse::<ReportKind>()?;
    let parser = kind.default_parser(config.parser);

    let report1 = parser.parse(&fs::read_to_string(&cli.file1)?);
    let report2 = parser.parse(&fs::read_to_string(&cli.file2)?);

    let key_columns = parser.layout().required.clone();
    let field_types: Vec<FieldType> = parser.columns().iter().map(|c| c.field_type).collect();

    println!(
        "{}",
        compare_reports(&report1, &report2, &key_columns, &field_types, &cli.file1, &cli.file2)
    );

    Ok(())
}

fn row_key(row: &[String], key_columns: &[usize]) -> String {
    key_columns
        .iter()
        .map(|&index| row.get(index).map_or("", String::as_str))
        .collect::<Vec<_>>()
        .join("/")
}

fn index_rows<'a>(
    report: &'a ParseResult,
    key_columns: &[usize],
) -> BTreeMap<String, &'a Vec<String>> {
    report
        .data
        .iter()
        .map(|row| (row_key(row, key_columns), row))
        .collect()
}

fn compare_reports(
    report1: &ParseResult,
    report2: &ParseResult,
    key_columns: &[usize],
    field_types: &[FieldType],
    name1: &str,
    name2: &str,
) -> String {
    let mut differences = Vec::new();

    if report1.data.len() != report2.data.len() {
        differences.push(format!(
            "Number of rows differs: {} vs {}",
            report1.data.len(),
            report2.data.len()
        ));
    }

    let rows1 = index_rows(report1, key_columns);
    let rows2 = index_rows(report2, key_columns);

    for (key, row1) in &rows1 {
        let Some(row2) = rows2.get(key) else {
            differences.push(format!("Row {} only in {}", key, name1));
            continue;
        };

        for (index, header) in report1.headers.iter().enumerate() {
            let value1 = row1.get(index).map_or("", String::as_str);
            let value2 = row2.get(index).map_or("", String::as_str);
            let same = match field_types.get(index) {
                Some(FieldType::Text) => normalize_string(value1) == normalize_string(value2),
                _ => value1 == value2,
            };
            if !same {
                differences.push(format!(
                    "Row {} {} differs: {} vs {}",
                    key, header, value1, value2
                ));
            }
        }
    }

    for key in rows2.keys().filter(|key| !rows1.contains_key(*key)) {
        differences.push(format!("Row {} only in {}", key, name2));
    }

    if differences.is_empty() {
        format!("The rows in '{}' and '{}' are identical.", name1, name2)
    } else {
        let mut result = String::from("Differences found:\n");
        for diff in differences {
            result.push_str("  - ");
            result.push_str(&diff);
            result.push('\n');
        }
        result
    }
}

fn normalize_string(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}
