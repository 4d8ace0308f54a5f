//! Bank Report Parse - CLI tool for turning a fixed-width bank report into rows.

use bank_report_parser::{
    config::Config,
    diagnostics::{DiagnosticSink, LogSink, MemorySink},
    filename::detect_report_key,
    Error, ParseResult, ParserRegistry, Result,
};
use clap::{ArgAction, Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Tab-separated header and rows
    Table,
}

#[derive(Parser)]
#[command(name = "bank_report_parse")]
#[command(
    about = "Parse fixed-width bank reports (deposits, loans, CC/OD, lockers, GL)",
    long_about = None
)]
struct Cli {
    /// Input file path (or stdin if not provided)
    input: Option<String>,

    /// Report type key (detected from the file name if not provided)
    #[arg(short, long)]
    report: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Keep lines that looked like data but lacked identifiers
    #[arg(long)]
    rejected: bool,

    /// Print parser diagnostics to stderr after the result
    #[arg(long)]
    diagnostics: bool,

    /// Increase log verbosity (-v info, -vv debug with per-line traces)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut options = config.parser;
    options.collect_rejected |= cli.rejected;
    options.debug |= cli.verbose > 1;

    let key = match (&cli.report, &cli.input) {
        (Some(report), _) => report.clone(),
        (None, Some(path)) => detect_report_key(path, &config.filename_rules)?,
        (None, None) => return Err(Error::UndetectedReport("<stdin>".to_string())),
    };

    let content = match cli.input {
        Some(ref path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let memory = Arc::new(MemorySink::new());
    let sink: Arc<dyn DiagnosticSink> = if cli.diagnostics {
        memory.clone() as Arc<dyn DiagnosticSink>
    } else {
        Arc::new(LogSink)
    };

    let registry = ParserRegistry::builtin(options, sink);
    let result = registry.parse(&key, &content)?;
    log::info!("{}: {} rows", key, result.data.len());

    let mut stdout = io::stdout().lock();
    match cli.output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &result)?;
            writeln!(stdout)?;
        }
        OutputFormat::Table => write_table(&mut stdout, &result)?,
    }

    for diagnostic in memory.take() {
        eprintln!("{}", diagnostic);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn write_table<W: Write>(writer: &mut W, result: &ParseResult) -> Result<()> {
    for (key, value) in result.metadata.iter() {
        writeln!(writer, "# {}: {}", key, value)?;
    }
    writeln!(writer, "{}", result.headers.join("\t"))?;
    for row in &result.data {
        writeln!(writer, "{}", row.join("\t"))?;
    }
    for rejected in &result.rejected {
        writeln!(
            writer,
            "# rejected line {} ({}): {}",
            rejected.line_number,
            rejected.reason,
            rejected.text.trim()
        )?;
    }
    if result.is_empty() {
        writeln!(writer, "# no records found")?;
    }
    Ok(())
}
