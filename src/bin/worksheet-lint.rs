//! Lint worksheets before they go to print.
//!
//! Exit status is 0 only when every file has zero errors; warnings never
//! fail the run.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use worksheet_kit::{ValidationReport, Validator, ValidatorRules};

/// Check worksheets for structure, writing space, language and leaked solutions.
#[derive(Parser, Debug)]
#[command(
    name = "worksheet-lint",
    version,
    about = "Check Hebrew math worksheets for structure, writing space and leaked solutions",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Markdown worksheets.
    #[arg(required = true)]
    markdown_files: Vec<PathBuf>,

    /// Print reports as JSON instead of text.
    #[arg(long, env = "WORKSHEET_LINT_JSON")]
    json: bool,

    /// Minimum lettered questions before warning.
    #[arg(long, env = "WORKSHEET_MIN_QUESTIONS")]
    min_questions: Option<usize>,

    /// Minimum Hebrew characters before warning.
    #[arg(long, env = "WORKSHEET_MIN_HEBREW")]
    min_hebrew_chars: Option<usize>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WORKSHEET_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, env = "WORKSHEET_QUIET")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ שגיאה / Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `true` when every report is free of errors.
fn run(cli: &Cli) -> Result<bool> {
    let mut rules = ValidatorRules::default();
    if let Some(n) = cli.min_questions {
        rules.min_questions = n;
    }
    if let Some(n) = cli.min_hebrew_chars {
        rules.min_hebrew_chars = n;
    }
    let validator = Validator::new(rules);

    let reports: Vec<ValidationReport> = cli
        .markdown_files
        .iter()
        .map(|f| validator.validate_file(f))
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        let written = match reports.as_slice() {
            [single] => serde_json::to_writer_pretty(&mut out, single),
            all => serde_json::to_writer_pretty(&mut out, all),
        };
        written.context("failed to serialise report")?;
        writeln!(out)?;
    } else {
        for report in &reports {
            write!(out, "{}", report.render_text())?;
        }
    }

    Ok(reports.iter().all(ValidationReport::is_valid))
}
