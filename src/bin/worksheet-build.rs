//! Build print-ready workbooks and preview pages from many worksheets.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use worksheet_kit::{
    build_paginated, build_previews, build_simple, BuildProgressCallback, BuildSummary, Manifest,
    PaginationConfig,
};

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar for the whole build, one log line per worksheet.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} worksheets  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Building");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl BuildProgressCallback for CliProgressCallback {
    fn on_build_start(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_document_start(&self, _index: usize, _total: usize, title: &str) {
        self.bar.set_message(title.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, title: &str, pages: usize) {
        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {}  {}",
            green("✓"),
            index,
            total,
            title,
            dim(&format!("{pages} pages")),
        ));
        self.bar.inc(1);
    }

    fn on_document_skipped(&self, index: usize, total: usize, reason: &str) {
        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {}",
            yellow("⚠"),
            index,
            total,
            yellow(reason)
        ));
        self.bar.inc(1);
    }

    fn on_build_complete(&self, documents: usize, pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} worksheets, {} pages",
            green("✔"),
            bold(&documents.to_string()),
            bold(&pages.to_string())
        );
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

/// Combine worksheets into printable HTML workbooks.
#[derive(Parser, Debug)]
#[command(
    name = "worksheet-build",
    version,
    about = "Combine Markdown worksheets into print-ready A4 HTML workbooks",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    #[command(subcommand)]
    command: BuildCommand,

    /// Print the build summary as JSON on stdout.
    #[arg(long, global = true, env = "WORKSHEET_BUILD_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, global = true, env = "WORKSHEET_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "WORKSHEET_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, global = true, env = "WORKSHEET_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum BuildCommand {
    /// Paginated workbook: every worksheet split into A4 sheets.
    All(WorkbookArgs),
    /// One sheet per worksheet, no pagination.
    Simple(WorkbookArgs),
    /// A standalone preview page for every worksheet in a directory.
    Preview {
        /// Directory of Markdown worksheets.
        #[arg(default_value = "worksheets/grade-8")]
        source_dir: PathBuf,
        /// Where preview pages are written.
        #[arg(long, env = "WORKSHEET_PREVIEW_DIR", default_value = "preview_pages/grade-8")]
        output_dir: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct WorkbookArgs {
    /// JSON manifest listing worksheets and titles (default: the grade-8 set).
    #[arg(long, env = "WORKSHEET_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Output HTML file (overrides the manifest).
    #[arg(short, long, env = "WORKSHEET_OUTPUT")]
    output: Option<PathBuf>,

    /// Page length that closes a page at the next section heading.
    #[arg(long, default_value_t = 3000)]
    soft_threshold: usize,

    /// Page length that forces a cut at the last question heading.
    #[arg(long, default_value_t = 8000)]
    hard_threshold: usize,
}

impl WorkbookArgs {
    fn manifest(&self) -> Result<Manifest> {
        let mut manifest = match &self.manifest {
            Some(path) => Manifest::load(path)
                .with_context(|| format!("failed to load manifest {}", path.display()))?,
            None => Manifest::default_grade8(),
        };
        if let Some(output) = &self.output {
            manifest.output = output.clone();
        }
        Ok(manifest)
    }

    fn pagination(&self) -> Result<PaginationConfig> {
        anyhow::ensure!(
            self.soft_threshold < self.hard_threshold,
            "--soft-threshold ({}) must be below --hard-threshold ({})",
            self.soft_threshold,
            self.hard_threshold
        );
        Ok(PaginationConfig {
            soft_threshold: self.soft_threshold,
            hard_threshold: self.hard_threshold,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let progress = show_progress.then(CliProgressCallback::new);
    let callback = progress.as_ref().map(|p| p as &dyn BuildProgressCallback);

    match run(&cli, callback) {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("❌ שגיאה / Error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else if !cli.quiet {
                report(&summary);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(p) = &progress {
                p.bar.finish_and_clear();
            }
            eprintln!("❌ שגיאה / Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, progress: Option<&dyn BuildProgressCallback>) -> Result<BuildSummary> {
    match &cli.command {
        BuildCommand::All(args) => {
            let manifest = args.manifest()?;
            build_paginated(&manifest, &args.pagination()?, progress)
                .with_context(|| format!("failed to build {}", manifest.output.display()))
        }
        BuildCommand::Simple(args) => {
            let manifest = args.manifest()?;
            build_simple(&manifest, progress)
                .with_context(|| format!("failed to build {}", manifest.output.display()))
        }
        BuildCommand::Preview {
            source_dir,
            output_dir,
        } => build_previews(source_dir, output_dir, progress)
            .with_context(|| format!("failed to build previews from {}", source_dir.display())),
    }
}

fn report(summary: &BuildSummary) {
    for path in &summary.skipped {
        println!("⚠️ דולג / Skipped: {}", path.display());
    }
    for output in &summary.outputs {
        println!("✅ נוצר / Created: {}", display(output));
    }
    println!(
        "סה\"כ עמודים / Total pages: {}",
        summary.total_pages()
    );
}

fn display(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
