//! Render one worksheet to PDF.
//!
//! A thin shim over [`worksheet_kit::PdfRenderer`] that maps CLI flags to
//! `PdfConfig` and reports the result in Hebrew and English.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use worksheet_kit::{BackendKind, PdfConfig, PdfRenderer};

const AFTER_HELP: &str = r#"EXAMPLES:
  # PDF next to the source
  worksheet-pdf worksheets/grade-8/kavba_a1_slope_table.md

  # Explicit output
  worksheet-pdf kavba_a1_graph_reading.md out/graph_reading.pdf

  # Only try pandoc, with a different TeX engine
  worksheet-pdf --backend pandoc --pdf-engine lualatex sheet.md

BACKENDS (tried in order until one succeeds):
  weasyprint    pip install weasyprint
  wkhtmltopdf   apt install wkhtmltopdf
  pandoc        apt install pandoc texlive-xetex

ENVIRONMENT VARIABLES:
  WORKSHEET_BACKENDS      Comma-separated backend order
  WORKSHEET_WEASYPRINT    Path to the weasyprint executable
  WORKSHEET_WKHTMLTOPDF   Path to the wkhtmltopdf executable
  WORKSHEET_PANDOC        Path to the pandoc executable
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Convert a Markdown worksheet to an A4 right-to-left PDF.
#[derive(Parser, Debug)]
#[command(
    name = "worksheet-pdf",
    version,
    about = "Convert a Markdown worksheet to an A4 right-to-left PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown worksheet.
    markdown_file: PathBuf,

    /// Output PDF (default: the input with a .pdf extension).
    output_pdf: Option<PathBuf>,

    /// Backend order, e.g. `weasyprint,pandoc`.
    #[arg(long = "backend", env = "WORKSHEET_BACKENDS", value_delimiter = ',')]
    backends: Vec<BackendKind>,

    /// weasyprint executable.
    #[arg(long, env = "WORKSHEET_WEASYPRINT")]
    weasyprint: Option<PathBuf>,

    /// wkhtmltopdf executable.
    #[arg(long, env = "WORKSHEET_WKHTMLTOPDF")]
    wkhtmltopdf: Option<PathBuf>,

    /// pandoc executable.
    #[arg(long, env = "WORKSHEET_PANDOC")]
    pandoc: Option<PathBuf>,

    /// LaTeX engine pandoc should use.
    #[arg(long, env = "WORKSHEET_PDF_ENGINE")]
    pdf_engine: Option<String>,

    /// Main font for the pandoc backend.
    #[arg(long, env = "WORKSHEET_MAIN_FONT")]
    main_font: Option<String>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WORKSHEET_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, env = "WORKSHEET_QUIET")]
    quiet: bool,
}

impl Cli {
    fn pdf_config(&self) -> Result<PdfConfig> {
        let mut builder = PdfConfig::builder();
        if !self.backends.is_empty() {
            builder = builder.backends(self.backends.clone());
        }
        if let Some(p) = &self.weasyprint {
            builder = builder.weasyprint_program(p);
        }
        if let Some(p) = &self.wkhtmltopdf {
            builder = builder.wkhtmltopdf_program(p);
        }
        if let Some(p) = &self.pandoc {
            builder = builder.pandoc_program(p);
        }
        if let Some(engine) = &self.pdf_engine {
            builder = builder.pandoc_pdf_engine(engine);
        }
        if let Some(font) = &self.main_font {
            builder = builder.main_font(font);
        }
        builder.build().context("invalid PDF configuration")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(pdf) => {
            println!("✅ PDF נוצר בהצלחה / PDF created: {}", pdf.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ שגיאה / Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let config = cli.pdf_config()?;
    let renderer = PdfRenderer::new(config);
    tracing::debug!("Backends: {}", renderer.backend_names().join(", "));
    renderer
        .render_file(&cli.markdown_file, cli.output_pdf.as_deref())
        .with_context(|| format!("failed to render {}", cli.markdown_file.display()))
}
