//! The concrete PDF backends: WeasyPrint, wkhtmltopdf and pandoc.
//!
//! All three are external programs. Each backend writes its input to a
//! scratch file, runs the program against the job's output path and maps
//! the outcome onto [`BackendError`]: a program that cannot be started is
//! [`BackendError::Unavailable`], a non-zero exit is [`BackendError::Failed`]
//! carrying the tail of its stderr.

use crate::config::{BackendKind, PageGeometry, PdfConfig};
use crate::error::BackendError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

/// Stderr lines kept in a failure message.
const STDERR_TAIL_LINES: usize = 12;

/// What a backend wants to be fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendInput {
    /// The complete HTML document, images referenced by path.
    Html,
    /// The complete HTML document with every local image inlined as base64.
    HtmlInlineImages,
    /// The original Markdown source.
    Markdown,
}

/// Everything a backend needs besides its input text.
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    /// Directory of the source Markdown file; relative references resolve here.
    pub base_dir: &'a Path,
    /// Where the PDF must be written. A scratch file next to the final
    /// destination; the renderer moves it into place on success.
    pub output: &'a Path,
    pub config: &'a PdfConfig,
}

/// One way of turning a worksheet into a PDF.
pub trait PdfBackend {
    /// Short name used in logs and error reports.
    fn name(&self) -> &str;

    /// Installation guidance shown when every backend failed.
    fn install_hint(&self) -> String;

    /// The representation this backend consumes.
    fn input(&self) -> BackendInput;

    /// Render `source` into `job.output`.
    fn render(&self, source: &str, job: &RenderJob<'_>) -> Result<(), BackendError>;
}

/// Instantiate the backends named in `config.backends`, in that order.
pub fn default_backends(config: &PdfConfig) -> Vec<Box<dyn PdfBackend>> {
    config
        .backends
        .iter()
        .map(|kind| -> Box<dyn PdfBackend> {
            match kind {
                BackendKind::WeasyPrint => Box::new(WeasyPrintBackend {
                    program: config.weasyprint_program.clone(),
                }),
                BackendKind::Wkhtmltopdf => Box::new(WkhtmltopdfBackend {
                    program: config.wkhtmltopdf_program.clone(),
                }),
                BackendKind::Pandoc => Box::new(PandocBackend {
                    program: config.pandoc_program.clone(),
                }),
            }
        })
        .collect()
}

// ── WeasyPrint ───────────────────────────────────────────────────────────

/// WeasyPrint lays out the HTML/CSS natively; the preferred backend.
#[derive(Debug, Clone)]
pub struct WeasyPrintBackend {
    pub program: PathBuf,
}

impl PdfBackend for WeasyPrintBackend {
    fn name(&self) -> &str {
        BackendKind::WeasyPrint.name()
    }

    fn install_hint(&self) -> String {
        "weasyprint (מומלץ / recommended): pip install weasyprint".to_string()
    }

    fn input(&self) -> BackendInput {
        BackendInput::Html
    }

    fn render(&self, source: &str, job: &RenderJob<'_>) -> Result<(), BackendError> {
        let input = scratch_file(source, ".html")?;
        let mut cmd = Command::new(&self.program);
        cmd.arg("--encoding")
            .arg("utf-8")
            .arg("--base-url")
            .arg(job.base_dir)
            .arg(input.path())
            .arg(job.output);
        run(cmd, &self.program)
    }
}

// ── wkhtmltopdf ──────────────────────────────────────────────────────────

/// Headless WebKit renderer. Gets its images inline.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfBackend {
    pub program: PathBuf,
}

impl PdfBackend for WkhtmltopdfBackend {
    fn name(&self) -> &str {
        BackendKind::Wkhtmltopdf.name()
    }

    fn install_hint(&self) -> String {
        "wkhtmltopdf: https://wkhtmltopdf.org/downloads.html".to_string()
    }

    fn input(&self) -> BackendInput {
        BackendInput::HtmlInlineImages
    }

    fn render(&self, source: &str, job: &RenderJob<'_>) -> Result<(), BackendError> {
        let input = scratch_file(source, ".html")?;
        let mut cmd = Command::new(&self.program);
        cmd.args(wkhtmltopdf_page_args(&job.config.geometry))
            .args(["--encoding", "UTF-8"])
            .arg("--no-outline")
            .arg("--enable-local-file-access")
            .arg("--quiet")
            .arg(input.path())
            .arg(job.output);
        run(cmd, &self.program)
    }
}

// ── pandoc ───────────────────────────────────────────────────────────────

/// pandoc + a LaTeX engine, fed with the original Markdown.
#[derive(Debug, Clone)]
pub struct PandocBackend {
    pub program: PathBuf,
}

impl PdfBackend for PandocBackend {
    fn name(&self) -> &str {
        BackendKind::Pandoc.name()
    }

    fn install_hint(&self) -> String {
        "pandoc: https://pandoc.org/installing.html (+ TeX עם / with xelatex)".to_string()
    }

    fn input(&self) -> BackendInput {
        BackendInput::Markdown
    }

    fn render(&self, source: &str, job: &RenderJob<'_>) -> Result<(), BackendError> {
        let c = job.config;
        let input = scratch_file(source, ".md")?;
        let mut cmd = Command::new(&self.program);
        // Images in the Markdown are relative to its own directory.
        cmd.current_dir(job.base_dir)
            .arg(input.path())
            .args(["-f", "markdown", "-o"])
            .arg(job.output)
            .arg(format!("--pdf-engine={}", c.pandoc_pdf_engine))
            .arg(format!("--variable=geometry:{}", pandoc_geometry(&c.geometry)))
            .arg(format!("--variable=mainfont:{}", c.main_font))
            .arg("--variable=dir:rtl");
        run(cmd, &self.program)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn wkhtmltopdf_page_args(g: &PageGeometry) -> Vec<String> {
    let cm = |v: f64| format!("{v}cm");
    vec![
        "--page-width".into(),
        cm(g.width_cm),
        "--page-height".into(),
        cm(g.height_cm),
        "--margin-top".into(),
        cm(g.margin_top_cm),
        "--margin-bottom".into(),
        cm(g.margin_bottom_cm),
        "--margin-left".into(),
        cm(g.margin_side_cm),
        "--margin-right".into(),
        cm(g.margin_side_cm),
    ]
}

/// Value of LaTeX's `geometry` package option list.
fn pandoc_geometry(g: &PageGeometry) -> String {
    format!(
        "paperwidth={}cm,paperheight={}cm,top={}cm,bottom={}cm,left={}cm,right={}cm",
        g.width_cm, g.height_cm, g.margin_top_cm, g.margin_bottom_cm, g.margin_side_cm, g.margin_side_cm
    )
}

/// Write `contents` to a self-deleting scratch file with the given suffix.
fn scratch_file(contents: &str, suffix: &str) -> Result<NamedTempFile, BackendError> {
    let mut file = tempfile::Builder::new()
        .prefix("worksheet-")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn run(mut cmd: Command, program: &Path) -> Result<(), BackendError> {
    debug!(
        "Executing {} {}",
        program.display(),
        cmd.get_args()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BackendError::Unavailable {
                program: program.display().to_string(),
                detail: e.to_string(),
            }
        } else {
            BackendError::Io(e)
        }
    })?;

    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(BackendError::Failed(format!(
        "{} exited with {}: {}",
        program.display(),
        output.status,
        stderr_tail(&stderr)
    )))
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
