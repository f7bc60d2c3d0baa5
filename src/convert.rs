//! Single-document entry points.
//!
//! Thin wrappers that read a worksheet from disk and run it through the
//! [`crate::pipeline`] stages or the [`crate::pdf`] backend chain. The build
//! orchestration in [`crate::workbook`] and the command-line tools use these
//! rather than the stages directly.

use crate::config::PdfConfig;
use crate::error::WorksheetError;
use crate::pdf::PdfRenderer;
use crate::pipeline::markdown::{markdown_to_html, ConvertOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a worksheet as UTF-8 text.
///
/// # Errors
/// [`WorksheetError::FileNotFound`] when `path` does not exist,
/// [`WorksheetError::ReadFailed`] for any other I/O or encoding failure.
pub fn read_markdown(path: &Path) -> Result<String, WorksheetError> {
    if !path.exists() {
        return Err(WorksheetError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| WorksheetError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Read {} ({} bytes)", path.display(), text.len());
    Ok(text)
}

/// Convert a worksheet file to an HTML body fragment.
pub fn markdown_file_to_html(
    path: &Path,
    options: &ConvertOptions,
) -> Result<String, WorksheetError> {
    let markdown = read_markdown(path)?;
    Ok(markdown_to_html(&markdown, options))
}

/// Render a worksheet to PDF with the default backend chain.
///
/// `output` defaults to `markdown_file` with a `.pdf` extension.
///
/// # Example
/// ```rust,no_run
/// use std::path::Path;
///
/// let pdf = worksheet_kit::generate_pdf(
///     Path::new("worksheets/grade-8/kavba_a1_graph_reading.md"),
///     None,
/// )?;
/// println!("{}", pdf.display());
/// # Ok::<(), worksheet_kit::WorksheetError>(())
/// ```
pub fn generate_pdf(markdown_file: &Path, output: Option<&Path>) -> Result<PathBuf, WorksheetError> {
    generate_pdf_with(markdown_file, output, PdfConfig::default())
}

/// Render a worksheet to PDF with an explicit configuration.
pub fn generate_pdf_with(
    markdown_file: &Path,
    output: Option<&Path>,
    config: PdfConfig,
) -> Result<PathBuf, WorksheetError> {
    PdfRenderer::new(config).render_file(markdown_file, output)
}
