//! Markdown → PDF through an ordered chain of backends.
//!
//! ## Why a chain?
//!
//! None of the available PDF engines is guaranteed to be installed on a
//! classroom computer, and each one has different strengths (WeasyPrint
//! honours the print CSS, wkhtmltopdf is a single static binary, pandoc
//! typesets math through LaTeX). The renderer tries them in priority order
//! and stops at the first that produces a non-empty PDF. Every failure is
//! kept, so when nothing works the user sees why each engine failed and how
//! to install one.
//!
//! Each backend writes into a scratch file in the destination directory;
//! only a successful, non-empty result is renamed onto the requested path.

pub mod backends;

pub use backends::{default_backends, BackendInput, PdfBackend, RenderJob};

use crate::config::PdfConfig;
use crate::convert::read_markdown;
use crate::error::{BackendError, BackendFailure, WorksheetError};
use crate::pipeline::document::pdf_document;
use crate::pipeline::embed::inline_images;
use crate::pipeline::markdown::{markdown_to_html, ConvertOptions, ImageSources};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Renders worksheets to PDF with a fixed backend chain.
pub struct PdfRenderer {
    config: PdfConfig,
    backends: Vec<Box<dyn PdfBackend>>,
}

impl std::fmt::Debug for PdfRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfRenderer")
            .field("config", &self.config)
            .field("backends", &self.backend_names())
            .finish()
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new(PdfConfig::default())
    }
}

impl PdfRenderer {
    /// A renderer with the external-program backends listed in `config`.
    pub fn new(config: PdfConfig) -> Self {
        let backends = default_backends(&config);
        Self { config, backends }
    }

    /// A renderer with an explicit backend chain.
    pub fn with_backends(config: PdfConfig, backends: Vec<Box<dyn PdfBackend>>) -> Self {
        Self { config, backends }
    }

    pub fn config(&self) -> &PdfConfig {
        &self.config
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Render `markdown_file` to PDF.
    ///
    /// `output` defaults to the input path with a `.pdf` extension. Returns
    /// the path written.
    ///
    /// # Errors
    /// * [`WorksheetError::FileNotFound`] when the input does not exist.
    /// * [`WorksheetError::BackendsExhausted`] when no backend succeeded.
    /// * [`WorksheetError::OutputWriteFailed`] when the destination cannot be
    ///   prepared or the finished PDF cannot be moved into place.
    pub fn render_file(
        &self,
        markdown_file: &Path,
        output: Option<&Path>,
    ) -> Result<PathBuf, WorksheetError> {
        if !markdown_file.exists() {
            return Err(WorksheetError::FileNotFound {
                path: markdown_file.to_path_buf(),
            });
        }
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| markdown_file.with_extension("pdf"));
        info!("Rendering {} → {}", markdown_file.display(), output.display());

        let markdown = read_markdown(markdown_file)?;
        let base_dir = absolute_dir(markdown_file.parent())
            .map_err(|e| WorksheetError::ReadFailed {
                path: markdown_file.to_path_buf(),
                source: e,
            })?;
        let dest_dir = prepare_dest_dir(&output)?;

        let body = markdown_to_html(
            &markdown,
            &ConvertOptions::with_images(ImageSources::ResolveAgainst(base_dir.clone())),
        );
        let html = pdf_document(&body, &self.config);
        let mut inlined: Option<String> = None;

        let mut attempts: Vec<BackendFailure> = Vec::new();
        for backend in &self.backends {
            let source: &str = match backend.input() {
                BackendInput::Html => &html,
                BackendInput::Markdown => &markdown,
                BackendInput::HtmlInlineImages => inlined
                    .get_or_insert_with(|| {
                        let g = &self.config.geometry;
                        inline_images(&html, &base_dir, g.content_width_px(), g.content_width_cm())
                    })
                    .as_str(),
            };

            debug!("Trying PDF backend '{}'", backend.name());
            match self.attempt(backend.as_ref(), source, &base_dir, &dest_dir) {
                Ok(pdf) => {
                    pdf.persist(&output)
                        .map_err(|e| WorksheetError::OutputWriteFailed {
                            path: output.clone(),
                            source: e.error,
                        })?;
                    info!("PDF written with {}: {}", backend.name(), output.display());
                    return Ok(output);
                }
                Err(error) => {
                    warn!("PDF backend '{}' failed: {}", backend.name(), error);
                    attempts.push(BackendFailure {
                        backend: backend.name().to_string(),
                        error,
                    });
                }
            }
        }

        Err(WorksheetError::BackendsExhausted {
            attempts,
            hints: self.backends.iter().map(|b| b.install_hint()).collect(),
        })
    }

    fn attempt(
        &self,
        backend: &dyn PdfBackend,
        source: &str,
        base_dir: &Path,
        dest_dir: &Path,
    ) -> Result<NamedTempFile, BackendError> {
        let scratch = tempfile::Builder::new()
            .prefix(".worksheet-")
            .suffix(".pdf")
            .tempfile_in(dest_dir)?;
        let job = RenderJob {
            base_dir,
            output: scratch.path(),
            config: &self.config,
        };
        backend.render(source, &job)?;

        let size = std::fs::metadata(scratch.path())?.len();
        if size == 0 {
            return Err(BackendError::Failed(
                "הקובץ שנוצר ריק / produced an empty PDF".to_string(),
            ));
        }
        debug!("{} produced {} bytes", backend.name(), size);
        Ok(scratch)
    }
}

fn absolute_dir(dir: Option<&Path>) -> std::io::Result<PathBuf> {
    match dir {
        Some(d) if !d.as_os_str().is_empty() => d.canonicalize(),
        _ => std::env::current_dir(),
    }
}

fn prepare_dest_dir(output: &Path) -> Result<PathBuf, WorksheetError> {
    let write_err = |source| WorksheetError::OutputWriteFailed {
        path: output.to_path_buf(),
        source,
    };
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;
    parent.canonicalize().map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records what it was fed and either writes `payload` or fails.
    struct FakeBackend {
        name: &'static str,
        input: BackendInput,
        payload: Option<&'static [u8]>,
        seen: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl PdfBackend for FakeBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn install_hint(&self) -> String {
            format!("install {}", self.name)
        }

        fn input(&self) -> BackendInput {
            self.input
        }

        fn render(&self, source: &str, job: &RenderJob<'_>) -> Result<(), BackendError> {
            self.seen
                .borrow_mut()
                .push((self.name.to_string(), source.to_string()));
            match self.payload {
                Some(bytes) => {
                    std::fs::write(job.output, bytes)?;
                    Ok(())
                }
                None => Err(BackendError::Failed(format!("{} crashed", self.name))),
            }
        }
    }

    fn fake(
        name: &'static str,
        input: BackendInput,
        payload: Option<&'static [u8]>,
        seen: &Rc<RefCell<Vec<(String, String)>>>,
    ) -> Box<dyn PdfBackend> {
        Box::new(FakeBackend {
            name,
            input,
            payload,
            seen: Rc::clone(seen),
        })
    }

    fn worksheet(dir: &Path) -> PathBuf {
        let md = dir.join("sheet.md");
        std::fs::write(&md, "---\ntitle: t\n---\n# דף עבודה\n\n$y = 3x + 3$\n").unwrap();
        md
    }

    #[test]
    fn missing_input_is_file_not_found() {
        let renderer = PdfRenderer::default();
        let err = renderer
            .render_file(Path::new("no/such/missing.md"), None)
            .unwrap_err();
        assert!(matches!(err, WorksheetError::FileNotFound { .. }));
        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn falls_through_to_first_working_backend() {
        let dir = tempfile::tempdir().unwrap();
        let md = worksheet(dir.path());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let renderer = PdfRenderer::with_backends(
            PdfConfig::default(),
            vec![
                fake("first", BackendInput::Html, None, &seen),
                fake("second", BackendInput::Markdown, Some(b"%PDF-1.7 ok"), &seen),
                fake("third", BackendInput::Html, Some(b"%PDF never"), &seen),
            ],
        );

        let out = renderer.render_file(&md, None).unwrap();
        assert_eq!(out, md.with_extension("pdf"));
        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.7 ok");

        let seen = seen.borrow();
        let names: Vec<&str> = seen.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert!(seen[0].1.contains(r#"<html dir="rtl" lang="he">"#));
        assert!(seen[0].1.contains(r#"<span class="math-inline">$y = 3x + 3$</span>"#));
        assert!(seen[1].1.starts_with("---\ntitle: t"), "markdown backend gets the source");
    }

    #[test]
    fn exhausted_chain_reports_every_backend() {
        let dir = tempfile::tempdir().unwrap();
        let md = worksheet(dir.path());
        let out = dir.path().join("out/result.pdf");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let renderer = PdfRenderer::with_backends(
            PdfConfig::default(),
            vec![
                fake("alpha", BackendInput::Html, None, &seen),
                fake("beta", BackendInput::Markdown, Some(b""), &seen),
            ],
        );

        let err = renderer.render_file(&md, Some(&out)).unwrap_err();
        match &err {
            WorksheetError::BackendsExhausted { attempts, hints } => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].backend, "alpha");
                assert_eq!(attempts[1].backend, "beta");
                assert_eq!(hints, &["install alpha", "install beta"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("alpha crashed"), "got: {msg}");
        assert!(msg.contains("empty PDF"), "got: {msg}");
        assert!(!out.exists(), "no partial PDF may be left behind");

        let leftovers = std::fs::read_dir(out.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 0, "scratch files must be removed");
    }
}
