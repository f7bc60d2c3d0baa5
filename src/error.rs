//! Error types for the worksheet-kit library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`WorksheetError`]: **Fatal**: the operation cannot produce its artefact
//!   (missing input, unwritable output, a graph that fails verification, every
//!   PDF backend exhausted). Returned as `Err(WorksheetError)`.
//!
//! * [`BackendError`]: **Non-fatal**: a single PDF backend failed (binary not
//!   installed, renderer crashed) but the next backend in the chain may still
//!   succeed. Collected into [`BackendFailure`] records and only surfaced,
//!   all together, inside [`WorksheetError::BackendsExhausted`].
//!
//! Validation findings are neither: they are plain values inside
//! [`crate::validate::ValidationReport`].
//!
//! Display strings are bilingual (Hebrew first, English second) because they
//! are shown verbatim by the command-line tools.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the worksheet-kit library.
#[derive(Debug, Error)]
pub enum WorksheetError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("קובץ לא נמצא / File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The input exists but could not be read as UTF-8 text.
    #[error("שגיאה בקריאת קובץ / Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("שגיאה בכתיבת קובץ / Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Graph errors ──────────────────────────────────────────────────────
    /// The graph specification cannot be drawn (no points, mismatched labels…).
    #[error("הגדרת גרף לא תקינה / Invalid graph spec: {0}")]
    InvalidGraphSpec(String),

    /// Rasterising the graph scene failed before anything was written.
    #[error("שגיאה ביצירת הגרף / Graph rasterisation failed: {0}")]
    GraphRasterFailed(String),

    /// The written graph image failed post-render verification.
    ///
    /// The file may still exist on disk; callers must treat it as invalid.
    #[error(
        "בדיקת הגרף נכשלה / Graph verification failed for '{path}': {}",
        .errors.join(", ")
    )]
    GraphVerificationFailed { path: PathBuf, errors: Vec<String> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// Every configured PDF backend failed; each attempt is listed.
    #[error("{}", render_exhausted(.attempts, .hints))]
    BackendsExhausted {
        attempts: Vec<BackendFailure>,
        hints: Vec<String>,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("הגדרות לא תקינות / Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A workbook manifest could not be parsed.
    #[error("שגיאה בקובץ הרשימה / Invalid manifest '{path}': {detail}")]
    Manifest { path: PathBuf, detail: String },
}

/// A non-fatal failure of one PDF backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend's external program could not be started.
    #[error("לא מותקן / not installed ({program}): {detail}")]
    Unavailable { program: String, detail: String },

    /// The backend ran but reported a failure.
    #[error("{0}")]
    Failed(String),

    /// Preparing input or collecting output for the backend failed.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// One failed attempt in the PDF backend chain.
#[derive(Debug)]
pub struct BackendFailure {
    /// Backend name, e.g. `weasyprint`.
    pub backend: String,
    /// Why it failed.
    pub error: BackendError,
}

impl fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (שגיאה / error: {})", self.backend, self.error)
    }
}

fn render_exhausted(attempts: &[BackendFailure], hints: &[String]) -> String {
    let mut msg = String::from(
        "לא נמצא מנוע PDF זמין או תקין / No working PDF backend was found.\n",
    );
    if !attempts.is_empty() {
        msg.push_str("ניסיתי / Tried:\n");
        for attempt in attempts {
            msg.push_str(&format!("- {attempt}\n"));
        }
    }
    msg.push_str("\nאנא התקן אחד מהכלים / Please install one of:\n");
    for hint in hints {
        msg.push_str(&format!("- {hint}\n"));
    }
    msg.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_mentions_path() {
        let e = WorksheetError::FileNotFound {
            path: PathBuf::from("missing.md"),
        };
        assert!(e.to_string().contains("missing.md"));
    }

    #[test]
    fn exhausted_lists_every_backend_and_hint() {
        let e = WorksheetError::BackendsExhausted {
            attempts: vec![
                BackendFailure {
                    backend: "weasyprint".into(),
                    error: BackendError::Unavailable {
                        program: "weasyprint".into(),
                        detail: "No such file or directory".into(),
                    },
                },
                BackendFailure {
                    backend: "pandoc".into(),
                    error: BackendError::Failed("xelatex not found".into()),
                },
            ],
            hints: vec![
                "weasyprint: pip install weasyprint".into(),
                "pandoc: https://pandoc.org/installing.html".into(),
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("- weasyprint (שגיאה / error:"), "got: {msg}");
        assert!(msg.contains("xelatex not found"), "got: {msg}");
        assert!(msg.contains("pip install weasyprint"), "got: {msg}");
        assert!(msg.contains("pandoc.org"), "got: {msg}");
    }

    #[test]
    fn verification_joins_errors() {
        let e = WorksheetError::GraphVerificationFailed {
            path: PathBuf::from("g.png"),
            errors: vec!["too small".into(), "not PNG".into()],
        };
        assert!(e.to_string().contains("too small, not PNG"));
    }
}
