//! Build artefacts: atomic file writes and serialisable run summaries.
//!
//! ## Why atomic writes?
//!
//! A workbook or PDF that is half-written when a build is interrupted looks
//! valid to a browser or a printer queue. Every artefact is therefore written
//! to a temporary file in the destination directory and renamed into place,
//! so readers see either the previous file or the complete new one.

use crate::error::WorksheetError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `bytes` to `path` atomically, creating parent directories.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WorksheetError> {
    let write_err = |source: std::io::Error| WorksheetError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes → {}", bytes.len(), path.display());
    Ok(())
}

/// One worksheet as it landed in a build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Source Markdown file.
    pub source: PathBuf,
    /// Title used for banners (or the file stem for previews).
    pub title: String,
    /// A4 sheets produced for this worksheet.
    pub pages: usize,
}

/// Result of a workbook or preview build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Files written by the build.
    pub outputs: Vec<PathBuf>,
    /// Worksheets included, in output order.
    pub documents: Vec<DocumentSummary>,
    /// Manifest entries whose source file did not exist.
    pub skipped: Vec<PathBuf>,
}

impl BuildSummary {
    /// Total A4 sheets across all documents.
    pub fn total_pages(&self) -> usize {
        self.documents.iter().map(|d| d.pages).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.html");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name() != "out.html")
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind");
    }

    #[test]
    fn summary_totals_and_serialises() {
        let summary = BuildSummary {
            outputs: vec!["all_worksheets.html".into()],
            documents: vec![
                DocumentSummary {
                    source: "a.md".into(),
                    title: "א".into(),
                    pages: 2,
                },
                DocumentSummary {
                    source: "b.md".into(),
                    title: "ב".into(),
                    pages: 3,
                },
            ],
            skipped: vec![],
        };
        assert_eq!(summary.total_pages(), 5);
        let json = serde_json::to_string(&summary).unwrap();
        let back: BuildSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
