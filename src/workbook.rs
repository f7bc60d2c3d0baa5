//! Workbook builds: many worksheets into one printable document, and static
//! per-worksheet preview pages.
//!
//! Three builds share the same conversion stage:
//!
//! | Build | Pagination | Output |
//! |-------|------------|--------|
//! | [`build_paginated`] | [`paginate`] per worksheet | one HTML file of `.a4-page` sheets |
//! | [`build_simple`]    | none, one sheet per worksheet | one HTML file |
//! | [`build_previews`]  | none | `<output_dir>/<stem>.html` per worksheet |
//!
//! Workbook pages live one directory below the worksheet root, so image
//! paths get a `../` prefix; preview pages live two below and get `../../`.

use crate::convert::read_markdown;
use crate::error::WorksheetError;
use crate::output::{write_atomic, BuildSummary, DocumentSummary};
use crate::pipeline::document::{a4_sheet, preview_document, titled_sheet, workbook_document};
use crate::pipeline::markdown::{markdown_to_html, ConvertOptions, ImageSources};
use crate::pipeline::paginate::{paginate_with, PaginationConfig};
use crate::progress::BuildProgressCallback;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One worksheet in a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetEntry {
    /// Markdown source.
    pub file: PathBuf,
    /// Banner title for its pages.
    pub title: String,
}

/// Which worksheets go into a workbook, in order, and where it is written.
///
/// ```json
/// {
///   "output": "all_worksheets.html",
///   "worksheets": [
///     { "file": "worksheets/grade-8/kavba_a1_slope_table.md",
///       "title": "משמעות השיפוע באמצעות טבלת ערכים" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub worksheets: Vec<WorksheetEntry>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("all_worksheets.html")
}

impl Manifest {
    /// The grade-8 linear-function workbook.
    pub fn default_grade8() -> Self {
        let entry = |file: &str, title: &str| WorksheetEntry {
            file: Path::new("worksheets/grade-8").join(file),
            title: title.to_string(),
        };
        Self {
            worksheets: vec![
                entry("kavba_a1_graph_reading.md", "קריאת גרף תנועה - מרחק וזמן"),
                entry("kavba_a1_slope_table.md", "משמעות השיפוע באמצעות טבלת ערכים"),
                entry(
                    "kavba_a1_50_questions_coefficients.md",
                    "50 שאלות על מקדמים בפונקציה קווית",
                ),
            ],
            output: default_output(),
        }
    }

    /// Load a JSON manifest. Relative paths inside it are resolved against
    /// the manifest's own directory.
    pub fn load(path: &Path) -> Result<Self, WorksheetError> {
        let text = read_markdown(path)?;
        let mut manifest: Manifest =
            serde_json::from_str(&text).map_err(|e| WorksheetError::Manifest {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        if manifest.worksheets.is_empty() {
            return Err(WorksheetError::Manifest {
                path: path.to_path_buf(),
                detail: "no worksheets listed".to_string(),
            });
        }
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            manifest.rebase(base);
        }
        Ok(manifest)
    }

    /// Resolve relative paths against `base`.
    pub fn rebase(&mut self, base: &Path) {
        for entry in &mut self.worksheets {
            if entry.file.is_relative() {
                entry.file = base.join(&entry.file);
            }
        }
        if self.output.is_relative() {
            self.output = base.join(&self.output);
        }
    }
}

/// Convert, paginate and wrap every manifest entry into one A4 workbook.
///
/// Entries whose file is missing are skipped with a warning and listed in
/// [`BuildSummary::skipped`].
pub fn build_paginated(
    manifest: &Manifest,
    pagination: &PaginationConfig,
    progress: Option<&dyn BuildProgressCallback>,
) -> Result<BuildSummary, WorksheetError> {
    let options = ConvertOptions::default();
    let mut summary = BuildSummary::default();
    let mut sheets = String::new();

    for_each_entry(manifest, progress, &mut summary, |entry, markdown| {
        let body = markdown_to_html(markdown, &options);
        let pages = paginate_with(&body, &entry.title, pagination);
        for page in &pages {
            sheets.push_str(&a4_sheet(&page.html));
        }
        pages.len()
    })?;

    write_atomic(&manifest.output, workbook_document(&sheets).as_bytes())?;
    finish(manifest.output.clone(), summary, progress)
}

/// Like [`build_paginated`] but one sheet per worksheet, titled, with the
/// worksheet's own leading `<h1>` removed.
pub fn build_simple(
    manifest: &Manifest,
    progress: Option<&dyn BuildProgressCallback>,
) -> Result<BuildSummary, WorksheetError> {
    let options = ConvertOptions::default();
    let mut summary = BuildSummary::default();
    let mut sheets = String::new();

    for_each_entry(manifest, progress, &mut summary, |entry, markdown| {
        let body = markdown_to_html(markdown, &options);
        sheets.push_str(&titled_sheet(&entry.title, strip_leading_h1(&body)));
        1
    })?;

    write_atomic(&manifest.output, workbook_document(&sheets).as_bytes())?;
    finish(manifest.output.clone(), summary, progress)
}

/// Write `<output_dir>/<stem>.html` for every `*.md` in `source_dir`,
/// in file-name order.
pub fn build_previews(
    source_dir: &Path,
    output_dir: &Path,
    progress: Option<&dyn BuildProgressCallback>,
) -> Result<BuildSummary, WorksheetError> {
    let read_err = |e| WorksheetError::ReadFailed {
        path: source_dir.to_path_buf(),
        source: e,
    };
    let mut sources: Vec<PathBuf> = std::fs::read_dir(source_dir)
        .map_err(read_err)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    sources.sort();

    let total = sources.len();
    if let Some(cb) = progress {
        cb.on_build_start(total);
    }

    let options = ConvertOptions::with_images(ImageSources::Keep);
    let mut summary = BuildSummary::default();
    for (i, source) in sources.iter().enumerate() {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(cb) = progress {
            cb.on_document_start(i + 1, total, &stem);
        }

        let markdown = read_markdown(source)?;
        let body = markdown_to_html(&markdown, &options).replace(r#"src="assets/"#, r#"src="../../assets/"#);
        let out = output_dir.join(format!("{stem}.html"));
        write_atomic(&out, preview_document(&stem, &body).as_bytes())?;
        info!("Created preview: {}", out.display());

        if let Some(cb) = progress {
            cb.on_document_complete(i + 1, total, &stem, 1);
        }
        summary.outputs.push(out);
        summary.documents.push(DocumentSummary {
            source: source.clone(),
            title: stem,
            pages: 1,
        });
    }

    if let Some(cb) = progress {
        cb.on_build_complete(summary.documents.len(), summary.total_pages());
    }
    Ok(summary)
}

/// Drive `convert` over the manifest, recording skips and page counts.
fn for_each_entry<F>(
    manifest: &Manifest,
    progress: Option<&dyn BuildProgressCallback>,
    summary: &mut BuildSummary,
    mut convert: F,
) -> Result<(), WorksheetError>
where
    F: FnMut(&WorksheetEntry, &str) -> usize,
{
    let total = manifest.worksheets.len();
    if let Some(cb) = progress {
        cb.on_build_start(total);
    }

    for (i, entry) in manifest.worksheets.iter().enumerate() {
        if !entry.file.exists() {
            warn!("{} not found, skipping", entry.file.display());
            if let Some(cb) = progress {
                cb.on_document_skipped(i + 1, total, &format!("{} not found", entry.file.display()));
            }
            summary.skipped.push(entry.file.clone());
            continue;
        }

        if let Some(cb) = progress {
            cb.on_document_start(i + 1, total, &entry.title);
        }
        info!("Processing: {}", entry.title);
        let markdown = read_markdown(&entry.file)?;
        let pages = convert(entry, &markdown);

        if let Some(cb) = progress {
            cb.on_document_complete(i + 1, total, &entry.title, pages);
        }
        summary.documents.push(DocumentSummary {
            source: entry.file.clone(),
            title: entry.title.clone(),
            pages,
        });
    }
    Ok(())
}

fn finish(
    output: PathBuf,
    mut summary: BuildSummary,
    progress: Option<&dyn BuildProgressCallback>,
) -> Result<BuildSummary, WorksheetError> {
    info!(
        "Created {} ({} pages)",
        output.display(),
        summary.total_pages()
    );
    if let Some(cb) = progress {
        cb.on_build_complete(summary.documents.len(), summary.total_pages());
    }
    summary.outputs.push(output);
    Ok(summary)
}

/// Drop a leading `<h1>…</h1>` so the sheet title is not printed twice.
fn strip_leading_h1(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.starts_with("<h1>") {
        if let Some(end) = trimmed.find("</h1>") {
            return trimmed[end + "</h1>".len()..].trim();
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn default_manifest_lists_grade8_sheets() {
        let m = Manifest::default_grade8();
        assert_eq!(m.worksheets.len(), 3);
        assert_eq!(
            m.worksheets[1].file,
            PathBuf::from("worksheets/grade-8/kavba_a1_slope_table.md")
        );
        assert_eq!(m.output, PathBuf::from("all_worksheets.html"));
    }

    #[test]
    fn manifest_paths_resolve_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "book.json",
            r#"{"worksheets": [{"file": "a.md", "title": "א"}]}"#,
        );
        let m = Manifest::load(&path).unwrap();
        assert_eq!(m.worksheets[0].file, dir.path().join("a.md"));
        assert_eq!(m.output, dir.path().join("all_worksheets.html"));
    }

    #[test]
    fn bad_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.json", "{ not json");
        assert!(matches!(
            Manifest::load(&path),
            Err(WorksheetError::Manifest { .. })
        ));
        let empty = write(dir.path(), "empty.json", r#"{"worksheets": []}"#);
        assert!(Manifest::load(&empty).is_err());
    }

    #[test]
    fn paginated_build_skips_missing_and_counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let long = format!(
            "# ארוך\n\n{}",
            (0..12)
                .map(|i| format!("### ({i})\n\n{}\n\n", "מלל ".repeat(200)))
                .collect::<String>()
        );
        write(dir.path(), "short.md", "---\nx: 1\n---\n# קצר\n\n![g](assets/g.png)\n");
        write(dir.path(), "long.md", &long);
        let manifest = Manifest {
            worksheets: vec![
                WorksheetEntry {
                    file: dir.path().join("short.md"),
                    title: "קצר".into(),
                },
                WorksheetEntry {
                    file: dir.path().join("gone.md"),
                    title: "חסר".into(),
                },
                WorksheetEntry {
                    file: dir.path().join("long.md"),
                    title: "ארוך".into(),
                },
            ],
            output: dir.path().join("out/all.html"),
        };

        let summary = build_paginated(&manifest, &PaginationConfig::default(), None).unwrap();
        assert_eq!(summary.skipped, vec![dir.path().join("gone.md")]);
        assert_eq!(summary.documents.len(), 2);
        assert_eq!(summary.documents[0].pages, 1);
        assert!(summary.documents[1].pages > 1);

        let html = std::fs::read_to_string(&manifest.output).unwrap();
        assert_eq!(
            html.matches(r#"<div class="a4-page">"#).count(),
            summary.total_pages()
        );
        assert!(html.contains(r#"src="../assets/g.png""#));
        assert!(html.contains("ארוך (המשך - דף 1)"));
        assert!(!html.contains("x: 1"));
    }

    #[test]
    fn simple_build_removes_duplicate_title() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "# כותרת המקור\n\nתוכן");
        let manifest = Manifest {
            worksheets: vec![WorksheetEntry {
                file: dir.path().join("a.md"),
                title: "כותרת".into(),
            }],
            output: dir.path().join("simple.html"),
        };
        let summary = build_simple(&manifest, None).unwrap();
        assert_eq!(summary.total_pages(), 1);
        let html = std::fs::read_to_string(dir.path().join("simple.html")).unwrap();
        assert!(!html.contains("כותרת המקור"));
        assert!(html.contains(">כותרת</h1><p>תוכן</p>"));
    }

    #[test]
    fn previews_are_written_per_file_in_order() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(src.path(), "b.md", "# B\n\n![g](assets/graphs/g.png)");
        write(src.path(), "a.md", "# A");
        write(src.path(), "notes.txt", "ignored");

        let summary = build_previews(src.path(), out.path(), None).unwrap();
        let titles: Vec<&str> = summary.documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);

        let b = std::fs::read_to_string(out.path().join("b.html")).unwrap();
        assert!(b.contains(r#"src="../../assets/graphs/g.png""#));
        assert!(!out.path().join("notes.html").exists());
    }

    #[test]
    fn strip_leading_h1_only_at_start() {
        assert_eq!(strip_leading_h1("<h1>T</h1>\n<p>x</p>"), "<p>x</p>");
        assert_eq!(strip_leading_h1("<p>x</p><h1>T</h1>"), "<p>x</p><h1>T</h1>");
    }
}
