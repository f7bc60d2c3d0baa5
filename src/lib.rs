//! # worksheet-kit
//!
//! Build printable Hebrew (right-to-left) mathematics worksheets from
//! Markdown.
//!
//! ## Why this crate?
//!
//! Worksheets are written as Markdown with inline `$…$` and display `$$…$$`
//! math. Getting them onto paper needs several things that generic Markdown
//! tools get wrong for RTL text: the `dir="rtl"` shell, Hebrew font stacks,
//! math that survives the Markdown pass untouched, A4 page breaks that fall
//! on question boundaries, and graphs drawn large enough to read after
//! printing. This crate handles each of those as a separate stage.
//!
//! ## Components
//!
//! ```text
//! worksheet.md
//!  │
//!  ├─ validate   structural lint (question count, no solutions, writing space)
//!  ├─ pipeline   Markdown → HTML body, math protection, image paths
//!  │   ├─ paginate  body → A4 page fragments
//!  │   └─ embed     local images → base64 data URIs
//!  ├─ pdf        HTML/Markdown → PDF via the first working external backend
//!  ├─ workbook   many worksheets → one print-ready HTML workbook, previews
//!  └─ graph      GraphSpec → high-DPI PNG, verified on disk
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use worksheet_kit::{generate_pdf, validate_file};
//!
//! let sheet = Path::new("worksheets/grade-8/kavba_a1_slope_table.md");
//! let report = validate_file(sheet);
//! if report.is_valid() {
//!     let pdf = generate_pdf(sheet, None)?;
//!     println!("{}", pdf.display());
//! }
//! # Ok::<(), worksheet_kit::WorksheetError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `worksheet-*` binaries (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! worksheet-kit = { version = "0.3", default-features = false }
//! ```
//!
//! ## PDF backends
//!
//! | Backend | Input | Notes |
//! |---------|-------|-------|
//! | `weasyprint`  | HTML | best CSS paged-media support; tried first |
//! | `wkhtmltopdf` | HTML with images inlined | page size and margins passed as flags |
//! | `pandoc`      | Markdown | needs a LaTeX engine with Hebrew fonts |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod graph;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod validate;
pub mod workbook;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BackendKind, PageGeometry, PdfConfig, PdfConfigBuilder, PX_PER_CM};
pub use convert::{generate_pdf, generate_pdf_with, markdown_file_to_html, read_markdown};
pub use error::{BackendError, BackendFailure, WorksheetError};
pub use graph::{GraphRenderer, GraphSpec, GraphStyle};
pub use output::{write_atomic, BuildSummary, DocumentSummary};
pub use pdf::{PdfBackend, PdfRenderer};
pub use pipeline::markdown::{markdown_to_html, ConvertOptions, ImageSources};
pub use pipeline::paginate::{paginate, PageFragment, PaginationConfig};
pub use progress::{BuildProgressCallback, NoopProgressCallback};
pub use validate::{validate_file, ValidationReport, Validator, ValidatorRules};
pub use workbook::{build_paginated, build_previews, build_simple, Manifest, WorksheetEntry};
