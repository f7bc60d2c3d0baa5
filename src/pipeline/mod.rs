//! Pipeline stages for Markdown-to-page conversion.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the PDF path and the workbook builds can
//! share them.
//!
//! ## Data Flow
//!
//! ```text
//! markdown ──▶ markdown ──▶ paginate ──▶ document
//!  (source)    (HTML body)  (A4 pages)   (shell)
//!                  │
//!                  └──▶ embed ──▶ wkhtmltopdf backend
//!                      (base64)
//! ```
//!
//! 1. [`markdown`]: front matter, Markdown → HTML, math containers, image
//!    paths
//! 2. [`paginate`]: cut the body into A4-sized fragments at `<h2>`/`<h3>`
//! 3. [`embed`]: inline local images as (downsampled) base64 PNG
//! 4. [`document`]: wrap bodies or sheets in standalone RTL HTML documents

pub mod document;
pub mod embed;
pub mod markdown;
pub mod paginate;
