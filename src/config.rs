//! Configuration types for worksheet rendering.
//!
//! PDF behaviour is controlled through [`PdfConfig`], built via its
//! [`PdfConfigBuilder`]. Page geometry lives in [`PageGeometry`] so the print
//! CSS `@page` size, the wkhtmltopdf page flags, the pandoc geometry and the
//! image downsampling width all derive from the same numbers.
//!
//! Graph styling lives next to the renderer in [`crate::graph::GraphStyle`];
//! pagination thresholds in [`crate::pipeline::paginate::PaginationConfig`].

use crate::error::WorksheetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Pixels per centimetre at the 96 DPI CSS reference resolution.
pub const PX_PER_CM: f64 = 37.8;

/// Physical page geometry, in centimetres.
///
/// The defaults describe an A4 sheet with 2.5 cm top/bottom and 2.0 cm side
/// margins, which leaves a 17 cm content column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_cm: f64,
    pub height_cm: f64,
    pub margin_top_cm: f64,
    pub margin_bottom_cm: f64,
    pub margin_side_cm: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

impl PageGeometry {
    /// A4 portrait with worksheet margins.
    pub const A4: Self = Self {
        width_cm: 21.0,
        height_cm: 29.7,
        margin_top_cm: 2.5,
        margin_bottom_cm: 2.5,
        margin_side_cm: 2.0,
    };

    /// Width of the printable column between the side margins.
    pub fn content_width_cm(&self) -> f64 {
        self.width_cm - 2.0 * self.margin_side_cm
    }

    /// Content width in CSS pixels; images wider than this are downsampled
    /// before being inlined.
    pub fn content_width_px(&self) -> u32 {
        (self.content_width_cm() * PX_PER_CM) as u32
    }
}

/// A PDF rendering backend, in the order they are normally tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// WeasyPrint: native HTML/CSS layout engine.
    WeasyPrint,
    /// wkhtmltopdf: headless WebKit renderer; needs images inlined.
    Wkhtmltopdf,
    /// pandoc + a LaTeX engine, fed with the original Markdown.
    Pandoc,
}

impl BackendKind {
    /// Default priority order.
    pub const ALL: [BackendKind; 3] = [
        BackendKind::WeasyPrint,
        BackendKind::Wkhtmltopdf,
        BackendKind::Pandoc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::WeasyPrint => "weasyprint",
            BackendKind::Wkhtmltopdf => "wkhtmltopdf",
            BackendKind::Pandoc => "pandoc",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = WorksheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weasyprint" => Ok(BackendKind::WeasyPrint),
            "wkhtmltopdf" | "pdfkit" => Ok(BackendKind::Wkhtmltopdf),
            "pandoc" | "pypandoc" => Ok(BackendKind::Pandoc),
            other => Err(WorksheetError::InvalidConfig(format!(
                "unknown PDF backend '{other}' (expected weasyprint, wkhtmltopdf or pandoc)"
            ))),
        }
    }
}

/// Configuration for Markdown → PDF rendering.
///
/// Built via [`PdfConfig::builder()`] or using [`PdfConfig::default()`].
///
/// # Example
/// ```rust
/// use worksheet_kit::{BackendKind, PdfConfig};
///
/// let config = PdfConfig::builder()
///     .backends(vec![BackendKind::Pandoc])
///     .main_font("Frank Ruhl Libre")
///     .build()
///     .unwrap();
/// assert_eq!(config.backends, vec![BackendKind::Pandoc]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Physical page size and margins. Default: A4.
    pub geometry: PageGeometry,

    /// Backends in the order they are tried. Default: weasyprint, wkhtmltopdf, pandoc.
    pub backends: Vec<BackendKind>,

    /// Program used for the WeasyPrint backend. Default: `weasyprint`.
    pub weasyprint_program: PathBuf,

    /// Program used for the wkhtmltopdf backend. Default: `wkhtmltopdf`.
    pub wkhtmltopdf_program: PathBuf,

    /// Program used for the pandoc backend. Default: `pandoc`.
    pub pandoc_program: PathBuf,

    /// LaTeX engine handed to pandoc. Default: `xelatex`.
    pub pandoc_pdf_engine: String,

    /// Main font handed to pandoc. Default: `David Libre`.
    pub main_font: String,

    /// `<title>` of the generated HTML document.
    pub document_title: String,

    /// Hebrew font stack for the print CSS, most preferred first.
    pub hebrew_fonts: Vec<String>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::A4,
            backends: BackendKind::ALL.to_vec(),
            weasyprint_program: PathBuf::from("weasyprint"),
            wkhtmltopdf_program: PathBuf::from("wkhtmltopdf"),
            pandoc_program: PathBuf::from("pandoc"),
            pandoc_pdf_engine: "xelatex".to_string(),
            main_font: "David Libre".to_string(),
            document_title: "דף עבודה במתמטיקה".to_string(),
            hebrew_fonts: [
                "David Libre",
                "Frank Ruhl Libre",
                "Assistant",
                "Heebo",
                "Alef",
                "Noto Sans Hebrew",
                "Arial Hebrew",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl PdfConfig {
    /// Create a new builder for `PdfConfig`.
    pub fn builder() -> PdfConfigBuilder {
        PdfConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PdfConfig`].
#[derive(Debug)]
pub struct PdfConfigBuilder {
    config: PdfConfig,
}

impl PdfConfigBuilder {
    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn backends(mut self, backends: Vec<BackendKind>) -> Self {
        self.config.backends = backends;
        self
    }

    pub fn weasyprint_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.weasyprint_program = program.into();
        self
    }

    pub fn wkhtmltopdf_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.wkhtmltopdf_program = program.into();
        self
    }

    pub fn pandoc_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.config.pandoc_program = program.into();
        self
    }

    pub fn pandoc_pdf_engine(mut self, engine: impl Into<String>) -> Self {
        self.config.pandoc_pdf_engine = engine.into();
        self
    }

    pub fn main_font(mut self, font: impl Into<String>) -> Self {
        self.config.main_font = font.into();
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.config.document_title = title.into();
        self
    }

    pub fn hebrew_fonts(mut self, fonts: Vec<String>) -> Self {
        self.config.hebrew_fonts = fonts;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PdfConfig, WorksheetError> {
        let c = &self.config;
        if c.backends.is_empty() {
            return Err(WorksheetError::InvalidConfig(
                "at least one PDF backend is required".into(),
            ));
        }
        let g = &c.geometry;
        if g.content_width_cm() <= 0.0 || g.height_cm <= g.margin_top_cm + g.margin_bottom_cm {
            return Err(WorksheetError::InvalidConfig(format!(
                "margins leave no printable area on a {}×{} cm page",
                g.width_cm, g.height_cm
            )));
        }
        Ok(self.config)
    }
}
