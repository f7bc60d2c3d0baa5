//! Print-quality instructional graphs.
//!
//! ```text
//! GraphSpec ──▶ scene (SVG) ──▶ raster (resvg) ──▶ PNG on disk ──▶ verify
//! ```
//!
//! A graph that fails verification is an error even though the file may
//! already exist on disk; callers must not embed it.
//!
//! # Example
//! ```rust,no_run
//! use worksheet_kit::graph::{presets, GraphRenderer};
//!
//! let renderer = GraphRenderer::new("assets/graphs");
//! let path = renderer.render(&presets::motion_graph()).unwrap();
//! println!("{}", path.display());
//! ```

pub mod presets;
pub mod raster;
pub mod scene;
pub mod spec;
pub mod verify;

pub use spec::{GraphSpec, GraphStyle};
pub use verify::verify_graph;

use crate::error::WorksheetError;
use crate::output::write_atomic;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Renders [`GraphSpec`]s into an output directory with a fixed style.
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    style: GraphStyle,
    output_dir: PathBuf,
}

impl GraphRenderer {
    /// Renderer with the default print style.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_style(GraphStyle::default(), output_dir)
    }

    pub fn with_style(style: GraphStyle, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            style,
            output_dir: output_dir.into(),
        }
    }

    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Draw `spec`, write it as `<output_dir>/<filename>` and verify it.
    ///
    /// # Errors
    /// * [`WorksheetError::InvalidGraphSpec`] before anything is drawn.
    /// * [`WorksheetError::GraphRasterFailed`] when drawing fails.
    /// * [`WorksheetError::OutputWriteFailed`] when the file cannot be written.
    /// * [`WorksheetError::GraphVerificationFailed`] when the written image
    ///   does not pass [`verify_graph`].
    pub fn render(&self, spec: &GraphSpec) -> Result<PathBuf, WorksheetError> {
        spec.validate()?;

        let svg = scene::build_svg(spec, &self.style);
        debug!("Graph scene for '{}': {} bytes SVG", spec.filename, svg.len());
        let image = raster::rasterize(&svg, &self.style)?;
        let png = raster::encode_png(image)?;

        let path = self.output_dir.join(&spec.filename);
        write_atomic(&path, &png)?;

        let errors = verify_graph(&path, &self.style);
        if !errors.is_empty() {
            return Err(WorksheetError::GraphVerificationFailed { path, errors });
        }
        info!("גרף נוצר בהצלחה / Graph created: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_res(min_file_bytes: u64) -> GraphStyle {
        GraphStyle {
            dpi: 20,
            min_file_bytes,
            ..GraphStyle::default()
        }
    }

    #[test]
    fn renders_and_verifies_motion_graph() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GraphRenderer::with_style(low_res(1), dir.path());
        let path = renderer.render(&presets::motion_graph()).unwrap();

        assert_eq!(path, dir.path().join("jerusalem_motion_graph.png"));
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (360, 240));
        // Background is white in the corner.
        assert_eq!(img.to_rgba8().get_pixel(2, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn default_style_render_is_print_quality() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GraphRenderer::new(dir.path());
        let path = renderer.render(&presets::motion_graph()).unwrap();

        let bytes = std::fs::metadata(&path).unwrap().len();
        assert!(bytes >= 10_000, "only {bytes} bytes");
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (7200, 4800));
        let aspect = img.width() as f64 / img.height() as f64;
        assert!((aspect - 1.5).abs() <= 0.1);
    }

    #[test]
    fn failed_verification_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = GraphRenderer::with_style(low_res(u64::MAX), dir.path());
        let err = renderer.render(&presets::default_linear_function()).unwrap_err();
        match err {
            WorksheetError::GraphVerificationFailed { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("too small"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_spec_draws_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = presets::motion_graph();
        spec.labels.truncate(3);
        let err = GraphRenderer::with_style(low_res(1), dir.path())
            .render(&spec)
            .unwrap_err();
        assert!(matches!(err, WorksheetError::InvalidGraphSpec(_)));
        assert!(!dir.path().join(&spec.filename).exists());
    }
}
