//! Graph specifications and the immutable style they are drawn with.

use crate::error::WorksheetError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to draw: an ordered polyline of labelled points on explicit axes.
///
/// Can be loaded from JSON:
///
/// ```json
/// {
///   "points": [[0, 0], [1, 4], [2, 4]],
///   "labels": ["A", "B", "C"],
///   "title": "גרף תנועה",
///   "x_label": "זמן (שעות)",
///   "y_label": "מרחק (ק\"מ)",
///   "x_range": [0, 2],
///   "y_range": [0, 6],
///   "x_ticks": [0, 1, 2],
///   "filename": "motion.png"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSpec {
    /// `(x, y)` pairs, connected in order.
    pub points: Vec<(f64, f64)>,
    /// One identifier per point, drawn above it.
    pub labels: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,
    /// Data range of the x axis; the drawn axis is padded by 0.5 each side.
    pub x_range: (f64, f64),
    /// Data range of the y axis; the drawn axis is padded by 1 each side.
    pub y_range: (f64, f64),
    /// Explicit tick positions. Chosen automatically when absent.
    #[serde(default)]
    pub x_ticks: Option<Vec<f64>>,
    #[serde(default)]
    pub y_ticks: Option<Vec<f64>>,
    /// File name (no directories) inside the renderer's output directory.
    pub filename: String,
}

impl GraphSpec {
    /// Load a spec from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, WorksheetError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WorksheetError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                WorksheetError::ReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        serde_json::from_str(&text)
            .map_err(|e| WorksheetError::InvalidGraphSpec(format!("{}: {e}", path.display())))
    }

    /// Reject specs that cannot be drawn.
    pub fn validate(&self) -> Result<(), WorksheetError> {
        let invalid = |msg: String| Err(WorksheetError::InvalidGraphSpec(msg));

        if self.points.is_empty() {
            return invalid("at least one point is required".into());
        }
        if self.labels.len() != self.points.len() {
            return invalid(format!(
                "{} labels for {} points",
                self.labels.len(),
                self.points.len()
            ));
        }
        if let Some((x, y)) = self
            .points
            .iter()
            .find(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return invalid(format!("non-finite point ({x}, {y})"));
        }
        for (axis, (lo, hi)) in [("x", self.x_range), ("y", self.y_range)] {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return invalid(format!("{axis} range ({lo}, {hi}) is empty"));
            }
            if !(hi - lo).is_finite() {
                return invalid(format!("{axis} range ({lo}, {hi}) is too wide"));
            }
        }
        let plain_name = Path::new(&self.filename)
            .file_name()
            .is_some_and(|n| n == self.filename.as_str());
        if self.filename.trim().is_empty() || !plain_name {
            return invalid(format!("bad file name '{}'", self.filename));
        }
        Ok(())
    }

    /// Axis limits after padding: `(x_min, x_max, y_min, y_max)`.
    pub fn limits(&self) -> (f64, f64, f64, f64) {
        (
            self.x_range.0 - 0.5,
            self.x_range.1 + 0.5,
            self.y_range.0 - 1.0,
            self.y_range.1 + 1.0,
        )
    }
}

/// How graphs are drawn and what a valid output looks like.
///
/// Passed by reference to every render; nothing is global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStyle {
    /// Raster resolution.
    pub dpi: u32,
    /// Physical canvas size, inches.
    pub width_in: f64,
    pub height_in: f64,
    /// Font sizes, points.
    pub label_font_size: f64,
    pub axis_label_font_size: f64,
    pub tick_font_size: f64,
    pub coordinate_font_size: f64,
    pub title_font_size: f64,
    /// Font families, CSS syntax.
    pub font_family: String,
    /// Connecting line width, points.
    pub line_width: f64,
    pub line_color: String,
    pub title_color: String,
    /// Marker radius in data units.
    pub point_radius: f64,
    /// Marker fill colours, cycled by point index.
    pub palette: Vec<String>,
    /// Verification: smallest acceptable file.
    pub min_file_bytes: u64,
    /// Verification: fraction of the nominal pixel size that must be reached.
    pub dimension_tolerance: f64,
    /// Verification: allowed deviation from the nominal aspect ratio.
    pub aspect_tolerance: f64,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            dpi: 400,
            width_in: 18.0,
            height_in: 12.0,
            label_font_size: 40.0,
            axis_label_font_size: 28.0,
            tick_font_size: 24.0,
            coordinate_font_size: 22.0,
            title_font_size: 30.0,
            font_family: "'Arial Unicode MS', Tahoma, 'Lucida Sans Unicode', David, 'DejaVu Sans', sans-serif"
                .to_string(),
            line_width: 4.0,
            line_color: "#0066CC".to_string(),
            title_color: "#003366".to_string(),
            point_radius: 0.25,
            palette: ["#FF4444", "#0066FF", "#00AA00", "#FF8800", "#AA00AA", "#8B4513", "#FF4444"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            min_file_bytes: 10_000,
            dimension_tolerance: 0.9,
            aspect_tolerance: 0.1,
        }
    }
}

impl GraphStyle {
    /// Pixel size of the rendered image.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Width / height of the canvas.
    pub fn aspect(&self) -> f64 {
        self.width_in / self.height_in
    }

    /// Marker colour for the point at `index`.
    pub fn point_color(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return "#000000";
        }
        &self.palette[index % self.palette.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> GraphSpec {
        GraphSpec {
            points: vec![(0.0, 0.0), (1.0, 4.0)],
            labels: vec!["A".into(), "B".into()],
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            x_range: (0.0, 1.0),
            y_range: (0.0, 4.0),
            x_ticks: None,
            y_ticks: None,
            filename: "g.png".into(),
        }
    }

    #[test]
    fn valid_spec_passes() {
        assert!(spec().validate().is_ok());
    }

    #[test]
    fn label_count_must_match() {
        let mut s = spec();
        s.labels.pop();
        assert!(matches!(s.validate(), Err(WorksheetError::InvalidGraphSpec(_))));
    }

    #[test]
    fn empty_range_and_bad_names_rejected() {
        let mut s = spec();
        s.x_range = (2.0, 2.0);
        assert!(s.validate().is_err());

        let mut s = spec();
        s.x_range = (-1e308, 1e308);
        assert!(matches!(s.validate(), Err(WorksheetError::InvalidGraphSpec(_))));

        let mut s = spec();
        s.filename = "../escape.png".into();
        assert!(s.validate().is_err());

        let mut s = spec();
        s.points.clear();
        s.labels.clear();
        assert!(s.validate().is_err());
    }

    #[test]
    fn limits_are_padded() {
        assert_eq!(spec().limits(), (-0.5, 1.5, -1.0, 5.0));
    }

    #[test]
    fn palette_cycles_with_seventh_colour_repeating_first() {
        let style = GraphStyle::default();
        assert_eq!(style.point_color(0), "#FF4444");
        assert_eq!(style.point_color(6), "#FF4444");
        assert_eq!(style.point_color(7), "#FF4444");
        assert_eq!(style.point_color(8), "#0066FF");
    }

    #[test]
    fn default_canvas_is_18_by_12_inches_at_400_dpi() {
        let style = GraphStyle::default();
        assert_eq!(style.pixel_size(), (7200, 4800));
        assert!((style.aspect() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn spec_parses_from_json() {
        let json = r#"{"points": [[0, 0], [1, 4]], "labels": ["A", "B"],
                       "x_range": [0, 1], "y_range": [0, 4], "filename": "g.png"}"#;
        let parsed: GraphSpec = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, spec());
    }
}
