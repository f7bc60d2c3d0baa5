//! SVG scene construction for a [`GraphSpec`].
//!
//! The scene is laid out in points (1/72 in) on a canvas of the style's
//! physical size, so font sizes and line widths read exactly like their
//! print counterparts. Rasterisation scales it to the target DPI.
//!
//! Layers, back to front: background, grid, axis lines, frame (left and
//! bottom only), ticks, axis labels, title, data line, markers, labels.

use super::spec::{GraphSpec, GraphStyle};
use std::fmt::Write as _;

const MARGIN_LEFT: f64 = 150.0;
const MARGIN_RIGHT: f64 = 60.0;
const MARGIN_TOP: f64 = 110.0;
const MARGIN_BOTTOM: f64 = 130.0;

const TICK_LENGTH: f64 = 10.0;
const FRAME_WIDTH: f64 = 3.0;

/// Largest number of automatically chosen ticks per axis.
const MAX_AUTO_TICKS: usize = 12;

/// Mapping from data coordinates to canvas points.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn x(&self, x: f64) -> f64 {
        self.left + (x - self.x_min) / (self.x_max - self.x_min) * self.width
    }

    fn y(&self, y: f64) -> f64 {
        self.top + (self.y_max - y) / (self.y_max - self.y_min) * self.height
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Points per data unit along each axis.
    fn scale(&self) -> (f64, f64) {
        (
            self.width / (self.x_max - self.x_min),
            self.height / (self.y_max - self.y_min),
        )
    }
}

/// Canvas size in points for `style`.
pub fn canvas_size_pt(style: &GraphStyle) -> (f64, f64) {
    (style.width_in * 72.0, style.height_in * 72.0)
}

/// Build the SVG document for `spec`, which must have passed [`GraphSpec::validate`].
pub fn build_svg(spec: &GraphSpec, style: &GraphStyle) -> String {
    let (canvas_w, canvas_h) = canvas_size_pt(style);
    let (x_min, x_max, y_min, y_max) = spec.limits();
    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        width: canvas_w - MARGIN_LEFT - MARGIN_RIGHT,
        height: canvas_h - MARGIN_TOP - MARGIN_BOTTOM,
    };
    let x_ticks = spec
        .x_ticks
        .clone()
        .unwrap_or_else(|| auto_ticks(spec.x_range.0, spec.x_range.1));
    let y_ticks = spec
        .y_ticks
        .clone()
        .unwrap_or_else(|| auto_ticks(spec.y_range.0, spec.y_range.1));

    let mut svg = String::with_capacity(16 * 1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{canvas_w}" height="{canvas_h}" viewBox="0 0 {canvas_w} {canvas_h}" font-family="{}">"#,
        escape_xml(&style.font_family)
    );
    let _ = write!(
        svg,
        r##"<rect x="0" y="0" width="{canvas_w}" height="{canvas_h}" fill="#FFFFFF"/>"##
    );

    draw_grid(&mut svg, &frame, &x_ticks, &y_ticks);
    draw_axes(&mut svg, &frame);
    draw_ticks(&mut svg, &frame, &x_ticks, &y_ticks, style);
    draw_titles(&mut svg, &frame, spec, style, canvas_w, canvas_h);
    draw_data(&mut svg, &frame, spec, style);

    svg.push_str("</svg>");
    svg
}

fn draw_grid(svg: &mut String, f: &Frame, x_ticks: &[f64], y_ticks: &[f64]) {
    svg.push_str(r##"<g stroke="#A9A9A9" stroke-width="2" stroke-opacity="0.6">"##);
    for &t in x_ticks.iter().filter(|&&t| t >= f.x_min && t <= f.x_max) {
        let x = f.x(t);
        let _ = write!(svg, r#"<line x1="{x}" y1="{}" x2="{x}" y2="{}"/>"#, f.top, f.bottom());
    }
    for &t in y_ticks.iter().filter(|&&t| t >= f.y_min && t <= f.y_max) {
        let y = f.y(t);
        let _ = write!(svg, r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}"/>"#, f.left, f.right());
    }
    svg.push_str("</g>");
}

fn draw_axes(svg: &mut String, f: &Frame) {
    // Zero lines, where visible.
    if f.y_min <= 0.0 && 0.0 <= f.y_max {
        let y = f.y(0.0);
        let _ = write!(
            svg,
            r##"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="#000000" stroke-width="3"/>"##,
            f.left,
            f.right()
        );
    }
    if f.x_min <= 0.0 && 0.0 <= f.x_max {
        let x = f.x(0.0);
        let _ = write!(
            svg,
            r##"<line x1="{x}" y1="{}" x2="{x}" y2="{}" stroke="#000000" stroke-width="3"/>"##,
            f.top,
            f.bottom()
        );
    }
    // Frame: left and bottom only.
    let _ = write!(
        svg,
        r##"<polyline points="{l},{t} {l},{b} {r},{b}" fill="none" stroke="#000000" stroke-width="{FRAME_WIDTH}"/>"##,
        l = f.left,
        t = f.top,
        b = f.bottom(),
        r = f.right()
    );
}

fn draw_ticks(svg: &mut String, f: &Frame, x_ticks: &[f64], y_ticks: &[f64], style: &GraphStyle) {
    let fs = style.tick_font_size;
    svg.push_str(r##"<g stroke="#000000" stroke-width="3">"##);
    for &t in x_ticks.iter().filter(|&&t| t >= f.x_min && t <= f.x_max) {
        let x = f.x(t);
        let b = f.bottom();
        let _ = write!(svg, r#"<line x1="{x}" y1="{b}" x2="{x}" y2="{}"/>"#, b + TICK_LENGTH);
    }
    for &t in y_ticks.iter().filter(|&&t| t >= f.y_min && t <= f.y_max) {
        let y = f.y(t);
        let l = f.left;
        let _ = write!(svg, r#"<line x1="{}" y1="{y}" x2="{l}" y2="{y}"/>"#, l - TICK_LENGTH);
    }
    svg.push_str("</g>");

    let _ = write!(
        svg,
        r##"<g font-size="{fs}" font-weight="bold" fill="#000000">"##
    );
    for &t in x_ticks.iter().filter(|&&t| t >= f.x_min && t <= f.x_max) {
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">{}</text>"#,
            f.x(t),
            f.bottom() + TICK_LENGTH + 6.0 + fs,
            t as i64
        );
    }
    for &t in y_ticks.iter().filter(|&&t| t >= f.y_min && t <= f.y_max) {
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end">{}</text>"#,
            f.left - TICK_LENGTH - 8.0,
            f.y(t) + fs * 0.35,
            t as i64
        );
    }
    svg.push_str("</g>");
}

fn draw_titles(
    svg: &mut String,
    f: &Frame,
    spec: &GraphSpec,
    style: &GraphStyle,
    canvas_w: f64,
    canvas_h: f64,
) {
    if !spec.x_label.is_empty() {
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" font-size="{}" font-weight="bold" fill="#000000" text-anchor="middle">{}</text>"##,
            f.left + f.width / 2.0,
            canvas_h - 30.0,
            style.axis_label_font_size,
            escape_xml(&spec.x_label)
        );
    }
    if !spec.y_label.is_empty() {
        let (x, y) = (45.0, f.top + f.height / 2.0);
        let _ = write!(
            svg,
            r##"<text x="{x}" y="{y}" transform="rotate(-90 {x} {y})" font-size="{}" font-weight="bold" fill="#000000" text-anchor="middle">{}</text>"##,
            style.axis_label_font_size,
            escape_xml(&spec.y_label)
        );
    }
    if !spec.title.is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" font-size="{}" font-weight="bold" fill="{}" text-anchor="middle">{}</text>"#,
            canvas_w / 2.0,
            MARGIN_TOP - 45.0,
            style.title_font_size,
            escape_xml(&style.title_color),
            escape_xml(&spec.title)
        );
    }
}

fn draw_data(svg: &mut String, f: &Frame, spec: &GraphSpec, style: &GraphStyle) {
    let points: Vec<String> = spec
        .points
        .iter()
        .map(|&(x, y)| format!("{},{}", f.x(x), f.y(y)))
        .collect();
    let _ = write!(
        svg,
        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-opacity="0.9" stroke-linejoin="round"/>"#,
        points.join(" "),
        escape_xml(&style.line_color),
        style.line_width
    );

    // Markers are circles in data space, so ellipses on the canvas.
    let (sx, sy) = f.scale();
    for (i, &(x, y)) in spec.points.iter().enumerate() {
        let _ = write!(
            svg,
            r##"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{}" fill-opacity="0.9" stroke="#000000" stroke-width="3"/>"##,
            f.x(x),
            f.y(y),
            style.point_radius * sx,
            style.point_radius * sy,
            escape_xml(style.point_color(i))
        );
    }

    for (i, (&(x, y), label)) in spec.points.iter().zip(&spec.labels).enumerate() {
        // Identifier: bottom edge 1.2 units above the point.
        boxed_text(
            svg,
            f.x(x),
            f.y(y + 1.2),
            VAlign::Bottom,
            label,
            style.label_font_size,
            "#FFFFFF",
            1.0,
            2.0,
        );
        // Coordinates: top edge below the point, alternating depth.
        let offset = if i % 2 == 0 { -0.8 } else { -1.1 };
        boxed_text(
            svg,
            f.x(x),
            f.y(y + offset),
            VAlign::Top,
            &format!("({},{})", x as i64, y as i64),
            style.coordinate_font_size,
            "#FFFF00",
            0.7,
            1.0,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VAlign {
    Top,
    Bottom,
}

#[allow(clippy::too_many_arguments)]
fn boxed_text(
    svg: &mut String,
    cx: f64,
    anchor_y: f64,
    valign: VAlign,
    text: &str,
    font_size: f64,
    fill: &str,
    fill_opacity: f64,
    stroke_width: f64,
) {
    let pad = font_size * 0.3;
    let text_w = text.chars().count() as f64 * font_size * 0.62;
    let box_w = text_w + 2.0 * pad;
    let box_h = font_size + 2.0 * pad;
    let box_top = match valign {
        VAlign::Top => anchor_y,
        VAlign::Bottom => anchor_y - box_h,
    };
    let baseline = box_top + pad + font_size * 0.82;
    let _ = write!(
        svg,
        r##"<rect x="{}" y="{box_top}" width="{box_w}" height="{box_h}" rx="{}" fill="{fill}" fill-opacity="{fill_opacity}" stroke="#000000" stroke-width="{stroke_width}"/>"##,
        cx - box_w / 2.0,
        pad
    );
    let _ = write!(
        svg,
        r##"<text x="{cx}" y="{baseline}" font-size="{font_size}" font-weight="bold" fill="#000000" text-anchor="middle">{}</text>"##,
        escape_xml(text)
    );
}

/// Ticks covering `[lo, hi]` with a 1-2-5 step of at least 1, at most
/// `MAX_AUTO_TICKS + 1` of them. Empty when the span is not finite.
pub fn auto_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let span = (hi - lo).max(1.0);
    if !span.is_finite() {
        return Vec::new();
    }
    let max = MAX_AUTO_TICKS as f64;
    let magnitude = 10f64.powf((span / max).log10().floor()).max(1.0);
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|mult| mult * magnitude)
        .find(|step| span / step <= max)
        .unwrap_or(10.0 * magnitude);

    let start = (lo / step).ceil() * step;
    let mut ticks: Vec<f64> = Vec::new();
    for i in 0..=MAX_AUTO_TICKS {
        let t = start + i as f64 * step;
        if t > hi + 1e-9 {
            break;
        }
        // Far from zero a step can vanish below one ULP.
        if ticks.last() != Some(&t) {
            ticks.push(t);
        }
    }
    ticks
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::presets;

    #[test]
    fn scene_contains_every_point_and_label() {
        let spec = presets::motion_graph();
        let svg = build_svg(&spec, &GraphStyle::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<ellipse").count(), 7);
        for label in ["A", "B", "C", "D", "E", "F", "G"] {
            assert!(svg.contains(&format!(">{label}</text>")), "missing {label}");
        }
        assert!(svg.contains(">(3,8)</text>"));
        assert!(svg.contains(r##"fill="#8B4513""##));
    }

    #[test]
    fn hebrew_text_is_escaped() {
        let mut spec = presets::motion_graph();
        spec.y_label = r#"מרחק מהבית (ק"מ)"#.into();
        let svg = build_svg(&spec, &GraphStyle::default());
        assert!(svg.contains("מרחק מהבית (ק&quot;מ)"));
    }

    #[test]
    fn coordinate_labels_truncate() {
        let mut spec = presets::motion_graph();
        spec.points[0] = (0.0, 2.7);
        let svg = build_svg(&spec, &GraphStyle::default());
        assert!(svg.contains(">(0,2)</text>"));
    }

    #[test]
    fn data_to_canvas_mapping() {
        let f = Frame {
            x_min: -0.5,
            x_max: 6.5,
            y_min: -1.0,
            y_max: 13.0,
            left: 100.0,
            top: 50.0,
            width: 700.0,
            height: 140.0,
        };
        assert!((f.x(-0.5) - 100.0).abs() < 1e-9);
        assert!((f.x(6.5) - 800.0).abs() < 1e-9);
        assert!((f.y(13.0) - 50.0).abs() < 1e-9);
        assert!((f.y(-1.0) - 190.0).abs() < 1e-9);
    }

    #[test]
    fn auto_ticks_use_readable_steps() {
        assert_eq!(auto_ticks(0.0, 6.0), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(
            auto_ticks(0.0, 20.0),
            vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0]
        );
        assert_eq!(auto_ticks(-7.0, 1.0).first(), Some(&-7.0));
        assert_eq!(auto_ticks(0.0, 1000.0)[1], 100.0);
    }

    #[test]
    fn auto_ticks_terminate_on_extreme_ranges() {
        assert!(auto_ticks(-1e308, 1e308).is_empty());

        let lo = 1e22;
        let ticks = auto_ticks(lo, lo + 4e6);
        assert!(!ticks.is_empty());
        assert!(ticks.len() <= MAX_AUTO_TICKS + 1);
        assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn scene_builds_for_far_offset_range() {
        let mut spec = presets::motion_graph();
        spec.points = vec![(1e22, 0.0)];
        spec.labels = vec!["A".into()];
        spec.x_range = (1e22, 1e22 + 4e6);
        spec.x_ticks = None;
        assert!(spec.validate().is_ok());
        assert!(build_svg(&spec, &GraphStyle::default()).ends_with("</svg>"));
    }
}
