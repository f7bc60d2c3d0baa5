//! SVG scene → RGBA pixmap → PNG bytes.

use super::scene::canvas_size_pt;
use super::spec::GraphStyle;
use crate::error::WorksheetError;
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;
use tracing::debug;

/// Rasterise `svg` at the style's DPI.
///
/// Text is shaped with the system fonts; on a machine without any the
/// geometry still renders and only the glyphs are missing.
pub fn rasterize(svg: &str, style: &GraphStyle) -> Result<RgbaImage, WorksheetError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| WorksheetError::GraphRasterFailed(format!("SVG parse: {e}")))?;

    let (width, height) = style.pixel_size();
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        WorksheetError::GraphRasterFailed(format!("cannot allocate a {width}×{height} pixmap"))
    })?;

    let (canvas_w, _) = canvas_size_pt(style);
    let scale = (width as f64 / canvas_w) as f32;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    debug!("Rasterised graph at {}×{} (scale {:.3})", width, height, scale);

    // The scene has an opaque background, so premultiplied and straight
    // alpha coincide.
    RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| WorksheetError::GraphRasterFailed("pixmap size mismatch".into()))
}

/// Encode as PNG.
pub fn encode_png(img: RgbaImage) -> Result<Vec<u8>, WorksheetError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| WorksheetError::GraphRasterFailed(format!("PNG encode: {e}")))?;
    debug!("Encoded graph → {} bytes PNG", buf.len());
    Ok(buf)
}
