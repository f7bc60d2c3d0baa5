//! Image embedding: `<img src="file">` → `<img src="data:image/png;base64,…">`.
//!
//! wkhtmltopdf cannot be relied on to read local files, so the HTML handed
//! to it carries every picture inline. Images wider than the printable
//! column are downsampled first, which keeps the document small and the
//! layout identical to the other backends.
//!
//! ## Why PNG?
//! The pictures are mostly graphs and diagrams with thin lines and text.
//! Lossless compression keeps them crisp; JPEG artefacts on a 1-pixel axis
//! line are visible on paper.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageReader};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

use super::markdown::decode_source;

static RE_IMG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<img\b[^>]*>").unwrap());
static RE_SRC_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bsrc="([^"]+)""#).unwrap());
static RE_ALT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\balt="([^"]*)""#).unwrap());

/// Encode an image as base64 PNG.
pub fn encode_png_base64(img: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded {}×{} image → {} bytes base64", img.width(), img.height(), b64.len());
    Ok(b64)
}

/// Downsample proportionally (Lanczos) when wider than `max_width_px`.
pub fn fit_width(img: DynamicImage, max_width_px: u32) -> DynamicImage {
    if img.width() <= max_width_px {
        return img;
    }
    let ratio = max_width_px as f64 / img.width() as f64;
    let height = ((img.height() as f64 * ratio).round() as u32).max(1);
    debug!(
        "Downsampling {}×{} → {}×{}",
        img.width(),
        img.height(),
        max_width_px,
        height
    );
    img.resize_exact(max_width_px, height, FilterType::Lanczos3)
}

/// Replace every local `<img>` in `html` with an inline base64 PNG.
///
/// Relative sources resolve against `base_dir`. Remote and `data:` sources,
/// missing files and undecodable images keep their original tag; the last
/// two are logged.
pub fn inline_images(html: &str, base_dir: &Path, max_width_px: u32, max_width_cm: f64) -> String {
    RE_IMG_TAG
        .replace_all(html, |caps: &Captures<'_>| {
            let tag = &caps[0];
            match embed_tag(tag, base_dir, max_width_px, max_width_cm) {
                Some(replacement) => replacement,
                None => tag.to_string(),
            }
        })
        .into_owned()
}

fn embed_tag(tag: &str, base_dir: &Path, max_width_px: u32, max_width_cm: f64) -> Option<String> {
    let src = RE_SRC_ATTR.captures(tag)?.get(1)?.as_str();
    let lower = src.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
        return None;
    }
    let alt = RE_ALT_ATTR
        .captures(tag)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    let decoded = decode_source(src.strip_prefix("file://").unwrap_or(src));
    let path = if decoded.is_absolute() {
        decoded
    } else {
        base_dir.join(decoded)
    };
    if !path.exists() {
        debug!("Image not found, leaving tag as is: {}", path.display());
        return None;
    }

    let img = match ImageReader::open(&path)
        .map_err(image::ImageError::IoError)
        .and_then(|r| r.with_guessed_format().map_err(image::ImageError::IoError))
        .and_then(|r| r.decode())
    {
        Ok(img) => img,
        Err(e) => {
            warn!("שגיאה בעיבוד תמונה / Cannot embed image {}: {}", path.display(), e);
            return None;
        }
    };

    let img = fit_width(img, max_width_px);
    match encode_png_base64(&img) {
        Ok(b64) => Some(format!(
            r#"<img src="data:image/png;base64,{b64}" alt="{alt}" style="max-width: {max_width_cm}cm; height: auto;">"#
        )),
        Err(e) => {
            warn!("Cannot encode image {}: {}", path.display(), e);
            None
        }
    }
}
