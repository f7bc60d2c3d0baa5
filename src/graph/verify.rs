//! Post-render verification of a graph image on disk.
//!
//! Checks, in order:
//! 1. the file exists and is non-empty (otherwise nothing else is checked);
//! 2. it is at least `min_file_bytes` long;
//! 3. width and height reach `dimension_tolerance` of the nominal size;
//! 4. the aspect ratio is within `aspect_tolerance` of the nominal one;
//! 5. the decoded format is PNG.
//!
//! An empty list means the image is fit for print.

use super::spec::GraphStyle;
use image::{ImageFormat, ImageReader};
use std::path::Path;

/// Verify the image at `path` against `style`. Returns every problem found.
pub fn verify_graph(path: &Path, style: &GraphStyle) -> Vec<String> {
    let mut errors = Vec::new();

    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => {
            errors.push(format!(
                "קובץ הגרף לא נמצא / graph file not found: {}",
                path.display()
            ));
            return errors;
        }
    };
    if size == 0 {
        errors.push(format!(
            "קובץ הגרף ריק / graph file is empty: {}",
            path.display()
        ));
        return errors;
    }
    if size < style.min_file_bytes {
        errors.push(format!(
            "קובץ הגרף קטן מדי / graph file too small: {size} bytes"
        ));
    }

    let reader = match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
        Ok(r) => r,
        Err(e) => {
            errors.push(format!("שגיאה בעת בדיקת הגרף / cannot inspect graph: {e}"));
            return errors;
        }
    };
    let format = reader.format();
    let (width, height) = match reader.into_dimensions() {
        Ok(dims) => dims,
        Err(e) => {
            errors.push(format!("שגיאה בעת בדיקת הגרף / cannot inspect graph: {e}"));
            return errors;
        }
    };

    let min_width = style.width_in * style.dpi as f64 * style.dimension_tolerance;
    let min_height = style.height_in * style.dpi as f64 * style.dimension_tolerance;
    if (width as f64) < min_width {
        errors.push(format!(
            "רוחב הגרף קטן מהצפוי / width below expected: {width} < {min_width}"
        ));
    }
    if (height as f64) < min_height {
        errors.push(format!(
            "גובה הגרף קטן מהצפוי / height below expected: {height} < {min_height}"
        ));
    }

    let expected = style.aspect();
    let actual = width as f64 / height.max(1) as f64;
    if (actual - expected).abs() > style.aspect_tolerance {
        errors.push(format!(
            "יחס גובה-רוחב חורג / aspect ratio off: {actual:.2} != {expected:.2}"
        ));
    }

    if format != Some(ImageFormat::Png) {
        let name = format.map_or_else(|| "unknown".to_string(), |f| format!("{f:?}"));
        errors.push(format!("פורמט הגרף אינו PNG / graph is not PNG: {name}"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    /// 20 DPI → nominal 360×240.
    fn small_style(min_file_bytes: u64) -> GraphStyle {
        GraphStyle {
            dpi: 20,
            min_file_bytes,
            ..GraphStyle::default()
        }
    }

    /// Pseudo-random pixels so PNG compression cannot shrink the file away.
    fn noisy(w: u32, h: u32) -> RgbImage {
        let mut state: u32 = 0x2545_F491;
        RgbImage::from_fn(w, h, |_, _| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let b = state.to_be_bytes();
            Rgb([b[0], b[1], b[2]])
        })
    }

    #[test]
    fn missing_file_yields_single_error() {
        let dir = tempfile::tempdir().unwrap();
        let errors = verify_graph(&dir.path().join("nope.png"), &GraphStyle::default());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("not found"));
    }

    #[test]
    fn empty_file_yields_single_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();
        let errors = verify_graph(&path, &GraphStyle::default());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("empty"));
    }

    #[test]
    fn good_png_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.png");
        noisy(360, 240).save(&path).unwrap();
        let errors = verify_graph(&path, &small_style(10_000));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn small_file_is_reported_but_still_inspected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");
        RgbImage::from_pixel(360, 240, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        let errors = verify_graph(&path, &small_style(10_000));
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("too small"));
    }

    #[test]
    fn undersized_square_fails_dimensions_and_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.png");
        noisy(100, 100).save(&path).unwrap();
        let errors = verify_graph(&path, &small_style(0));
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("width"));
        assert!(errors[1].contains("height"));
        assert!(errors[2].contains("aspect"));
    }

    #[test]
    fn jpeg_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.png");
        DynamicImage::ImageRgb8(noisy(360, 240))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();
        let errors = verify_graph(&path, &small_style(0));
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("not PNG"));
    }
}
