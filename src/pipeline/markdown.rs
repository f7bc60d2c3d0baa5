//! Markdown → HTML conversion for worksheets.
//!
//! Steps, in order:
//! 1. Drop a leading `---` front-matter block (malformed blocks pass through).
//! 2. Lift `$$…$$` and then `$…$` spans out of the text, leaving opaque
//!    placeholders, so the Markdown parser never sees `_` or `*` inside a
//!    formula.
//! 3. Render with pulldown-cmark: tables, fenced code, and every soft line
//!    break turned into `<br />`.
//! 4. Put the math back as MathJax containers that keep their delimiters.
//! 5. Rewrite `<img src>` values according to [`ImageSources`].

use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use pulldown_cmark::{html, Event, Options, Parser};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Opening and closing marks around a math placeholder index.
///
/// Private-use code points: the Markdown parser treats them as plain text and
/// they never occur in real worksheets.
const MATH_OPEN: char = '\u{E000}';
const MATH_CLOSE: char = '\u{E001}';

static RE_BLOCK_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$([^$]+)\$\$").unwrap());
static RE_INLINE_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$([^$]+)\$").unwrap());
static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").unwrap());
static RE_IMG_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"<img src="([^"]+)""#).unwrap());

/// How `<img src="…">` values are rewritten after conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSources {
    /// Leave sources untouched.
    Keep,
    /// Prefix every relative source, e.g. `../` for pages written one
    /// directory below the worksheet root.
    Prefix(String),
    /// Replace a relative source with its absolute path under this directory,
    /// when that file exists.
    ResolveAgainst(PathBuf),
}

/// Options for [`markdown_to_html`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub images: ImageSources,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            images: ImageSources::Prefix("../".to_string()),
        }
    }
}

impl ConvertOptions {
    pub fn with_images(images: ImageSources) -> Self {
        Self { images }
    }
}

/// Convert a worksheet's Markdown to an HTML body fragment.
pub fn markdown_to_html(markdown: &str, options: &ConvertOptions) -> String {
    let body = strip_front_matter(markdown);
    let (protected, math) = protect_math(body);

    let mut parser_options = Options::empty();
    parser_options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(&protected, parser_options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut html_out = String::with_capacity(protected.len() * 3 / 2);
    html::push_html(&mut html_out, parser);

    let html_out = restore_math(&html_out, &math);
    let html_out = rewrite_image_sources(&html_out, &options.images);
    debug!(
        "Converted {} bytes of Markdown → {} bytes of HTML ({} math spans)",
        markdown.len(),
        html_out.len(),
        math.len()
    );
    html_out
}

/// Remove a leading `---` front-matter block.
///
/// The text is split on `---` into at most three parts; only when all three
/// exist is the third kept (trimmed). Anything else is returned unchanged.
pub fn strip_front_matter(markdown: &str) -> &str {
    if !markdown.starts_with("---") {
        return markdown;
    }
    let parts: Vec<&str> = markdown.splitn(3, "---").collect();
    if parts.len() == 3 {
        parts[2].trim()
    } else {
        markdown
    }
}

/// Wrap `$$…$$` and `$…$` spans of an already-rendered HTML string in
/// MathJax containers.
///
/// Block spans are replaced first; inline spans are matched only in the text
/// that remains, so a display formula is never wrapped twice.
pub fn process_math(html_in: &str) -> String {
    let (protected, math) = protect_math(html_in);
    restore_math(&protected, &math)
}

fn protect_math(text: &str) -> (String, Vec<String>) {
    let mut spans: Vec<String> = Vec::new();

    let after_block = RE_BLOCK_MATH.replace_all(text, |caps: &Captures<'_>| {
        let rendered = format!(
            r#"<div class="math-display">$${}$$</div>"#,
            escape_html(caps[1].trim())
        );
        placeholder(&mut spans, rendered)
    });

    let after_inline = RE_INLINE_MATH.replace_all(&after_block, |caps: &Captures<'_>| {
        let rendered = format!(
            r#"<span class="math-inline">${}$</span>"#,
            escape_html(caps[1].trim())
        );
        placeholder(&mut spans, rendered)
    });

    (after_inline.into_owned(), spans)
}

fn placeholder(spans: &mut Vec<String>, rendered: String) -> String {
    spans.push(rendered);
    format!("{MATH_OPEN}{}{MATH_CLOSE}", spans.len() - 1)
}

fn restore_math(text: &str, spans: &[String]) -> String {
    RE_PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| spans.get(i))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Rewrite `<img src="…">` values in an HTML fragment.
pub fn rewrite_image_sources(html_in: &str, images: &ImageSources) -> String {
    match images {
        ImageSources::Keep => html_in.to_string(),
        ImageSources::Prefix(prefix) => RE_IMG_SRC
            .replace_all(html_in, |caps: &Captures<'_>| {
                let src = &caps[1];
                if is_relative_source(src) {
                    format!(r#"<img src="{prefix}{src}""#)
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned(),
        ImageSources::ResolveAgainst(base_dir) => RE_IMG_SRC
            .replace_all(html_in, |caps: &Captures<'_>| {
                let src = &caps[1];
                if !is_relative_source(src) {
                    return caps[0].to_string();
                }
                let full = base_dir.join(decode_source(src));
                if full.exists() {
                    format!(r#"<img src="{}""#, escape_html(&full.to_string_lossy()))
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned(),
    }
}

/// `true` for sources that are resolved relative to the document.
pub(crate) fn is_relative_source(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    !(lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
        || lower.starts_with("file:")
        || src.starts_with('/')
        || Path::new(src).is_absolute())
}

/// Turn an HTML `src` value back into a file-system path fragment.
pub(crate) fn decode_source(src: &str) -> PathBuf {
    let unescaped = src.replace("&amp;", "&");
    PathBuf::from(percent_decode_str(&unescaped).decode_utf8_lossy().into_owned())
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_well_formed_front_matter() {
        let md = "---\ntitle: קבוצה\ngrade: 8\n---\n# כותרת\n\nטקסט";
        assert_eq!(strip_front_matter(md), "# כותרת\n\nטקסט");
    }

    #[test]
    fn malformed_front_matter_passes_through() {
        let md = "---\ntitle: no closing delimiter\n# Heading";
        assert_eq!(strip_front_matter(md), md);
    }

    #[test]
    fn text_without_front_matter_is_untouched() {
        assert_eq!(strip_front_matter("# Title\n---\nx"), "# Title\n---\nx");
    }

    #[test]
    fn converted_output_has_no_front_matter_delimiter() {
        let md = "---\nlayout: worksheet\n---\n# דף עבודה\n\nשורה";
        let out = markdown_to_html(md, &ConvertOptions::default());
        assert!(!out.lines().any(|l| l.trim() == "---"), "got: {out}");
        assert!(!out.contains("layout: worksheet"));
        assert!(out.contains("<h1>דף עבודה</h1>"));
    }

    #[test]
    fn newlines_become_line_breaks() {
        let out = markdown_to_html("שורה א\nשורה ב", &ConvertOptions::default());
        assert!(out.contains("שורה א<br />"), "got: {out}");
    }

    #[test]
    fn tables_and_fenced_code_are_rendered() {
        let md = "| x | y |\n|---|---|\n| 1 | 4 |\n\n```\ncode\n```";
        let out = markdown_to_html(md, &ConvertOptions::default());
        assert!(out.contains("<table>"));
        assert!(out.contains("<td>4</td>"));
        assert!(out.contains("<pre><code>code\n</code></pre>"));
    }

    #[test]
    fn block_math_is_not_rewrapped_as_inline() {
        let out = process_math("<p>$$ y = 3x + 3 $$ וגם $m$</p>");
        assert_eq!(
            out,
            r#"<p><div class="math-display">$$y = 3x + 3$$</div> וגם <span class="math-inline">$m$</span></p>"#
        );
    }

    #[test]
    fn math_survives_markdown_emphasis_rules() {
        let out = markdown_to_html("השיפוע $a*b*c$ ו-$x_1 + x_2$", &ConvertOptions::default());
        assert!(out.contains(r#"<span class="math-inline">$a*b*c$</span>"#), "got: {out}");
        assert!(out.contains(r#"<span class="math-inline">$x_1 + x_2$</span>"#), "got: {out}");
        assert!(!out.contains("<em>"));
    }

    #[test]
    fn math_content_is_html_escaped() {
        let out = process_math("$a < b$");
        assert_eq!(out, r#"<span class="math-inline">$a &lt; b$</span>"#);
    }

    #[test]
    fn relative_images_get_prefix() {
        let out = markdown_to_html(
            "![גרף](assets/graphs/g.png) ![web](https://x.org/a.png)",
            &ConvertOptions::default(),
        );
        assert!(out.contains(r#"<img src="../assets/graphs/g.png""#), "got: {out}");
        assert!(out.contains(r#"<img src="https://x.org/a.png""#), "got: {out}");
    }

    #[test]
    fn keep_leaves_sources_alone() {
        let out = markdown_to_html(
            "![g](assets/g.png)",
            &ConvertOptions::with_images(ImageSources::Keep),
        );
        assert!(out.contains(r#"<img src="assets/g.png""#));
    }

    #[test]
    fn resolve_against_uses_existing_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("here.png"), b"png").unwrap();
        let opts = ConvertOptions::with_images(ImageSources::ResolveAgainst(dir.path().into()));
        let out = markdown_to_html("![a](here.png) ![b](gone.png)", &opts);
        let expected = dir.path().join("here.png");
        assert!(out.contains(&*expected.to_string_lossy()), "got: {out}");
        assert!(out.contains(r#"<img src="gone.png""#), "got: {out}");
    }

    #[test]
    fn relative_source_detection() {
        assert!(is_relative_source("assets/g.png"));
        assert!(is_relative_source("../g.png"));
        assert!(!is_relative_source("/abs/g.png"));
        assert!(!is_relative_source("data:image/png;base64,AAAA"));
        assert!(!is_relative_source("HTTPS://x.org/g.png"));
    }

    #[test]
    fn percent_encoded_sources_are_decoded() {
        assert_eq!(decode_source("a%20b.png"), PathBuf::from("a b.png"));
    }
}
