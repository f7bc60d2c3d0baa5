//! Standalone HTML document shells.
//!
//! Every shell is a complete RTL, UTF-8 page that loads MathJax with `$…$` /
//! `$$…$$` delimiters, so the math containers emitted by
//! [`super::markdown::markdown_to_html`] typeset in the browser or the PDF
//! engine alike.

use super::markdown::escape_html;
use crate::config::{PageGeometry, PdfConfig};

const MATHJAX_HEAD: &str = r#"    <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
    <script>
        window.MathJax = {tex: {inlineMath: [['$', '$']], displayMath: [['$$', '$$']]}};
    </script>"#;

/// Rules shared by every shell: tables, lists, code, math, rules.
const CONTENT_CSS: &str = r#"
        p { text-align: justify; margin: 0.8em 0; line-height: 1.8; }
        table { width: 100%; border-collapse: collapse; margin: 1em 0; page-break-inside: avoid; }
        table th, table td { border: 1px solid #333; padding: 0.5em; text-align: right; }
        table th { background-color: #f0f0f0; font-weight: bold; }
        ul, ol { margin: 0.8em 0; padding-right: 2em; }
        li { margin: 0.3em 0; }
        code { font-family: 'Courier New', monospace; background-color: #f5f5f5; padding: 0.2em 0.4em; border-radius: 3px; }
        pre { background-color: #f5f5f5; padding: 1em; border-radius: 5px; overflow-x: auto; page-break-inside: avoid; }
        .math-display { direction: ltr; text-align: center; margin: 1em 0; font-size: 1.1em; }
        .math-inline { direction: ltr; font-size: 1em; }
        hr { border: none; border-top: 1px solid #ddd; margin: 1.5em 0; }"#;

/// Screen and print rules for documents made of `.a4-page` sheets.
const A4_SHEET_CSS: &str = r#"
        * { box-sizing: border-box; margin: 0; padding: 0; }
        @page { size: A4; margin: 0; }
        body { font-family: 'Heebo', 'Assistant', 'Arial Hebrew', sans-serif; direction: rtl; background: #f0f0f0; }
        .a4-page {
            width: 210mm; min-height: 297mm; max-height: 297mm;
            margin: 0 auto 10mm auto; padding: 25mm 20mm;
            background: white; box-shadow: 0 0 10px rgba(0,0,0,0.1);
            page-break-after: always; overflow: hidden;
            display: flex; flex-direction: column;
        }
        @media print {
            body { background: white; }
            .a4-page { margin: 0; box-shadow: none; page-break-after: always; page-break-inside: avoid; }
            .no-print { display: none; }
        }
        .worksheet-content { flex: 1; display: flex; flex-direction: column; }
        .worksheet-title {
            text-align: center; font-size: 20pt; font-weight: bold; color: #003366;
            margin-bottom: 1em; padding-bottom: 0.5em; border-bottom: 3px solid #003366;
        }
        h1 { font-size: 18pt; border-bottom: 2px solid #333; padding-bottom: 0.5em; margin-bottom: 1em; color: #003366; }
        h2 { font-size: 16pt; border-bottom: 1px solid #ddd; margin-top: 1.5em; margin-bottom: 0.8em; color: #003366; }
        h3 {
            font-size: 15pt; margin: 1.5em -10px 0.7em 0; padding: 5px 10px; color: #003366;
            background-color: #e0f7fa; border-right: 5px solid #007bff; page-break-after: avoid;
        }
        img {
            max-width: 100%; height: auto; display: block; margin: 1em auto;
            border: 3px solid #003366; box-shadow: 5px 5px 15px rgba(0,0,0,0.3); page-break-inside: avoid;
        }
        .print-button {
            position: fixed; top: 20px; left: 20px; z-index: 1000;
            background: #007bff; color: white; padding: 15px 30px;
            border: none; border-radius: 5px; font-size: 16pt; cursor: pointer;
            box-shadow: 0 4px 10px rgba(0,0,0,0.3);
        }
        .print-button:hover { background: #0056b3; }"#;

const PRINT_BUTTON: &str =
    r#"<button class="print-button no-print" onclick="window.print()">🖨️ הדפס את כל הדפים</button>"#;

/// Title of the aggregated workbook documents.
pub const WORKBOOK_TITLE: &str = "כל דפי העבודה - כיתה ח' - מוכן להדפסה A4";

fn shell(title: &str, css: &str, body: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html dir="rtl" lang="he">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
{MATHJAX_HEAD}
    <style>{css}
    </style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

/// Print CSS for direct PDF rendering, derived from the page geometry.
pub fn print_css(geometry: &PageGeometry, hebrew_fonts: &[String]) -> String {
    let fonts: Vec<String> = hebrew_fonts.iter().map(|f| format!("'{f}'")).collect();
    format!(
        r#"
        @page {{
            size: {width}cm {height}cm;
            margin-top: {top}cm;
            margin-bottom: {bottom}cm;
            margin-left: {side}cm;
            margin-right: {side}cm;
        }}
        * {{ box-sizing: border-box; }}
        body {{
            direction: rtl; text-align: right;
            font-family: {fonts}, sans-serif; font-size: 12pt; line-height: 1.8;
            margin: 0; padding: 0; color: #000000; background: #ffffff;
        }}
        h1 {{ font-size: 18pt; font-weight: bold; border-bottom: 2px solid #333; padding-bottom: 0.5em; margin: 0 0 1em 0; }}
        h2 {{ font-size: 16pt; font-weight: bold; border-bottom: 1px solid #ddd; margin-top: 1.5em; margin-bottom: 0.8em; }}
        h3 {{ font-size: 14pt; font-weight: bold; margin-top: 1.5em; margin-bottom: 0.7em; color: #003366; }}
        img {{ max-width: {content}cm; height: auto; display: block; margin: 1em auto; page-break-inside: avoid; }}{CONTENT_CSS}"#,
        width = geometry.width_cm,
        height = geometry.height_cm,
        top = geometry.margin_top_cm,
        bottom = geometry.margin_bottom_cm,
        side = geometry.margin_side_cm,
        fonts = fonts.join(","),
        content = geometry.content_width_cm(),
    )
}

/// Single-worksheet document handed to the HTML-based PDF backends.
pub fn pdf_document(html_body: &str, config: &PdfConfig) -> String {
    let css = print_css(&config.geometry, &config.hebrew_fonts);
    shell(&config.document_title, &css, html_body)
}

/// Aggregated workbook: `sheets` are already wrapped in `.a4-page` divs.
pub fn workbook_document(sheets: &str) -> String {
    let css = format!("{A4_SHEET_CSS}{CONTENT_CSS}");
    shell(WORKBOOK_TITLE, &css, &format!("    {PRINT_BUTTON}\n{sheets}"))
}

/// One `.a4-page` sheet around a paginated fragment.
pub fn a4_sheet(fragment_html: &str) -> String {
    format!("<div class=\"a4-page\">{fragment_html}</div>\n")
}

/// One `.a4-page` sheet with a centred title above an unpaginated body.
pub fn titled_sheet(title: &str, html_body: &str) -> String {
    format!(
        "<div class=\"a4-page\"><h1 style=\"text-align: center; font-size: 20pt; margin-bottom: 1em;\">{}</h1>{html_body}</div>\n",
        escape_html(title)
    )
}

/// Static preview page for a single worksheet.
pub fn preview_document(title: &str, html_body: &str) -> String {
    let css = format!(
        r#"
        body {{ font-family: 'Heebo', 'Assistant', sans-serif; direction: rtl; background: #f0f0f0; margin: 0; }}
        .page {{ max-width: 210mm; margin: 10mm auto; padding: 25mm 20mm; background: white; box-shadow: 0 0 10px rgba(0,0,0,0.1); }}
        h1, h2, h3 {{ color: #003366; }}
        img {{ max-width: 100%; height: auto; display: block; margin: 1em auto; }}{CONTENT_CSS}"#
    );
    shell(
        title,
        &css,
        &format!("    <div class=\"page\" id=\"content\">{html_body}</div>"),
    )
}
