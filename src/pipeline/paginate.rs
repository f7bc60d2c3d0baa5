//! Heuristic A4 pagination of a worksheet's HTML body.
//!
//! The body is cut into segments at `<h2>` boundaries and poured into page
//! accumulators. Two independent triggers close a page:
//!
//! * **soft**: an `<h2>` arrives while the current page is already longer than
//!   `soft_threshold` characters (only once a continuation page exists);
//! * **hard**: after appending, the page is longer than `hard_threshold`
//!   characters and an `<h3` starts before that offset; the page is cut there.
//!
//! Both may fire for the same segment, soft first. A page with no `<h3`
//! before the hard offset is emitted oversized.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::markdown::escape_html;

static RE_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<h2[^>]*>.*?</h2>").unwrap());

const PAGE_OPEN: &str = r#"<div class="worksheet-content">"#;
const PAGE_CLOSE: &str = "</div>";

/// Length thresholds, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub soft_threshold: usize,
    pub hard_threshold: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            soft_threshold: 3000,
            hard_threshold: 8000,
        }
    }
}

/// One printable page: title banner, content, closing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFragment {
    /// 1-based position in the output.
    pub number: usize,
    /// Complete fragment markup.
    pub html: String,
    body_start: usize,
}

impl PageFragment {
    /// The content between the banner and the closing tag.
    pub fn content(&self) -> &str {
        &self.html[self.body_start..self.html.len() - PAGE_CLOSE.len()]
    }

    /// Serialized length in characters.
    pub fn char_len(&self) -> usize {
        self.html.chars().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Heading(&'a str),
    Content(&'a str),
}

impl<'a> Segment<'a> {
    fn text(self) -> &'a str {
        match self {
            Segment::Heading(s) | Segment::Content(s) => s,
        }
    }
}

struct Accumulator {
    html: String,
    body_start: usize,
}

impl Accumulator {
    fn open(title: &str, continued_page: Option<usize>) -> Self {
        let html = banner(title, continued_page);
        let body_start = html.len();
        Self { html, body_start }
    }

    fn char_len(&self) -> usize {
        self.html.chars().count()
    }

    fn close(mut self, number: usize) -> PageFragment {
        self.html.push_str(PAGE_CLOSE);
        PageFragment {
            number,
            html: self.html,
            body_start: self.body_start,
        }
    }
}

fn banner(title: &str, continued_page: Option<usize>) -> String {
    let title = escape_html(title);
    match continued_page {
        None => format!(r#"{PAGE_OPEN}<h1 class="worksheet-title">{title}</h1>"#),
        Some(n) => {
            format!(r#"{PAGE_OPEN}<h1 class="worksheet-title">{title} (המשך - דף {n})</h1>"#)
        }
    }
}

/// Paginate with the default thresholds.
pub fn paginate(html_body: &str, title: &str) -> Vec<PageFragment> {
    paginate_with(html_body, title, &PaginationConfig::default())
}

/// Split `html_body` into page fragments headed by `title`. Never empty.
pub fn paginate_with(html_body: &str, title: &str, config: &PaginationConfig) -> Vec<PageFragment> {
    let mut pages: Vec<PageFragment> = Vec::new();
    let mut current = Accumulator::open(title, None);
    let mut page_num = 1usize;

    for segment in split_segments(html_body) {
        if segment.text().trim().is_empty() {
            continue;
        }

        if matches!(segment, Segment::Heading(_))
            && current.char_len() > config.soft_threshold
            && page_num > 1
        {
            let number = pages.len() + 1;
            pages.push(current.close(number));
            current = Accumulator::open(title, Some(page_num));
            page_num += 1;
        }

        current.html.push_str(segment.text());

        if current.char_len() > config.hard_threshold {
            if let Some(cut) = last_h3_before(&current.html, config.hard_threshold) {
                let rest = current.html.split_off(cut);
                let number = pages.len() + 1;
                pages.push(current.close(number));
                current = Accumulator::open(title, Some(page_num));
                current.html.push_str(&rest);
                page_num += 1;
            }
        }
    }

    let number = pages.len() + 1;
    pages.push(current.close(number));

    if pages.is_empty() {
        let mut whole = Accumulator::open(title, None);
        whole.html.push_str(html_body);
        pages.push(whole.close(1));
    }

    debug!("Paginated '{}' into {} page(s)", title, pages.len());
    pages
}

/// Split at `<h2>…</h2>` elements, keeping each heading as its own segment.
fn split_segments(html_body: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in RE_H2.find_iter(html_body) {
        segments.push(Segment::Content(&html_body[last..m.start()]));
        segments.push(Segment::Heading(m.as_str()));
        last = m.end();
    }
    segments.push(Segment::Content(&html_body[last..]));
    segments
}

/// Byte index of the last `<h3` lying entirely before character offset
/// `limit`, ignoring a match at index 0.
fn last_h3_before(html: &str, limit: usize) -> Option<usize> {
    let byte_limit = html
        .char_indices()
        .nth(limit)
        .map(|(i, _)| i)
        .unwrap_or(html.len());
    html[..byte_limit].rfind("<h3").filter(|&i| i > 0)
}
