//! Article extraction from retrieved HTML pages.
//!
//! A page is reduced to an ordered list of paragraphs taken from the law body
//! container, then scanned once: `第N条` followed by a space, a colon or
//! nothing opens an article, `第N章/节/编` headings are dropped, everything
//! else inside an article is its body. A paragraph such as `第九条规定的…`
//! is a reference to another article and stays in the current body.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use unicode_normalization::UnicodeNormalization;

use crate::config::{CONTENT_SELECTORS, MIN_CONTAINER_CHARS};
use crate::numerals::{parse_number, NUMERAL_CLASS};
use crate::types::Provision;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^第\s*([{NUMERAL_CLASS}]+)\s*条(?:[\s:]|$)")).expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^第\s*[{NUMERAL_CLASS}]+\s*(?:分编|编|章|节)(.*)$"))
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static selectors that are guaranteed to be valid
static CONTAINER_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));

/// Extract the articles of one document from its HTML page.
///
/// Never fails: a page without a recognisable body or without article
/// markers yields an empty list, which callers store as a document without
/// text. Each provision carries the arabic article number as both
/// `provision_ref` and `section`.
pub fn extract(
    raw_html: &str,
    document_id: &str,
    title: &str,
    title_en: Option<&str>,
    language: &str,
) -> Vec<Provision> {
    let paragraphs = collect_paragraphs(raw_html);
    let provisions = segment(&paragraphs, document_id, language);

    if provisions.is_empty() {
        tracing::warn!(
            document_id,
            title,
            title_en,
            paragraphs = paragraphs.len(),
            "No articles found in page"
        );
    } else {
        tracing::debug!(document_id, count = provisions.len(), "Extracted articles");
    }

    provisions
}

/// Reduce a page to trimmed, non-empty paragraphs in document order.
pub fn collect_paragraphs(raw_html: &str) -> Vec<String> {
    let document = Html::parse_document(raw_html);
    let container = find_container(&document);

    let mut paragraphs: Vec<String> = container
        .select(&PARAGRAPH)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    if paragraphs.is_empty() {
        paragraphs = container
            .text()
            .collect::<Vec<_>>()
            .join("\n")
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
    }

    paragraphs
}

/// First container whose text is long enough, else the whole page.
fn find_container(document: &Html) -> ElementRef<'_> {
    for selector in CONTAINER_SELECTORS.iter() {
        if let Some(candidate) = document.select(selector).next() {
            let chars = candidate.text().map(|t| t.trim().chars().count()).sum::<usize>();
            if chars > MIN_CONTAINER_CHARS {
                return candidate;
            }
        }
    }
    document.root_element()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

struct OpenArticle {
    number: u32,
    lines: Vec<String>,
}

impl OpenArticle {
    fn finish(self, document_id: &str, language: &str) -> Provision {
        Provision::new(document_id, self.number.to_string(), self.lines.join("\n"))
            .with_language(language)
    }
}

/// Split paragraphs into articles.
pub fn segment(paragraphs: &[String], document_id: &str, language: &str) -> Vec<Provision> {
    let mut provisions = Vec::new();
    let mut current: Option<OpenArticle> = None;

    for paragraph in paragraphs {
        let normalized: String = paragraph.nfkc().collect();
        let normalized = normalized.trim();

        if let Some(number) = article_number(normalized) {
            if let Some(open) = current.take() {
                provisions.push(open.finish(document_id, language));
            }
            let mut lines = Vec::new();
            let rest = body_after_marker(paragraph);
            if !rest.is_empty() {
                lines.push(rest.to_string());
            }
            current = Some(OpenArticle { number, lines });
            continue;
        }

        if is_heading(normalized) {
            continue;
        }

        if let Some(open) = current.as_mut() {
            open.lines.push(paragraph.clone());
        }
    }

    if let Some(open) = current {
        provisions.push(open.finish(document_id, language));
    }

    provisions
}

fn article_number(normalized: &str) -> Option<u32> {
    let caps = ARTICLE_MARKER.captures(normalized)?;
    parse_number(caps.get(1)?.as_str())
}

/// Chapter/section/part headings: the unit glyph is followed by a space, by
/// nothing, or by a short caption without sentence punctuation.
fn is_heading(normalized: &str) -> bool {
    let Some(caps) = HEADING_MARKER.captures(normalized) else {
        return false;
    };
    let rest = caps.get(1).map_or("", |m| m.as_str());
    rest.is_empty()
        || rest.starts_with(char::is_whitespace)
        || (rest.chars().count() <= 30 && !rest.contains(['。', '，', '；', ',', ';']))
}

/// Text following the `条` of the marker, taken from the unnormalized paragraph.
fn body_after_marker(paragraph: &str) -> &str {
    paragraph
        .split_once('条')
        .map(|(_, rest)| rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == '：'))
        .unwrap_or("")
        .trim_end()
}
