//! Ordered citation matchers.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use super::{Citation, CitationSyntax};
use crate::numerals::{parse_number, NUMERAL_CLASS};

/// A pattern and the syntax it stands for. Evaluated in list order; the
/// first pattern that matches and accepts the captures wins.
struct Matcher {
    syntax: CitationSyntax,
    pattern: Regex,
}

#[allow(clippy::expect_used)] // Static regexes that are guaranteed to be valid
static MATCHERS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    let n = NUMERAL_CLASS;
    let zh_article = format!(r"第\s*(?P<art>[{n}]+)\s*条(?:\s*第\s*(?P<para>[{n}]+)\s*款)?");
    let table = [
        (
            CitationSyntax::Identifier,
            r"^(?P<id>[A-Za-z0-9][A-Za-z0-9._-]*)\s*,\s*(?i:art(?:icle)?\.?)\s*(?P<art>\d+)(?:\s*,\s*(?i:para(?:graph)?\.?)\s*(?P<para>\d+))?\s*$".to_string(),
        ),
        (
            CitationSyntax::ChineseArticleFirst,
            format!(r"^{zh_article}[\s,、]*《?(?P<title>[^《》\s第][^《》]*?)》?\s*$"),
        ),
        (
            CitationSyntax::ChineseTitleFirst,
            format!(r"^《?(?P<title>[^《》\s第][^《》]*?)》?\s*{zh_article}\s*(?:\([^)]*\))?\s*$"),
        ),
        (
            CitationSyntax::English,
            r"(?i)^article\s+(?P<art>\d+)(?:\s*,\s*paragraph\s+(?P<para>\d+))?\s*,\s*(?P<title>[^,\s].*?)\s*$".to_string(),
        ),
        (
            CitationSyntax::Short,
            r"(?i)^art\.?\s*(?P<art>\d+)(?:\s*,\s*para\.?\s*(?P<para>\d+))?\s*,\s*(?P<short>[^,\s][^,]*?)(?:\s+(?P<year>\d{4}))?\s*$".to_string(),
        ),
        (CitationSyntax::Bare, format!(r"^{zh_article}\s*$")),
        (
            CitationSyntax::Bare,
            r"(?i)^art(?:icle|\.)?\s*(?P<art>\d+)(?:\s*\(\s*(?P<para>\d+)\s*\)|\s*,\s*para(?:graph|\.)?\s*(?P<para_alt>\d+))?\s*$".to_string(),
        ),
    ];

    table
        .into_iter()
        .map(|(syntax, pattern)| Matcher {
            syntax,
            pattern: Regex::new(&pattern).expect("valid regex"),
        })
        .collect()
});

/// Names that are really a dangling paragraph marker, e.g. the "Paragraph 2"
/// in `Article 21, Paragraph 2` when no law follows.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARAGRAPH_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^para(?:graph)?\.?\s*\d+$").expect("valid regex"));

/// Parse a free-form citation.
///
/// Never fails: text matching none of the known syntaxes comes back as an
/// invalid [`Citation`] whose `error` says why.
///
/// # Examples
/// ```
/// use fagui_harvester::citation::parse;
///
/// let c = parse("《中华人民共和国个人信息保护法》第二十一条第二款");
/// assert!(c.valid);
/// assert_eq!(c.article.as_deref(), Some("21"));
/// assert_eq!(c.paragraph.as_deref(), Some("2"));
///
/// assert!(!parse("see the privacy law").valid);
/// ```
pub fn parse(text: &str) -> Citation {
    let normalized: String = text.nfkc().collect();
    let normalized = normalized.trim();

    if normalized.is_empty() {
        return Citation::invalid("Empty citation");
    }

    for matcher in MATCHERS.iter() {
        let Some(caps) = matcher.pattern.captures(normalized) else {
            continue;
        };
        if let Some(citation) = build(matcher.syntax, &caps) {
            tracing::trace!(syntax = %matcher.syntax, text = normalized, "Citation matched");
            return citation;
        }
    }

    Citation::invalid(format!(
        "Unrecognised citation format: '{normalized}'. Expected e.g. 《个人信息保护法》第二十一条, \
         Article 21, Personal Information Protection Law, or Art. 21, PIPL 2021"
    ))
}

/// Turn matched captures into a citation. `None` declines the match so the
/// next matcher gets a chance.
fn build(syntax: CitationSyntax, caps: &Captures<'_>) -> Option<Citation> {
    let group = |name: &str| caps.name(name).map(|m| m.as_str().trim());

    for name in ["title", "short"] {
        if group(name).is_some_and(|v| PARAGRAPH_ONLY.is_match(v)) {
            return None;
        }
    }

    let article_raw = group("art")?;
    let Some(article) = parse_number(article_raw) else {
        return Some(Citation::invalid(format!(
            "Article number '{article_raw}' is not a positive integer"
        )));
    };

    let mut citation = Citation::article(article);
    citation.syntax = Some(syntax);

    if let Some(para_raw) = group("para").or_else(|| group("para_alt")) {
        match parse_number(para_raw) {
            Some(p) => citation = citation.with_paragraph(p),
            None => {
                return Some(Citation::invalid(format!(
                    "Paragraph number '{para_raw}' is not a positive integer"
                )))
            }
        }
    }

    match syntax {
        CitationSyntax::Identifier => {
            citation = citation.with_document_id(group("id")?);
        }
        CitationSyntax::ChineseArticleFirst | CitationSyntax::ChineseTitleFirst => {
            citation = citation.with_title(group("title")?);
        }
        CitationSyntax::English => {
            citation = citation.with_title_en(group("title")?);
        }
        CitationSyntax::Short => {
            let year = group("year").and_then(|y| y.parse().ok());
            citation = citation.with_short_name(group("short")?, year);
        }
        CitationSyntax::Bare => {}
    }

    Some(citation)
}
