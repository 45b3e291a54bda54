//! Free-text to FTS5 query conversion.
//!
//! User input is never handed to `MATCH` as-is. Plain words become quoted
//! prefix terms; input that already uses FTS5 operators is passed through
//! after removing SQL comment and statement separators and closing an
//! unbalanced quote.
//!
//! The index uses the FTS5 `trigram` tokenizer, so a quoted term matches
//! anywhere inside a run of Han characters. Terms shorter than a trigram
//! never match through `MATCH`; [`QueryVariants::needs_substring_scan`]
//! tells callers to search those with a plain substring scan instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::MAX_QUERY_CHARS;

/// Shortest term the trigram index can match.
pub const TRIGRAM_CHARS: usize = 3;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static OPERATOR_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:AND|OR|NOT|NEAR)\b").expect("valid regex"));

/// Strict and loose renderings of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryVariants {
    /// All terms required.
    pub primary: String,
    /// Any term suffices; absent when the primary already is the loosest form.
    pub fallback: Option<String>,
    /// Plain search terms; empty when the input was hand-written FTS5.
    pub terms: Vec<String>,
}

impl QueryVariants {
    /// True when some plain term is too short for the trigram index.
    #[must_use]
    pub fn needs_substring_scan(&self) -> bool {
        self.terms
            .iter()
            .any(|t| t.chars().count() < TRIGRAM_CHARS)
    }
}

/// Build FTS5 query variants from user input.
///
/// # Examples
/// ```
/// use fagui_store::query::build_variants;
///
/// let v = build_variants("个人信息");
/// assert_eq!(v.primary, "\"个人信息\"*");
///
/// let v = build_variants("数据 出境");
/// assert_eq!(v.primary, "\"数据\"* \"出境\"*");
/// assert_eq!(v.fallback.as_deref(), Some("\"数据\"* OR \"出境\"*"));
/// ```
#[must_use]
pub fn build_variants(input: &str) -> QueryVariants {
    let input: String = input.chars().take(MAX_QUERY_CHARS).collect();
    let input = input.trim();

    if has_control_syntax(input) {
        return QueryVariants {
            primary: sanitize_control_query(input),
            fallback: None,
            terms: Vec::new(),
        };
    }

    let tokens: Vec<String> = input
        .split_whitespace()
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .collect::<String>()
        })
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return QueryVariants {
            primary: String::new(),
            fallback: None,
            terms: Vec::new(),
        };
    }

    let quoted: Vec<String> = tokens.iter().map(|t| format!("\"{t}\"*")).collect();
    let fallback = (quoted.len() > 1).then(|| quoted.join(" OR "));

    QueryVariants {
        primary: quoted.join(" "),
        fallback,
        terms: tokens,
    }
}

/// Operator words, quotes, or a trailing prefix star mark hand-written FTS5.
fn has_control_syntax(input: &str) -> bool {
    input.contains('"') || OPERATOR_WORD.is_match(input) || input.ends_with('*')
}

fn sanitize_control_query(input: &str) -> String {
    let mut cleaned = input.to_string();
    for pattern in [";", "--", "/*", "*/"] {
        cleaned = cleaned.replace(pattern, "");
    }
    let cleaned = cleaned.trim().to_string();
    if cleaned.matches('"').count() % 2 == 1 {
        format!("{cleaned}\"")
    } else {
        cleaned
    }
}
