//! Ranked full-text search over articles and definitions.

use rusqlite::{Connection, ToSql};
use serde::Serialize;

use fagui_harvester::types::DocumentStatus;

use crate::config::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use crate::error::{Result, StoreError};
use crate::lookup::parse_column;
use crate::query::build_variants;

/// A search over article text.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub document_id: Option<String>,
    pub status: Option<DocumentStatus>,
    pub language: Option<String>,
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Requested limit clamped to `1..=MAX_SEARCH_LIMIT`.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

/// One matching article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document_id: String,
    pub document_title: String,
    pub status: DocumentStatus,
    pub provision_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub language: String,
    /// Excerpt with matches wrapped in `>>>` and `<<<`.
    pub snippet: String,
    /// bm25 score, lower is better; 0 for substring matches.
    pub rank: f64,
}

/// One matching definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefinitionHit {
    pub document_id: String,
    pub term: String,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_provision: Option<String>,
}

/// Characters kept on each side of a match in substring excerpts.
const EXCERPT_CONTEXT_CHARS: usize = 16;

/// Search article text, best matches first.
///
/// The strict variant (every term) runs first; when it finds nothing and the
/// query has several terms, the loose variant (any term) runs instead.
/// Queries with a one or two character term are answered by a substring
/// scan in article order, since the trigram index cannot see them.
pub fn search(conn: &Connection, request: &SearchRequest) -> Result<Vec<SearchHit>> {
    let variants = build_variants(&request.query);
    if variants.primary.is_empty() {
        return Ok(Vec::new());
    }

    if variants.needs_substring_scan() {
        let hits = run_substring_query(conn, &variants.terms, true, request)?;
        if !hits.is_empty() || variants.terms.len() < 2 {
            return Ok(hits);
        }
        tracing::debug!(query = %request.query, "No strict matches, trying any-term scan");
        return run_substring_query(conn, &variants.terms, false, request);
    }

    let hits = run_provision_query(conn, &variants.primary, request)?;
    if !hits.is_empty() {
        return Ok(hits);
    }

    match variants.fallback {
        Some(fallback) => {
            tracing::debug!(query = %request.query, "No strict matches, trying any-term query");
            run_provision_query(conn, &fallback, request)
        }
        None => Ok(hits),
    }
}

fn push_filters(sql: &mut String, params: &mut Vec<Box<dyn ToSql>>, request: &SearchRequest) {
    if let Some(document_id) = &request.document_id {
        sql.push_str(" AND p.document_id = ?");
        params.push(Box::new(document_id.clone()));
    }

    if let Some(status) = request.status {
        sql.push_str(" AND d.status = ?");
        params.push(Box::new(status.to_string()));
    }

    if let Some(language) = &request.language {
        sql.push_str(" AND p.language = ?");
        params.push(Box::new(language.clone()));
    }
}

fn run_provision_query(
    conn: &Connection,
    fts_query: &str,
    request: &SearchRequest,
) -> Result<Vec<SearchHit>> {
    let mut sql = String::from(
        "SELECT p.document_id, d.title, d.status, p.provision_ref, p.title, p.language,
                snippet(provisions_fts, 0, '>>>', '<<<', '...', 32),
                bm25(provisions_fts) AS rank
         FROM provisions_fts
         JOIN legal_provisions p ON p.id = provisions_fts.rowid
         JOIN legal_documents d ON d.id = p.document_id
         WHERE provisions_fts MATCH ?",
    );
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(fts_query.to_string())];
    push_filters(&mut sql, &mut params, request);

    sql.push_str(" ORDER BY rank LIMIT ?");
    params.push(Box::new(request.effective_limit() as i64));

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let hits = stmt
        .query_map(&param_refs[..], |row| {
            Ok(SearchHit {
                document_id: row.get(0)?,
                document_title: row.get(1)?,
                status: parse_column(row, 2)?,
                provision_ref: row.get(3)?,
                title: row.get(4)?,
                language: row.get(5)?,
                snippet: row.get(6)?,
                rank: row.get(7)?,
            })
        })
        .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
        .map_err(fts_error)?;

    Ok(hits)
}

/// `instr` over article text and title, every term (`require_all`) or any.
fn run_substring_query(
    conn: &Connection,
    terms: &[String],
    require_all: bool,
    request: &SearchRequest,
) -> Result<Vec<SearchHit>> {
    let condition = "(instr(lower(p.content), lower(?)) > 0 \
                     OR instr(lower(coalesce(p.title, '')), lower(?)) > 0)";
    let joiner = if require_all { " AND " } else { " OR " };

    let mut sql = String::from(
        "SELECT p.document_id, d.title, d.status, p.provision_ref, p.title, p.language, p.content
         FROM legal_provisions p
         JOIN legal_documents d ON d.id = p.document_id
         WHERE (",
    );
    sql.push_str(&vec![condition; terms.len()].join(joiner));
    sql.push(')');

    let mut params: Vec<Box<dyn ToSql>> = Vec::new();
    for term in terms {
        params.push(Box::new(term.clone()));
        params.push(Box::new(term.clone()));
    }
    push_filters(&mut sql, &mut params, request);

    sql.push_str(" ORDER BY p.document_id, CAST(p.provision_ref AS INTEGER) LIMIT ?");
    params.push(Box::new(request.effective_limit() as i64));

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let hits = stmt
        .query_map(&param_refs[..], |row| {
            let content: String = row.get(6)?;
            Ok(SearchHit {
                document_id: row.get(0)?,
                document_title: row.get(1)?,
                status: parse_column(row, 2)?,
                provision_ref: row.get(3)?,
                title: row.get(4)?,
                language: row.get(5)?,
                snippet: excerpt(&content, terms),
                rank: 0.0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(hits)
}

/// Text around the earliest matching term, marked the way FTS5 snippets are.
///
/// Matching folds ASCII case only, like SQLite's `lower()`, so byte offsets
/// in the folded copy are valid in the original.
fn excerpt(content: &str, terms: &[String]) -> String {
    let haystack = content.to_ascii_lowercase();
    let first = terms
        .iter()
        .filter_map(|term| {
            let needle = term.to_ascii_lowercase();
            haystack.find(&needle).map(|at| (at, at + needle.len()))
        })
        .min();

    let Some((start, end)) = first else {
        return content.chars().take(EXCERPT_CONTEXT_CHARS * 2).collect();
    };

    let from = content[..start]
        .char_indices()
        .rev()
        .nth(EXCERPT_CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let to = content[end..]
        .char_indices()
        .nth(EXCERPT_CONTEXT_CHARS)
        .map_or(content.len(), |(i, _)| end + i);

    let mut snippet = String::new();
    if from > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(&content[from..start]);
    snippet.push_str(">>>");
    snippet.push_str(&content[start..end]);
    snippet.push_str("<<<");
    snippet.push_str(&content[end..to]);
    if to < content.len() {
        snippet.push_str("...");
    }
    snippet
}

/// Search defined terms and their definitions.
pub fn search_definitions(conn: &Connection, query: &str, limit: usize) -> Result<Vec<DefinitionHit>> {
    let variants = build_variants(query);
    if variants.primary.is_empty() {
        return Ok(Vec::new());
    }
    let limit = limit.clamp(1, MAX_SEARCH_LIMIT) as i64;

    if variants.needs_substring_scan() {
        let hits = run_definition_scan(conn, &variants.terms, true, limit)?;
        if !hits.is_empty() || variants.terms.len() < 2 {
            return Ok(hits);
        }
        return run_definition_scan(conn, &variants.terms, false, limit);
    }

    let mut stmt = conn.prepare(
        "SELECT d.document_id, d.term, d.definition, d.source_provision
         FROM definitions_fts
         JOIN definitions d ON d.id = definitions_fts.rowid
         WHERE definitions_fts MATCH ?1
         ORDER BY bm25(definitions_fts)
         LIMIT ?2",
    )?;

    let mut run = |fts_query: &str| {
        stmt.query_map(rusqlite::params![fts_query, limit], definition_from_row)
            .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(fts_error)
    };

    let hits = run(&variants.primary)?;
    match variants.fallback {
        Some(fallback) if hits.is_empty() => run(&fallback),
        _ => Ok(hits),
    }
}

fn run_definition_scan(
    conn: &Connection,
    terms: &[String],
    require_all: bool,
    limit: i64,
) -> Result<Vec<DefinitionHit>> {
    let condition = "(instr(lower(d.term), lower(?)) > 0 OR instr(lower(d.definition), lower(?)) > 0)";
    let joiner = if require_all { " AND " } else { " OR " };

    let mut sql = String::from(
        "SELECT d.document_id, d.term, d.definition, d.source_provision
         FROM definitions d
         WHERE ",
    );
    sql.push_str(&vec![condition; terms.len()].join(joiner));
    sql.push_str(" ORDER BY d.document_id, d.term LIMIT ?");

    let mut params: Vec<Box<dyn ToSql>> = Vec::new();
    for term in terms {
        params.push(Box::new(term.clone()));
        params.push(Box::new(term.clone()));
    }
    params.push(Box::new(limit));

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let hits = stmt
        .query_map(&param_refs[..], definition_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(hits)
}

fn definition_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DefinitionHit> {
    Ok(DefinitionHit {
        document_id: row.get(0)?,
        term: row.get(1)?,
        definition: row.get(2)?,
        source_provision: row.get(3)?,
    })
}

/// FTS5 reports malformed queries as plain SQL errors; surface those as
/// caller mistakes rather than database faults.
fn fts_error(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(_, Some(message)) if message.contains("fts5") => {
            StoreError::InvalidInput(format!("malformed search query: {message}"))
        }
        _ => StoreError::Database(e),
    }
}
