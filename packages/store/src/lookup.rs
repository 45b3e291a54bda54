//! Exact lookups: documents, articles and citation validation.

use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use fagui_harvester::citation::{self, Citation, CitationStyle};
use fagui_harvester::numerals::parse_number;
use fagui_harvester::types::{Document, DocumentStatus, Provision};

use crate::config::MAX_PROVISION_LISTING;
use crate::error::{Result, StoreError};

/// Parse a text column into a closed enum.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

const DOCUMENT_COLUMNS: &str =
    "id, type, title, title_en, short_name, status, issued_date, in_force_date, url, description";

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        kind: parse_column(row, 1)?,
        title: row.get(2)?,
        title_en: row.get(3)?,
        short_name: row.get(4)?,
        status: parse_column(row, 5)?,
        issued_date: row.get(6)?,
        in_force_date: row.get(7)?,
        url: row.get(8)?,
        description: row.get(9)?,
    })
}

fn provision_from_row(row: &Row<'_>) -> rusqlite::Result<Provision> {
    Ok(Provision {
        document_id: row.get(0)?,
        provision_ref: row.get(1)?,
        chapter: row.get(2)?,
        section: row.get(3)?,
        title: row.get(4)?,
        content: row.get(5)?,
        language: row.get(6)?,
    })
}

/// Find a document by exact id, then short name, then title substring
/// (Chinese or English). The shortest matching title wins.
pub fn resolve_document(conn: &Connection, needle: &str) -> Result<Document> {
    let needle = needle.trim().trim_start_matches('《').trim_end_matches('》');
    if needle.is_empty() {
        return Err(StoreError::InvalidInput("document name is empty".to_string()));
    }

    let queries = [
        format!("SELECT {DOCUMENT_COLUMNS} FROM legal_documents WHERE id = ?1"),
        format!(
            "SELECT {DOCUMENT_COLUMNS} FROM legal_documents
             WHERE short_name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1"
        ),
        format!(
            "SELECT {DOCUMENT_COLUMNS} FROM legal_documents
             WHERE instr(title, ?1) > 0 OR instr(lower(title_en), lower(?1)) > 0
             ORDER BY length(title), id LIMIT 1"
        ),
    ];

    for sql in &queries {
        let found = conn
            .query_row(sql, params![needle], document_from_row)
            .optional()?;
        if let Some(document) = found {
            return Ok(document);
        }
    }

    Err(StoreError::UnknownDocument(needle.to_string()))
}

/// Normalize an article reference given as `21`, `２１`, `二十一` or `第二十一条`.
#[must_use]
pub fn normalize_provision_ref(raw: &str) -> String {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix('第')
        .unwrap_or(trimmed)
        .trim_end_matches('条')
        .trim();
    parse_number(bare).map_or_else(|| trimmed.to_string(), |n| n.to_string())
}

/// Result of [`get_provision`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionLookup {
    pub document: Document,
    /// The requested article, or the first articles in order when none was requested.
    pub provisions: Vec<Provision>,
    /// Articles the document has in total.
    pub total: usize,
    /// Whether `provisions` is a cut-down listing.
    pub truncated: bool,
}

/// Fetch one article of a document, or list the document's articles.
///
/// An unknown article yields an empty `provisions` list; an unknown document
/// is an error.
pub fn get_provision(
    conn: &Connection,
    document: &str,
    provision_ref: Option<&str>,
) -> Result<ProvisionLookup> {
    let document = resolve_document(conn, document)?;

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM legal_provisions WHERE document_id = ?1",
        params![document.id],
        |row| row.get(0),
    )?;
    let total = usize::try_from(total).unwrap_or_default();

    let provisions = match provision_ref {
        Some(raw) => {
            let wanted = normalize_provision_ref(raw);
            let mut stmt = conn.prepare(
                "SELECT document_id, provision_ref, chapter, section, title, content, language
                 FROM legal_provisions
                 WHERE document_id = ?1 AND provision_ref = ?2
                 ORDER BY language",
            )?;
            let rows = stmt
                .query_map(params![document.id, wanted], provision_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT document_id, provision_ref, chapter, section, title, content, language
                 FROM legal_provisions
                 WHERE document_id = ?1
                 ORDER BY CAST(provision_ref AS INTEGER), provision_ref, language
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(
                    params![document.id, MAX_PROVISION_LISTING as i64],
                    provision_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };

    let truncated = provision_ref.is_none() && total > provisions.len();
    Ok(ProvisionLookup {
        document,
        provisions,
        total,
        truncated,
    })
}

/// Outcome of [`validate_citation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationValidation {
    /// True when the law and the article both exist.
    pub valid: bool,
    pub citation: Citation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub provision_exists: bool,
    /// Canonical Chinese form, when the law was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Parse a citation and check it against the store.
pub fn validate_citation(conn: &Connection, text: &str) -> Result<CitationValidation> {
    let citation = citation::parse(text);
    let mut outcome = CitationValidation {
        valid: false,
        citation,
        document_id: None,
        provision_exists: false,
        formatted: None,
        warnings: Vec::new(),
    };

    if !outcome.citation.valid {
        return Ok(outcome);
    }

    let candidates = [
        outcome.citation.document_id.clone(),
        outcome.citation.short_name.clone(),
        outcome.citation.title.clone(),
        outcome.citation.title_en.clone(),
    ];
    let names: Vec<String> = candidates.into_iter().flatten().collect();
    if names.is_empty() {
        outcome
            .warnings
            .push("Citation does not name a law".to_string());
        return Ok(outcome);
    }

    let mut document = None;
    for name in &names {
        match resolve_document(conn, name) {
            Ok(found) => {
                document = Some(found);
                break;
            }
            Err(StoreError::UnknownDocument(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    let Some(document) = document else {
        outcome
            .warnings
            .push(format!("Law not found in the corpus: {}", names[0]));
        return Ok(outcome);
    };

    if let Some(article) = outcome.citation.article.as_deref() {
        outcome.provision_exists = conn
            .query_row(
                "SELECT 1 FROM legal_provisions WHERE document_id = ?1 AND provision_ref = ?2 LIMIT 1",
                params![document.id, article],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !outcome.provision_exists {
            outcome
                .warnings
                .push(format!("Article {article} not found in {}", document.title));
        }
    }

    match document.status {
        DocumentStatus::Repealed => outcome
            .warnings
            .push(format!("{} has been repealed", document.title)),
        DocumentStatus::Amended => outcome.warnings.push(format!(
            "{} has been amended; check the current text",
            document.title
        )),
        DocumentStatus::NotYetInForce => outcome.warnings.push(match &document.in_force_date {
            Some(date) => format!("{} is not yet in force (effective {date})", document.title),
            None => format!("{} is not yet in force", document.title),
        }),
        DocumentStatus::InForce => {}
    }

    let canonical = Citation {
        title: Some(document.title.clone()),
        title_en: document.title_en.clone(),
        short_name: document.short_name.clone(),
        document_id: Some(document.id.clone()),
        ..outcome.citation.clone()
    };
    outcome.formatted = Some(citation::format(&canonical, CitationStyle::Chinese));
    outcome.valid = outcome.provision_exists;
    outcome.document_id = Some(document.id);

    Ok(outcome)
}
