//! Loading harvested artifacts into the store.
//!
//! A build is one transaction: every document, article, definition and
//! cross reference of the batch lands, or none does. Rows are upserted, so
//! loading the same artifacts twice leaves the store unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use fagui_harvester::artifact::DocumentArtifact;
use fagui_harvester::config::SOURCE_LANGUAGE;
use fagui_harvester::types::{CrossReferenceDecl, Definition, Document, Provision};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::schema::{self, SCHEMA_VERSION};

/// Row counts touched by one [`Builder::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub documents: usize,
    pub provisions: usize,
    pub definitions: usize,
    /// Cross references inserted by this load.
    pub cross_references: usize,
    /// Cross references already present and skipped.
    pub duplicate_cross_references: usize,
    /// Provision-level cross references whose article is not in the store.
    pub unresolved_provisions: usize,
}

/// Loads artifacts into an open store connection.
pub struct Builder<'c> {
    conn: &'c mut Connection,
    tier: String,
    source: String,
}

impl<'c> Builder<'c> {
    pub fn new(conn: &'c mut Connection, config: &StoreConfig) -> Self {
        Self {
            conn,
            tier: config.tier.clone(),
            source: config.source.clone(),
        }
    }

    /// Load a batch of artifacts and rewrite the build metadata.
    ///
    /// Duplicate cross references are skipped; any other failure rolls the
    /// whole batch back.
    pub fn load(&mut self, artifacts: &[DocumentArtifact]) -> Result<LoadSummary> {
        let tx = self.conn.transaction()?;
        let mut summary = LoadSummary::default();

        for artifact in artifacts {
            let document = &artifact.document;
            tracing::debug!(document_id = %document.id, "Loading document");

            upsert_document(&tx, document)?;
            summary.documents += 1;

            for provision in &artifact.provisions {
                upsert_provision(&tx, &document.id, provision)?;
                summary.provisions += 1;
            }

            for definition in &artifact.definitions {
                upsert_definition(&tx, &document.id, definition)?;
                summary.definitions += 1;
            }

            for xref in &artifact.cross_references {
                insert_cross_reference(&tx, &document.id, xref, &mut summary)?;
            }
        }

        write_metadata(&tx, &self.tier, &self.source)?;
        tx.commit()?;

        tracing::info!(
            documents = summary.documents,
            provisions = summary.provisions,
            definitions = summary.definitions,
            cross_references = summary.cross_references,
            duplicates = summary.duplicate_cross_references,
            "Batch loaded"
        );
        Ok(summary)
    }

    /// Refresh planner statistics, merge FTS segments and compact the file.
    pub fn optimize(&self) -> Result<()> {
        self.conn.execute_batch(
            "ANALYZE;
             INSERT INTO provisions_fts(provisions_fts) VALUES ('optimize');
             INSERT INTO definitions_fts(definitions_fts) VALUES ('optimize');
             VACUUM;",
        )?;
        Ok(())
    }
}

fn upsert_document(tx: &Transaction<'_>, document: &Document) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO legal_documents
             (id, type, title, title_en, short_name, status, issued_date, in_force_date, url, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
             type = excluded.type,
             title = excluded.title,
             title_en = excluded.title_en,
             short_name = excluded.short_name,
             status = excluded.status,
             issued_date = excluded.issued_date,
             in_force_date = excluded.in_force_date,
             url = excluded.url,
             description = excluded.description",
    )?;
    stmt.execute(params![
        document.id,
        document.kind.to_string(),
        document.title,
        document.title_en,
        document.short_name,
        document.status.to_string(),
        document.issued_date,
        document.in_force_date,
        document.url,
        document.description,
    ])?;
    Ok(())
}

fn language_of(provision: &Provision) -> &str {
    let language = provision.language.trim();
    if language.is_empty() {
        SOURCE_LANGUAGE
    } else {
        language
    }
}

fn upsert_provision(tx: &Transaction<'_>, document_id: &str, provision: &Provision) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO legal_provisions
             (document_id, provision_ref, chapter, section, title, content, language)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(document_id, provision_ref, language) DO UPDATE SET
             chapter = excluded.chapter,
             section = excluded.section,
             title = excluded.title,
             content = excluded.content",
    )?;
    stmt.execute(params![
        document_id,
        provision.provision_ref.trim(),
        provision.chapter,
        provision.section,
        provision.title,
        provision.content,
        language_of(provision),
    ])?;
    Ok(())
}

fn upsert_definition(tx: &Transaction<'_>, document_id: &str, definition: &Definition) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO definitions (document_id, term, definition, source_provision)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(document_id, term) DO UPDATE SET
             definition = excluded.definition,
             source_provision = excluded.source_provision",
    )?;
    stmt.execute(params![
        document_id,
        definition.term,
        definition.definition,
        definition.source_provision,
    ])?;
    Ok(())
}

/// Look up the instrument by its natural key, creating it on first sight.
fn ensure_instrument(tx: &Transaction<'_>, xref: &CrossReferenceDecl) -> Result<String> {
    tx.prepare_cached(
        "INSERT OR IGNORE INTO external_instruments (id, type, year, number, title, short_name, url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?
    .execute(params![
        xref.external_id,
        xref.instrument_type.to_string(),
        xref.year,
        xref.number,
        xref.title,
        xref.short_name,
        xref.instrument_url(),
    ])?;

    let id: Option<String> = tx
        .prepare_cached(
            "SELECT id FROM external_instruments WHERE type = ?1 AND year = ?2 AND number = ?3",
        )?
        .query_row(
            params![xref.instrument_type.to_string(), xref.year, xref.number],
            |row| row.get(0),
        )
        .optional()?;

    id.ok_or_else(|| {
        StoreError::InvalidInput(format!(
            "instrument id '{}' is already used by a different {} {}/{}",
            xref.external_id, xref.instrument_type, xref.year, xref.number
        ))
    })
}

fn insert_cross_reference(
    tx: &Transaction<'_>,
    document_id: &str,
    xref: &CrossReferenceDecl,
    summary: &mut LoadSummary,
) -> Result<()> {
    let instrument_id = ensure_instrument(tx, xref)?;

    let (source_type, source_id, provision_id) = match xref.provision_ref.as_deref() {
        Some(provision_ref) => {
            let provision_id: Option<i64> = tx
                .prepare_cached(
                    "SELECT id FROM legal_provisions
                     WHERE document_id = ?1 AND provision_ref = ?2 AND language = ?3",
                )?
                .query_row(params![document_id, provision_ref, SOURCE_LANGUAGE], |row| row.get(0))
                .optional()?;
            if provision_id.is_none() {
                summary.unresolved_provisions += 1;
                tracing::warn!(
                    document_id,
                    provision_ref,
                    instrument = %instrument_id,
                    "Cross reference starts at an article that is not in the store"
                );
            }
            ("provision", format!("{document_id}:{provision_ref}"), provision_id)
        }
        None => ("document", document_id.to_string(), None),
    };

    let result = tx
        .prepare_cached(
            "INSERT INTO cross_references
                 (source_type, source_id, document_id, provision_id, instrument_id, article,
                  reference_type, is_primary, implementation_status, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?
        .execute(params![
            source_type,
            source_id,
            document_id,
            provision_id,
            instrument_id,
            xref.article.as_deref().unwrap_or_default(),
            xref.kind.to_string(),
            xref.is_primary,
            xref.implementation_status.to_string(),
            xref.description,
        ]);

    match result {
        Ok(_) => {
            summary.cross_references += 1;
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            summary.duplicate_cross_references += 1;
            tracing::debug!(
                source_id = %source_id,
                instrument = %instrument_id,
                "Cross reference already present"
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn write_metadata(tx: &Transaction<'_>, tier: &str, source: &str) -> Result<()> {
    let document_count: i64 =
        tx.query_row("SELECT COUNT(*) FROM legal_documents", [], |row| row.get(0))?;
    let provision_count: i64 =
        tx.query_row("SELECT COUNT(*) FROM legal_provisions", [], |row| row.get(0))?;
    let built_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    tx.execute("DELETE FROM build_metadata", [])?;
    let mut stmt = tx.prepare("INSERT INTO build_metadata (key, value) VALUES (?1, ?2)")?;
    for (key, value) in [
        ("tier", tier.to_string()),
        ("schema_version", SCHEMA_VERSION.to_string()),
        ("built_at", built_at),
        ("source", source.to_string()),
        ("document_count", document_count.to_string()),
        ("provision_count", provision_count.to_string()),
    ] {
        stmt.execute(params![key, value])?;
    }
    Ok(())
}

/// Read the build metadata as key/value pairs, sorted by key.
pub fn read_metadata(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM build_metadata ORDER BY key")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Build a fresh store at `config.db_path` from `artifacts`.
///
/// The store is built in a sibling temp file and renamed over the target
/// only once loading and maintenance succeed, so a failed build leaves the
/// previous store in place.
pub fn build_store(config: &StoreConfig, artifacts: &[DocumentArtifact]) -> Result<LoadSummary> {
    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(&config.db_path);
    remove_if_exists(&temp_path)?;

    let outcome = (|| -> Result<LoadSummary> {
        let mut conn = schema::open(&temp_path)?;
        let mut builder = Builder::new(&mut conn, config);
        let summary = builder.load(artifacts)?;
        builder.optimize()?;
        conn.close().map_err(|(_, e)| StoreError::Database(e))?;
        Ok(summary)
    })();

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(error = %e, "Build failed, keeping previous store");
            remove_if_exists(&temp_path)?;
            return Err(e);
        }
    };

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    remove_if_exists(&config.db_path)?;

    fs::rename(&temp_path, &config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "Store written");
    Ok(summary)
}

fn temp_path_for(db_path: &Path) -> PathBuf {
    let mut name = db_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "database.db".into());
    name.push(".building");
    db_path.with_file_name(name)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
