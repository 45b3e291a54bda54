//! Ingestion run that ties fetcher, extractor and artifacts together.

use std::collections::HashSet;

use crate::artifact::{artifact_path, save_artifact, DocumentArtifact};
use crate::config::HarvestConfig;
use crate::dedup::dedupe;
use crate::definitions::extract_definitions;
use crate::error::Result;
use crate::extract::extract;
use crate::http::Fetcher;
use crate::manifest::{SourceDocument, SourceManifest};

/// What happened to one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Artifact already present; nothing fetched.
    Skipped,
    /// Fetched and written.
    Harvested { provisions: usize, conflicts: usize },
    /// Fetch or write failed; no artifact left behind.
    Failed(String),
}

/// Totals for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub harvested: usize,
    pub skipped: usize,
    pub failed: usize,
    pub provisions: usize,
    pub conflicts: usize,
    /// `(document_id, reason)` for every failed document.
    pub failures: Vec<(String, String)>,
}

impl HarvestReport {
    fn record(&mut self, document_id: &str, outcome: &DocumentOutcome) {
        match outcome {
            DocumentOutcome::Skipped => self.skipped += 1,
            DocumentOutcome::Harvested {
                provisions,
                conflicts,
            } => {
                self.harvested += 1;
                self.provisions += provisions;
                self.conflicts += conflicts;
            }
            DocumentOutcome::Failed(reason) => {
                self.failed += 1;
                self.failures.push((document_id.to_string(), reason.clone()));
            }
        }
    }
}

/// Sequential harvester over a source manifest.
#[derive(Debug)]
pub struct Harvester {
    config: HarvestConfig,
    fetcher: Fetcher,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Harvest every manifest entry in order.
    ///
    /// A document whose fetch fails is counted and the run moves on; only
    /// problems that make the whole run pointless (an unusable output
    /// directory) abort it. `on_document` is called after each entry.
    pub fn run(
        &self,
        manifest: &SourceManifest,
        mut on_document: impl FnMut(&SourceDocument, &DocumentOutcome),
    ) -> Result<HarvestReport> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let mut report = HarvestReport::default();

        for entry in &manifest.documents {
            let outcome = self.harvest_entry(entry)?;
            report.record(&entry.document.id, &outcome);
            on_document(entry, &outcome);
        }

        tracing::info!(
            harvested = report.harvested,
            skipped = report.skipped,
            failed = report.failed,
            provisions = report.provisions,
            "Harvest finished"
        );
        Ok(report)
    }

    fn harvest_entry(&self, entry: &SourceDocument) -> Result<DocumentOutcome> {
        let id = entry.document.id.as_str();
        let target = artifact_path(&self.config.output_dir, id)?;
        if target.exists() {
            tracing::debug!(document_id = id, "Artifact exists, skipping");
            return Ok(DocumentOutcome::Skipped);
        }

        let raw_html = match self.fetcher.fetch_text(&entry.document.url) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(document_id = id, error = %e, "Fetch failed");
                return Ok(DocumentOutcome::Failed(e.to_string()));
            }
        };

        let artifact = build_artifact(entry, &raw_html);
        let outcome = DocumentOutcome::Harvested {
            provisions: artifact.provisions.len(),
            conflicts: artifact.dedup.conflicts,
        };

        if let Err(e) = save_artifact(&artifact, &self.config.output_dir) {
            tracing::warn!(document_id = id, error = %e, "Writing artifact failed");
            return Ok(DocumentOutcome::Failed(e.to_string()));
        }

        Ok(outcome)
    }
}

/// Turn a fetched page into an artifact: extract, dedupe, collect
/// definitions and note anything worth a second look.
#[must_use]
pub fn build_artifact(entry: &SourceDocument, raw_html: &str) -> DocumentArtifact {
    let document = &entry.document;
    let extracted = extract(
        raw_html,
        &document.id,
        &document.title,
        document.title_en.as_deref(),
        crate::config::SOURCE_LANGUAGE,
    );
    let (provisions, dedup) = dedupe(extracted);
    let definitions = extract_definitions(&provisions);

    let mut warnings = Vec::new();
    if provisions.is_empty() {
        warnings.push(format!("No articles found at {}", document.url));
    }
    if dedup.conflicts > 0 {
        warnings.push(format!(
            "{} duplicate article(s) with differing content",
            dedup.conflicts
        ));
    }

    let refs: HashSet<&str> = provisions.iter().map(|p| p.provision_ref.as_str()).collect();
    for xref in &entry.cross_references {
        if let Some(provision_ref) = xref.provision_ref.as_deref() {
            if !refs.contains(provision_ref) {
                warnings.push(format!(
                    "Cross reference to {} starts at article {provision_ref}, which was not extracted",
                    xref.external_id
                ));
            }
        }
    }

    let mut artifact = DocumentArtifact::new(document.clone());
    artifact.provisions = provisions;
    artifact.definitions = definitions;
    artifact.cross_references = entry.cross_references.clone();
    artifact.dedup = dedup;
    artifact.warnings = warnings;
    artifact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CrossReferenceDecl, Document, DocumentKind, DocumentStatus, ImplementationStatus,
        InstrumentType, RelationKind,
    };
    use pretty_assertions::assert_eq;

    fn entry() -> SourceDocument {
        SourceDocument {
            document: Document {
                id: "CSL-2016".to_string(),
                kind: DocumentKind::Statute,
                title: "中华人民共和国网络安全法".to_string(),
                title_en: Some("Cybersecurity Law".to_string()),
                short_name: Some("CSL".to_string()),
                status: DocumentStatus::Amended,
                issued_date: None,
                in_force_date: None,
                url: "https://example.org/csl".to_string(),
                description: None,
            },
            cross_references: vec![CrossReferenceDecl {
                external_id: "nis2".to_string(),
                instrument_type: InstrumentType::Directive,
                year: 2022,
                number: 2555,
                title: None,
                short_name: Some("NIS2".to_string()),
                url: None,
                kind: RelationKind::SeeAlso,
                is_primary: false,
                article: None,
                provision_ref: Some("99".to_string()),
                implementation_status: ImplementationStatus::Unknown,
                description: None,
            }],
        }
    }

    #[test]
    fn test_build_artifact_full_pipeline() {
        let html = "<div id=\"zoom\">\
            <p>第一条 为了保障网络安全，制定本法。</p>\
            <p>第七十六条 本法所称网络，是指由计算机或者其他信息终端及相关设备组成的系统。</p>\
            <p>第七十六条 本法所称网络，是指由计算机或者其他信息终端及相关设备组成的系统。</p>\
            </div>";
        let artifact = build_artifact(&entry(), html);

        assert_eq!(artifact.provisions.len(), 2);
        assert_eq!(artifact.dedup.duplicates, 1);
        assert_eq!(artifact.dedup.conflicts, 0);
        assert_eq!(artifact.definitions.len(), 1);
        assert_eq!(artifact.definitions[0].term, "网络");
        assert_eq!(artifact.cross_references.len(), 1);
        assert_eq!(artifact.warnings.len(), 1);
        assert!(artifact.warnings[0].contains("article 99"));
    }

    #[test]
    fn test_build_artifact_without_articles() {
        let artifact = build_artifact(&entry(), "<html><body><p>页面不存在</p></body></html>");
        assert!(artifact.provisions.is_empty());
        assert!(artifact.warnings.iter().any(|w| w.starts_with("No articles found")));
    }

    #[test]
    fn test_report_record() {
        let mut report = HarvestReport::default();
        report.record("A", &DocumentOutcome::Skipped);
        report.record(
            "B",
            &DocumentOutcome::Harvested {
                provisions: 5,
                conflicts: 1,
            },
        );
        report.record("C", &DocumentOutcome::Failed("HTTP 404".to_string()));

        assert_eq!(report.skipped, 1);
        assert_eq!(report.harvested, 1);
        assert_eq!(report.provisions, 5);
        assert_eq!(report.conflicts, 1);
        assert_eq!(report.failures, vec![("C".to_string(), "HTTP 404".to_string())]);
    }
}
