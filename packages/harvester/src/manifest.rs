//! Operator-maintained list of documents to harvest.
//!
//! ```yaml
//! documents:
//!   - id: PIPL-2021
//!     type: statute
//!     title: 中华人民共和国个人信息保护法
//!     title_en: Personal Information Protection Law
//!     short_name: PIPL
//!     status: in_force
//!     issued_date: "2021-08-20"
//!     in_force_date: "2021-11-01"
//!     url: https://flk.npc.gov.cn/detail2.html?ZmY4MDgxODE3YjY0NzJhMzAxN2I2NTQ5NjBiMjBiMDM
//!     cross_references:
//!       - external_id: gdpr
//!         type: regulation
//!         year: 2016
//!         number: 679
//!         short_name: GDPR
//!         kind: references
//!         is_primary: true
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::validate_document_id;
use crate::error::{HarvesterError, Result};
use crate::types::{CrossReferenceDecl, Document};

/// One manifest entry: the document metadata plus its declared links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(flatten)]
    pub document: Document,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_references: Vec<CrossReferenceDecl>,
}

/// The whole manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceManifest {
    pub documents: Vec<SourceDocument>,
}

impl SourceManifest {
    /// Parse and validate manifest YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Self = serde_yaml_ng::from_str(yaml)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| {
            HarvesterError::Manifest(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Check identifiers are usable as file names and unique, and that
    /// every entry has a URL to fetch.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.documents {
            let doc = &entry.document;
            validate_document_id(&doc.id)?;
            if !seen.insert(doc.id.as_str()) {
                return Err(HarvesterError::Manifest(format!(
                    "duplicate document id '{}'",
                    doc.id
                )));
            }
            if doc.url.trim().is_empty() {
                return Err(HarvesterError::Manifest(format!(
                    "document '{}' has no url",
                    doc.id
                )));
            }
            for xref in &entry.cross_references {
                if xref.external_id.trim().is_empty() {
                    return Err(HarvesterError::Manifest(format!(
                        "document '{}' has a cross reference without external_id",
                        doc.id
                    )));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentKind, DocumentStatus, RelationKind};
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
documents:
  - id: PIPL-2021
    type: statute
    title: 中华人民共和国个人信息保护法
    short_name: PIPL
    status: in_force
    url: https://example.org/pipl
    cross_references:
      - external_id: gdpr
        type: regulation
        year: 2016
        number: 679
        kind: references
        is_primary: true
      - external_id: gdpr
        type: regulation
        year: 2016
        number: 679
        kind: cites_article
        article: "3"
        provision_ref: "3"
  - id: NDSR-2024
    type: regulation
    title: 网络数据安全管理条例
    status: not_yet_in_force
    url: https://example.org/ndsr
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = SourceManifest::from_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.len(), 2);

        let pipl = &manifest.documents[0];
        assert_eq!(pipl.document.id, "PIPL-2021");
        assert_eq!(pipl.document.kind, DocumentKind::Statute);
        assert_eq!(pipl.cross_references.len(), 2);
        assert_eq!(pipl.cross_references[1].kind, RelationKind::CitesArticle);
        assert_eq!(pipl.cross_references[1].provision_ref.as_deref(), Some("3"));

        let ndsr = &manifest.documents[1];
        assert_eq!(ndsr.document.status, DocumentStatus::NotYetInForce);
        assert!(ndsr.cross_references.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
documents:
  - {id: A, type: statute, title: 甲法, status: in_force, url: "https://x/a"}
  - {id: A, type: statute, title: 乙法, status: in_force, url: "https://x/b"}
"#;
        let err = SourceManifest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate document id"));
    }

    #[test]
    fn test_unsafe_id_rejected() {
        let yaml = r#"
documents:
  - {id: "../etc", type: statute, title: 甲法, status: in_force, url: "https://x/a"}
"#;
        assert!(matches!(
            SourceManifest::from_yaml(yaml),
            Err(HarvesterError::InvalidDocumentId(_))
        ));
    }

    #[test]
    fn test_unknown_status_is_yaml_error() {
        let yaml = r#"
documents:
  - {id: A, type: statute, title: 甲法, status: draft, url: "https://x/a"}
"#;
        assert!(matches!(
            SourceManifest::from_yaml(yaml),
            Err(HarvesterError::Yaml(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SourceManifest::load(Path::new("/nonexistent/manifest.yaml")).unwrap_err();
        assert!(matches!(err, HarvesterError::Manifest(_)));
    }
}
