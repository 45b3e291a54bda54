//! Per-document harvest artifacts.
//!
//! Each harvested document is written to `<output>/<document_id>.yaml`. The
//! file is the unit of resumability: when it exists the document is done and
//! a later run skips it. The store builder reads these files and nothing
//! else.

mod reader;
mod writer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dedup::DedupStats;
use crate::types::{CrossReferenceDecl, Definition, Document, Provision};

pub use reader::{load_artifact, read_artifacts};
pub use writer::{artifact_path, generate_yaml, save_artifact};

/// Everything harvested for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentArtifact {
    pub document: Document,

    #[serde(default)]
    pub provisions: Vec<Provision>,

    #[serde(default)]
    pub definitions: Vec<Definition>,

    #[serde(default)]
    pub cross_references: Vec<CrossReferenceDecl>,

    #[serde(default)]
    pub dedup: DedupStats,

    /// Non-fatal problems noticed while harvesting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    pub harvested_at: DateTime<Utc>,
}

impl DocumentArtifact {
    /// Artifact with no provisions, stamped now.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            provisions: Vec::new(),
            definitions: Vec::new(),
            cross_references: Vec::new(),
            dedup: DedupStats::default(),
            warnings: Vec::new(),
            harvested_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.document.id
    }
}
