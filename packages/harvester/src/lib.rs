//! Fagui Harvester - Download Chinese legislation and split it into articles.
//!
//! This crate fetches law pages listed in an operator-maintained manifest,
//! extracts the individual articles (条), merges duplicate extractions and
//! writes one YAML artifact per document for the store builder.
//!
//! # Example
//!
//! ```
//! use fagui_harvester::numerals;
//! use fagui_harvester::citation::{self, CitationStyle};
//!
//! assert_eq!(numerals::to_integer("二十一"), 21);
//!
//! let c = citation::parse("Art. 21, PIPL 2021");
//! assert_eq!(citation::format(&c, CitationStyle::Pinpoint), "第二十一条");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, validation and `FAGUI_*` settings
//! - [`types`]: Core data types (Document, Provision, Definition, cross references)
//! - [`error`]: Error types and Result alias
//! - [`numerals`]: Chinese numeral glyphs to integers and back
//! - [`http`]: Rate-limited fetcher with retry
//! - [`extract`]: Article extraction from HTML pages
//! - [`definitions`]: Term definitions inside articles
//! - [`dedup`]: Merging of duplicate articles
//! - [`citation`]: Citation parsing and formatting
//! - [`manifest`]: Source manifest
//! - [`artifact`]: Per-document YAML artifacts
//! - [`harvester`]: Ingestion run
//! - [`cli`]: Command-line interface

pub mod artifact;
pub mod citation;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod definitions;
pub mod error;
pub mod extract;
pub mod harvester;
pub mod http;
pub mod manifest;
pub mod numerals;
pub mod types;

// Re-export commonly used items
pub use artifact::DocumentArtifact;
pub use config::{validate_document_id, HarvestConfig};
pub use error::{HarvesterError, Result};
pub use harvester::{build_artifact, HarvestReport, Harvester};
pub use manifest::{SourceDocument, SourceManifest};
pub use types::{CrossReferenceDecl, Definition, Document, DocumentKind, DocumentStatus, Provision};
