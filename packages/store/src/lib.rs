//! Fagui Store - Indexed SQLite corpus of harvested Chinese legislation.
//!
//! Harvest artifacts are loaded into a single SQLite file with FTS5 indexes
//! over article text and definitions. The same crate answers the queries an
//! agent-facing layer needs: ranked search, article lookup and citation
//! validation.
//!
//! # Example
//!
//! ```
//! use fagui_store::query::build_variants;
//!
//! let variants = build_variants("个人信息 出境");
//! assert_eq!(variants.primary, "\"个人信息\"* \"出境\"*");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Build settings and query limits
//! - [`error`]: Error types and Result alias
//! - [`schema`]: Embedded schema and connection setup
//! - [`builder`]: Transactional batch load and atomic store replacement
//! - [`query`]: FTS5 query normalization
//! - [`search`]: Ranked full-text search
//! - [`lookup`]: Document and article lookup, citation validation
//! - [`cli`]: Command-line interface

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod lookup;
pub mod query;
pub mod schema;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use builder::{build_store, Builder, LoadSummary};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use lookup::{get_provision, resolve_document, validate_citation};
pub use query::{build_variants, QueryVariants};
pub use search::{search, SearchHit, SearchRequest};
