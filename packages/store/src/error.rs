//! Error types for the store.

use fagui_harvester::HarvesterError;
use thiserror::Error;

/// Main error type for building and querying the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error, including constraint violations that abort a build.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact could not be read or parsed.
    #[error("Artifact error: {0}")]
    Artifact(#[from] HarvesterError),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// No document matches the given id, short name or title.
    #[error("Unknown document: '{0}'")]
    UnknownDocument(String),

    /// Caller input cannot be used as given.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
