//! Error types for the harvester.
//!
//! `HarvesterError` covers everything a library consumer can hit while
//! fetching, parsing and persisting documents. Extraction problems are not
//! errors: an empty provision list is a valid, if degraded, result.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Document identifier is empty or contains characters unsafe for a file name.
    #[error("Invalid document id: '{0}'. Expected letters, digits, '-', '_' or '.' (e.g., PIPL-2021)")]
    InvalidDocumentId(String),

    /// HTTP request failed without a retryable condition.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-retryable status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// All retry attempts failed.
    #[error("Giving up on {url} after {attempts} attempts: {message}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        message: String,
    },

    /// Response body exceeded the configured size cap.
    #[error("Response from {url} is {size} bytes, over the {max} byte limit")]
    ResponseTooLarge { url: String, size: u64, max: u64 },

    /// Source manifest is structurally valid YAML but semantically wrong.
    #[error("Invalid source manifest: {0}")]
    Manifest(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
