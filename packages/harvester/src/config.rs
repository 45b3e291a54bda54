//! Configuration constants and validation functions for the harvester.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{HarvesterError, Result};

/// HTTP timeout in seconds.
///
/// Government portals are slow under load; 30 seconds covers the large
/// consolidated codes without hanging a run indefinitely.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Minimum spacing between any two outgoing requests, regardless of host.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1_000;

/// Maximum number of attempts per request (first try included).
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Default maximum HTTP response size in bytes (20 MB).
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 20 * 1024 * 1024;

/// Body containers tried in order when locating the law text on a page.
pub const CONTENT_SELECTORS: &[&str] = &[
    "#UCAP-CONTENT",
    ".pages_content",
    "#zoom",
    ".TRS_Editor",
    ".law-content",
    "article",
    "#content",
    ".content",
    "main",
];

/// A container must hold more than this many characters to be accepted.
pub const MIN_CONTAINER_CHARS: usize = 100;

/// Language tag for text extracted from the source pages.
pub const SOURCE_LANGUAGE: &str = "zh";

/// Default directory for per-document artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "data/artifacts";

/// Document id pattern: letters, digits and a few separators, no path components.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOCUMENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,63}$").expect("valid regex"));

/// Validate a document identifier.
///
/// Identifiers double as artifact file names, so anything that could escape
/// the output directory is rejected.
///
/// # Examples
/// ```
/// use fagui_harvester::config::validate_document_id;
///
/// assert!(validate_document_id("PIPL-2021").is_ok());
/// assert!(validate_document_id("../secrets").is_err());
/// ```
pub fn validate_document_id(id: &str) -> Result<()> {
    if DOCUMENT_ID_PATTERN.is_match(id) && !id.contains("..") {
        Ok(())
    } else {
        Err(HarvesterError::InvalidDocumentId(id.to_string()))
    }
}

/// Runtime settings for a harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub min_interval: Duration,
    pub max_attempts: u32,
    pub retry_base_delay: Duration,
    pub max_response_size: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            min_interval: Duration::from_millis(MIN_REQUEST_INTERVAL_MS),
            max_attempts: MAX_ATTEMPTS,
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        }
    }
}

impl HarvestConfig {
    /// Build a config from `FAGUI_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let output_dir = std::env::var("FAGUI_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let timeout = env_u64("FAGUI_HTTP_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let min_interval = env_u64("FAGUI_MIN_INTERVAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.min_interval);

        let max_attempts = env_u64("FAGUI_MAX_ATTEMPTS")
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.max_attempts);

        let retry_base_delay = env_u64("FAGUI_RETRY_BASE_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_base_delay);

        let max_response_size = env_u64("FAGUI_MAX_RESPONSE_MB")
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_response_size);

        Self {
            output_dir,
            timeout,
            min_interval,
            max_attempts,
            retry_base_delay,
            max_response_size,
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_response_size(mut self, bytes: u64) -> Self {
        self.max_response_size = bytes;
        self
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_document_id_valid() {
        assert!(validate_document_id("PIPL-2021").is_ok());
        assert!(validate_document_id("csl_2016").is_ok());
        assert!(validate_document_id("DSL.2021").is_ok());
    }

    #[test]
    fn test_validate_document_id_invalid() {
        assert!(validate_document_id("").is_err());
        assert!(validate_document_id("-leading").is_err());
        assert!(validate_document_id("a/b").is_err());
        assert!(validate_document_id("a..b").is_err());
        assert!(validate_document_id("个人信息保护法").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = HarvestConfig::default();
        assert_eq!(config.max_attempts, MAX_ATTEMPTS);
        assert_eq!(config.timeout, Duration::from_secs(HTTP_TIMEOUT_SECS));
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_with_max_attempts_never_zero() {
        let config = HarvestConfig::default().with_max_attempts(0);
        assert_eq!(config.max_attempts, 1);
    }
}
