//! Configuration for building and opening the store.

use std::path::PathBuf;

use fagui_harvester::config::DEFAULT_OUTPUT_DIR;

/// Default location of the built database.
pub const DEFAULT_DB_PATH: &str = "data/database.db";

/// Deployment tier recorded in build metadata when none is configured.
pub const DEFAULT_TIER: &str = "free";

/// Source label recorded in build metadata.
pub const DEFAULT_SOURCE: &str = "flk.npc.gov.cn";

/// Upper bound for search result counts.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Result count when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Articles returned when a whole document is requested.
pub const MAX_PROVISION_LISTING: usize = 50;

/// Longest query accepted by the normalizer, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Settings for a store build.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub artifact_dir: PathBuf,
    pub tier: String,
    pub source: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            artifact_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            tier: DEFAULT_TIER.to_string(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Build a config from `FAGUI_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let db_path = std::env::var("FAGUI_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let artifact_dir = std::env::var("FAGUI_ARTIFACT_DIR")
            .or_else(|_| std::env::var("FAGUI_OUTPUT_DIR"))
            .map(PathBuf::from)
            .unwrap_or(defaults.artifact_dir);

        let tier = std::env::var("FAGUI_TIER")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.tier);

        let source = std::env::var("FAGUI_SOURCE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.source);

        Self {
            db_path,
            artifact_dir,
            tier,
            source,
        }
    }

    #[must_use]
    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    #[must_use]
    pub fn with_artifact_dir(mut self, artifact_dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = artifact_dir.into();
        self
    }

    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.db_path, PathBuf::from("data/database.db"));
        assert_eq!(config.artifact_dir, PathBuf::from("data/artifacts"));
        assert_eq!(config.tier, "free");
    }

    #[test]
    fn test_builder_setters() {
        let config = StoreConfig::default()
            .with_db_path("/tmp/x.db")
            .with_artifact_dir("/tmp/a")
            .with_tier("professional");
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.artifact_dir, PathBuf::from("/tmp/a"));
        assert_eq!(config.tier, "professional");
    }
}
