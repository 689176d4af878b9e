//! Scrape run configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one scrape run.
///
/// All fields have working defaults targeting the national Pokédex; a JSON
/// config file or CLI flags may override any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// URL of the index page listing every entity.
    pub index_url: String,
    /// Base URL that relative detail-page hrefs are resolved against.
    pub base_url: String,
    /// Stop after this many entities (useful for smoke runs). `None` = all.
    pub max_entities: Option<usize>,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Minimum delay between detail-page requests, for polite crawling.
    pub min_delay_ms: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            index_url: "https://pokemondb.net/pokedex/national".to_string(),
            base_url: "https://pokemondb.net".to_string(),
            max_entities: None,
            request_timeout_ms: 10_000,
            min_delay_ms: 250,
            user_agent: format!("dexscrape/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_national_dex() {
        let config = ScrapeConfig::default();
        assert!(config.index_url.ends_with("/pokedex/national"));
        assert!(config.index_url.starts_with(&config.base_url));
        assert!(config.max_entities.is_none());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"max_entities": 5, "min_delay_ms": 0}"#).unwrap();

        let config = ScrapeConfig::from_file(&path).unwrap();
        assert_eq!(config.max_entities, Some(5));
        assert_eq!(config.min_delay_ms, 0);
        // Unspecified fields keep their defaults
        assert_eq!(config.base_url, "https://pokemondb.net");
    }
}
