use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration. Every field has a sensible default so the
/// binary runs with no config file at all; a TOML file overrides
/// selectively thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_candidates_per_source: usize,
    pub request_timeout_secs: u64,
    pub retries: usize,
    /// Politeness window between outbound requests, in milliseconds.
    /// This is a rate limit owed to the source sites, not a tunable.
    pub politeness_min_ms: u64,
    pub politeness_max_ms: u64,
    pub user_agent: String,
    pub store_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_candidates_per_source: 20,
            request_timeout_secs: 30,
            retries: 3,
            politeness_min_ms: 800,
            politeness_max_ms: 2400,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            store_file: PathBuf::from("matches.json"),
            log_file: PathBuf::from("scrape_log.json"),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&raw)?)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_overrides_defaults() {
        let config: Config = toml::from_str("max_candidates_per_source = 5").unwrap();
        assert_eq!(config.max_candidates_per_source, 5);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.store_file, PathBuf::from("matches.json"));
    }
}
