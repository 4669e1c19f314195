use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SearchError};
use crate::highlight::{DEFAULT_MARK_CLOSE, DEFAULT_MARK_OPEN};
use crate::query::ScopeFilters;

pub const SEARCH_CONFIG_FILENAME: &str = "search.json";
pub const SEARCH_CONFIG_VERSION: &str = "1.0.0";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub version: String,
    /// Quiet period shared by every keystroke before a query is evaluated.
    pub debounce_ms: u64,
    pub highlight: HighlightConfig,
    pub default_scope: ScopeFilters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub open: String,
    pub close: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            version: SEARCH_CONFIG_VERSION.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            highlight: HighlightConfig::default(),
            default_scope: ScopeFilters::all(),
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            open: DEFAULT_MARK_OPEN.to_string(),
            close: DEFAULT_MARK_CLOSE.to_string(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

pub fn search_config_path(dir: &Path) -> PathBuf {
    dir.join(SEARCH_CONFIG_FILENAME)
}

pub fn load_or_create_search_config(dir: &Path) -> Result<SearchConfig> {
    std::fs::create_dir_all(dir).map_err(|error| {
        SearchError::Config(format!(
            "failed to create config directory {}: {error}",
            dir.display()
        ))
    })?;

    let path = search_config_path(dir);
    if !path.exists() {
        let config = SearchConfig::default();
        write_search_config(&path, &config)?;
        return Ok(config);
    }

    let data = std::fs::read_to_string(&path)?;
    let config: SearchConfig = serde_json::from_str(&data).map_err(|error| {
        SearchError::Config(format!(
            "failed to parse search config {}: {error}",
            path.display()
        ))
    })?;

    if config.version != SEARCH_CONFIG_VERSION {
        return Err(SearchError::Config(format!(
            "unsupported search config version {} in {}",
            config.version,
            path.display()
        )));
    }

    Ok(config)
}

/// Loads the config, falling back to defaults when it cannot be used.
pub fn load_search_config_or_default(dir: &Path) -> SearchConfig {
    match load_or_create_search_config(dir) {
        Ok(config) => config,
        Err(error) => {
            log::warn!("using default search config: {error}");
            SearchConfig::default()
        }
    }
}

pub fn write_search_config(path: &Path, config: &SearchConfig) -> Result<()> {
    let data = serde_json::to_string_pretty(config).map_err(|error| {
        SearchError::Serialization(format!(
            "failed to serialize search config {}: {error}",
            path.display()
        ))
    })?;
    std::fs::write(path, data).map_err(|error| {
        SearchError::Config(format!(
            "failed to write search config {}: {error}",
            path.display()
        ))
    })?;
    Ok(())
}
