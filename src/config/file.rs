//! File-based configuration loading
//!
//! Loads the client configuration from a JSON file

use super::settings::ApiClientConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "trip-api-client.json";

impl ApiClientConfig {
    /// Load configuration from JSON file
    ///
    /// Omitted fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: ApiClientConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config JSON")?;

        config.validate()?;

        debug!(
            "Loaded client config: api={}, mcp={}, timeout={}s, attempts={}",
            config.api_base_url, config.mcp_base_url, config.timeout_secs, config.max_attempts
        );
        Ok(config)
    }

    /// Load configuration from default locations
    /// Searches in order:
    /// 1. ~/.config/trip-api-client/config.json
    /// 2. ./trip-api-client.json
    ///
    /// Returns `None` when no file exists.
    pub fn load_default() -> Result<Option<Self>> {
        match Self::default_path() {
            Some(path) => Self::load(&path).map(Some),
            None => Ok(None),
        }
    }

    /// First existing configuration file among the default locations
    pub fn default_path() -> Option<PathBuf> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("trip-api-client").join("config.json");
            if config_path.exists() {
                return Some(config_path);
            }
        }

        let local_path = Path::new(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            return Some(local_path.to_path_buf());
        }

        None
    }
}
