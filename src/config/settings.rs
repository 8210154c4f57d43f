//! Application configuration settings
//!
//! Defines the client configuration and its environment loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API client configuration
    pub client: ApiClientConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// API client configuration
///
/// Set once when the client is constructed and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientConfig {
    /// Base URL of the general API
    #[serde(default = "default_api_url")]
    pub api_base_url: String,

    /// Base URL of the compute-heavy trip-generation (MCP) backend
    #[serde(default = "default_mcp_url")]
    pub mcp_base_url: String,

    /// Paths starting with this prefix are routed to the MCP backend
    #[serde(default = "default_mcp_prefix")]
    pub mcp_path_prefix: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum attempts per logical call, first attempt included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base retry delay in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Upper bound for computed retry delays in milliseconds
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,

    /// Add random jitter to computed delays
    #[serde(default)]
    pub jitter: bool,

    /// Optional wall-clock budget for a logical call, retries included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_budget_secs: Option<u64>,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

fn default_api_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_mcp_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_mcp_prefix() -> String {
    "/mcp".to_string()
}

// Generous to survive a cold-started backend
fn default_timeout_secs() -> u64 {
    130
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_retry_delay_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("trip-api-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_url(),
            mcp_base_url: default_mcp_url(),
            mcp_path_prefix: default_mcp_prefix(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            jitter: false,
            retry_budget_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl ApiClientConfig {
    /// Config pointing both backends at the given URLs, other values default
    pub fn with_base_urls(api_base_url: impl Into<String>, mcp_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            mcp_base_url: mcp_base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }

    pub fn retry_budget(&self) -> Option<Duration> {
        self.retry_budget_secs.map(Duration::from_secs)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("API", &self.api_base_url), ("MCP", &self.mcp_base_url)] {
            if !url.starts_with("http") {
                anyhow::bail!("Invalid {} base URL format, should start with 'http': {}", name, url);
            }
        }

        if !self.mcp_path_prefix.starts_with('/') || self.mcp_path_prefix.len() < 2 {
            anyhow::bail!("MCP path prefix must start with '/' and not be empty: {}", self.mcp_path_prefix);
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("Timeout cannot be 0");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("Retry attempts must be at least 1");
        }

        if self.retry_delay_ms > self.max_retry_delay_ms {
            anyhow::bail!(
                "Retry delay ({}ms) cannot exceed maximum retry delay ({}ms)",
                self.retry_delay_ms,
                self.max_retry_delay_ms
            );
        }

        if self.retry_budget_secs == Some(0) {
            anyhow::bail!("Retry budget cannot be 0");
        }

        Ok(())
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.format);
        }

        Ok(())
    }
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let retry_budget_secs = match std::env::var("RETRY_BUDGET_SECS") {
            Ok(v) if !v.trim().is_empty() => Some(v.trim().parse().context("Invalid retry budget")?),
            _ => None,
        };

        let settings = Self {
            client: ApiClientConfig {
                api_base_url: get_env_or_default("TRIP_API_URL", &default_api_url()),
                mcp_base_url: get_env_or_default("TRIP_MCP_URL", &default_mcp_url()),
                mcp_path_prefix: get_env_or_default("MCP_PATH_PREFIX", &default_mcp_prefix()),
                timeout_secs: get_env_or_default("REQUEST_TIMEOUT", "130")
                    .parse()
                    .context("Invalid timeout value")?,
                max_attempts: get_env_or_default("RETRY_ATTEMPTS", "3")
                    .parse()
                    .context("Invalid retry attempts")?,
                retry_delay_ms: get_env_or_default("RETRY_DELAY_MS", "1000")
                    .parse()
                    .context("Invalid retry delay")?,
                max_retry_delay_ms: get_env_or_default("MAX_RETRY_DELAY_MS", "30000")
                    .parse()
                    .context("Invalid maximum retry delay")?,
                jitter: get_env_or_default("RETRY_JITTER", "false")
                    .parse()
                    .context("Invalid retry jitter flag")?,
                retry_budget_secs,
                user_agent: default_user_agent(),
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;
        self.logging.validate()
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
