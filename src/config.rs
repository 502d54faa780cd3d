//! Configuration types for orderbook-replay

use crate::orderbook::ReconstructionParams;
use crate::provider::{AmberdataConfig, AMBERDATA_API_URL};
use crate::telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable that overrides `provider.api_key`
pub const API_KEY_ENV: &str = "AMBERDATA_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub reconstruction: ReconstructionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Market-data provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Base URL for the spot market-data API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent in the `x-api-key` header
    #[serde(default)]
    pub api_key: Option<String>,

    /// Exchange whose books are replayed
    #[serde(default = "default_exchange")]
    pub exchange: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of paginated responses followed per fetch
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_base_url() -> String {
    AMBERDATA_API_URL.to_string()
}
fn default_exchange() -> String {
    "binance".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_pages() -> usize {
    20
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            exchange: default_exchange(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

impl ProviderConfig {
    /// Build the HTTP client configuration
    pub fn to_client_config(&self) -> AmberdataConfig {
        AmberdataConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            exchange: self.exchange.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_pages: self.max_pages,
        }
    }
}

/// Reconstruction window configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconstructionConfig {
    /// How far before the target to look for a snapshot (milliseconds)
    #[serde(default = "default_lookback_ms")]
    pub lookback_ms: i64,

    /// Added to the target to form the exclusive end bound (milliseconds)
    #[serde(default = "default_end_offset_ms")]
    pub end_offset_ms: i64,
}

fn default_lookback_ms() -> i64 {
    60_000
}
fn default_end_offset_ms() -> i64 {
    1
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            lookback_ms: default_lookback_ms(),
            end_offset_ms: default_end_offset_ms(),
        }
    }
}

impl From<&ReconstructionConfig> for ReconstructionParams {
    fn from(config: &ReconstructionConfig) -> Self {
        Self {
            lookback_ms: config.lookback_ms,
            end_offset_ms: config.end_offset_ms,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Built-in defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.provider.api_key = Some(key);
            }
        }
    }

    /// Copy of the configuration that is safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.provider.api_key.is_some() {
            config.provider.api_key = Some("********".to_string());
        }
        config
    }
}
