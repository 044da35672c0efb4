//! Application configuration.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use mwlite_core::{Category, Feed, Period, SymbolRequest};
use mwlite_dashboard::DashboardConfig;
use mwlite_feed::providers::{COINGECKO_BASE_URL, FMP_BASE_URL};
use mwlite_feed::FallbackPolicy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MWLITE_CONFIG";

pub const FMP_API_KEY_ENV: &str = "FMP_API_KEY";
pub const COINGECKO_API_KEY_ENV: &str = "COINGECKO_API_KEY";

/// One configured feed: a display name and its symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub symbols: Vec<SymbolRequest>,
}

impl FeedConfig {
    fn new(name: &str, category: Category, symbols: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            symbols: symbols
                .iter()
                .map(|symbol| SymbolRequest::new(*symbol, category))
                .collect(),
        }
    }
}

/// Upstream provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,
    /// Optional CoinGecko demo key.
    #[serde(default)]
    pub coingecko_api_key: Option<String>,
    /// FMP base URL, without the `/v3` or `/v4` suffix.
    #[serde(default = "default_fmp_base_url")]
    pub fmp_base_url: String,
    /// FMP key. Indices, forex and bonds are simulated without a usable key.
    #[serde(default)]
    pub fmp_api_key: Option<String>,
    /// Per-request timeout (seconds).
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_coingecko_base_url() -> String {
    COINGECKO_BASE_URL.to_string()
}

fn default_fmp_base_url() -> String {
    FMP_BASE_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: default_coingecko_base_url(),
            coingecko_api_key: None,
            fmp_base_url: default_fmp_base_url(),
            fmp_api_key: None,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl ProvidersConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info,mwlite=debug".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interval between refresh cycles of each feed (seconds).
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Period selected at startup.
    #[serde(default)]
    pub period: Period,
    /// Lifetime of cached live responses (seconds). 0 disables the cache.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// Fixed seed for reproducible simulated values.
    #[serde(default)]
    pub mock_seed: Option<u64>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_feeds() -> Vec<FeedConfig> {
    vec![
        FeedConfig::new("Crypto", Category::Crypto, &["bitcoin", "ethereum", "solana"]),
        FeedConfig::new(
            "Global Indices",
            Category::EquityIndex,
            &["^GSPC", "^IXIC", "^GDAXI", "^FTSE", "^N225", "^HSI", "^NSEI"],
        ),
        FeedConfig::new("Forex", Category::Forex, &["EURUSD", "USDJPY", "GBPUSD"]),
        FeedConfig::new("Bonds", Category::Bond, &["US 10-Year Treasury"]),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            period: Period::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            fallback: FallbackPolicy::default(),
            mock_seed: None,
            providers: ProvidersConfig::default(),
            feeds: default_feeds(),
            dashboard: DashboardConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `path` if it exists, defaults otherwise, then apply environment
    /// overrides.
    pub fn load(path: &str) -> AppResult<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            warn!(path = %path, "Config file not found, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Replace provider keys with non-empty values from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(FMP_API_KEY_ENV) {
            info!(env = FMP_API_KEY_ENV, "FMP key taken from environment");
            self.providers.fmp_api_key = Some(key);
        }
        if let Some(key) = non_empty(COINGECKO_API_KEY_ENV) {
            info!(env = COINGECKO_API_KEY_ENV, "CoinGecko key taken from environment");
            self.providers.coingecko_api_key = Some(key);
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Validate and build the configured feeds.
    pub fn build_feeds(&self) -> AppResult<Vec<Feed>> {
        if self.refresh_interval_secs == 0 {
            return Err(AppError::Config(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.feeds.is_empty() {
            return Err(AppError::Config("no feeds configured".to_string()));
        }

        let mut names = HashSet::new();
        let mut feeds = Vec::with_capacity(self.feeds.len());
        for feed in &self.feeds {
            if !names.insert(feed.name.to_ascii_lowercase()) {
                return Err(AppError::Config(format!(
                    "feed '{}' is configured more than once",
                    feed.name
                )));
            }
            feeds.push(Feed::new(feed.name.clone(), feed.symbols.clone())?);
        }
        Ok(feeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.period, Period::Recent);
        assert_eq!(config.fallback, FallbackPolicy::Mock);

        let feeds = config.build_feeds().unwrap();
        let names: Vec<_> = feeds.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Crypto", "Global Indices", "Forex", "Bonds"]);
        assert_eq!(feeds[1].len(), 7);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = AppConfig::from_toml(
            r#"
            refresh_interval_secs = 5
            period = "ytd"
            fallback = "unavailable"
            mock_seed = 7

            [providers]
            fmp_api_key = "abc"

            [[feeds]]
            name = "Majors"
            symbols = [
                { identifier = "BTC", category = "crypto" },
                { identifier = "EURUSD", category = "forex" },
            ]

            [dashboard]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.period, Period::YearToDate);
        assert_eq!(config.fallback, FallbackPolicy::Unavailable);
        assert_eq!(config.mock_seed, Some(7));
        assert_eq!(config.providers.fmp_api_key.as_deref(), Some("abc"));
        assert_eq!(config.providers.fmp_base_url, FMP_BASE_URL);
        assert_eq!(config.dashboard.port, 9000);
        assert_eq!(config.dashboard.max_connections, 10);
        assert_eq!(config.feeds.len(), 1);
        assert_eq!(config.feeds[0].symbols[1].category(), Category::Forex);
    }

    #[test]
    fn test_invalid_config() {
        let err = AppConfig::from_toml("refresh_interval_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let config = AppConfig {
            refresh_interval_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.build_feeds(), Err(AppError::Config(_))));

        let config = AppConfig {
            feeds: vec![
                FeedConfig::new("Crypto", Category::Crypto, &["BTC"]),
                FeedConfig::new("crypto", Category::Crypto, &["ETH"]),
            ],
            ..AppConfig::default()
        };
        assert!(matches!(config.build_feeds(), Err(AppError::Config(_))));

        let config = AppConfig {
            feeds: vec![FeedConfig::new("Empty", Category::Crypto, &[])],
            ..AppConfig::default()
        };
        assert!(matches!(config.build_feeds(), Err(AppError::Core(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.providers.fmp_api_key = Some("from-file".to_string());

        config.apply_overrides(|key| match key {
            COINGECKO_API_KEY_ENV => Some("cg-key".to_string()),
            FMP_API_KEY_ENV => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.providers.fmp_api_key.as_deref(), Some("from-file"));
        assert_eq!(config.providers.coingecko_api_key.as_deref(), Some("cg-key"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.feeds, default_feeds());
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("refresh_interval_secs"));
        let parsed = AppConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
