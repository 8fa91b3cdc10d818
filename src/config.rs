use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::{cache, limits, scoring};

/// Provider names accepted in `search.provider_order`.
pub const KNOWN_PROVIDERS: [&str; 3] = ["google_cse", "brave", "serpapi"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub search: SearchConfig,

    pub cache: CacheConfig,

    pub rate_limit: RateLimitConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/linkscout.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Providers tried in order; the first one returning candidates wins.
    pub provider_order: Vec<String>,

    pub request_timeout_seconds: u64,

    /// Raw hits considered per provider response.
    pub max_results_per_provider: usize,

    /// Minimum confidence a client should treat as a confident match. Exposed
    /// to callers, never used to filter results.
    pub confidence_threshold: f64,

    /// Answer with synthesized guesses when every provider fails.
    pub guess_fallback: bool,

    /// Overridden by `GOOGLE_API_KEY`.
    pub google_api_key: String,

    /// Overridden by `GOOGLE_CSE_CX`.
    pub google_cse_cx: String,

    /// Overridden by `BRAVE_API_KEY`.
    pub brave_api_key: String,

    /// Overridden by `SERPAPI_KEY`.
    pub serpapi_key: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider_order: KNOWN_PROVIDERS.iter().map(ToString::to_string).collect(),
            request_timeout_seconds: limits::REQUEST_TIMEOUT_SECONDS,
            max_results_per_provider: limits::MAX_RESULTS_PER_PROVIDER,
            confidence_threshold: scoring::DISPLAY_THRESHOLD,
            guess_fallback: true,
            google_api_key: String::new(),
            google_cse_cx: String::new(),
            brave_api_key: String::new(),
            serpapi_key: String::new(),
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_days: u32,

    /// Whether guess-only answers are cached like search answers.
    pub cache_guesses: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_days: cache::DISCOVERY_TTL_DAYS,
            cache_guesses: true,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::try_days(i64::from(self.ttl_days)).unwrap_or(chrono::TimeDelta::MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,

    pub max_requests: u32,

    pub window_seconds: u64,

    /// Use `X-Forwarded-For` / `X-Real-IP` to identify callers. Only safe
    /// behind a proxy that sets them.
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: limits::RATE_LIMIT_MAX_REQUESTS,
            window_seconds: limits::RATE_LIMIT_WINDOW_SECONDS,
            trust_forwarded_headers: true,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn window(&self) -> chrono::TimeDelta {
        i64::try_from(self.window_seconds)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .unwrap_or(chrono::TimeDelta::MAX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub json_logs: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "linkscout".to_string());

        Self {
            metrics_enabled: true,
            json_logs: false,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("linkscout").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".linkscout").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Secrets from the process environment win over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets = [
            ("GOOGLE_API_KEY", &mut self.search.google_api_key),
            ("GOOGLE_CSE_CX", &mut self.search.google_cse_cx),
            ("BRAVE_API_KEY", &mut self.search.brave_api_key),
            ("SERPAPI_KEY", &mut self.search.serpapi_key),
        ];

        for (name, target) in targets {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *target = value.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.request_timeout_seconds == 0 {
            anyhow::bail!("search.request_timeout_seconds must be > 0");
        }

        if self.search.max_results_per_provider == 0 {
            anyhow::bail!("search.max_results_per_provider must be > 0");
        }

        if !(0.0..=1.0).contains(&self.search.confidence_threshold) {
            anyhow::bail!(
                "search.confidence_threshold must be between 0 and 1, got {}",
                self.search.confidence_threshold
            );
        }

        if let Some(unknown) = self
            .search
            .provider_order
            .iter()
            .find(|name| !KNOWN_PROVIDERS.contains(&name.as_str()))
        {
            anyhow::bail!(
                "Unknown search provider '{unknown}' (expected one of: {})",
                KNOWN_PROVIDERS.join(", ")
            );
        }

        if self.cache.ttl_days == 0 || self.cache.ttl_days > cache::MAX_TTL_DAYS {
            anyhow::bail!(
                "cache.ttl_days must be between 1 and {}, got {}",
                cache::MAX_TTL_DAYS,
                self.cache.ttl_days
            );
        }

        if self.rate_limit.enabled
            && (self.rate_limit.max_requests == 0 || self.rate_limit.window_seconds == 0)
        {
            anyhow::bail!("rate_limit.max_requests and rate_limit.window_seconds must be > 0");
        }

        if self.rate_limit.window_seconds > limits::MAX_RATE_LIMIT_WINDOW_SECONDS {
            anyhow::bail!(
                "rate_limit.window_seconds must be at most {}, got {}",
                limits::MAX_RATE_LIMIT_WINDOW_SECONDS,
                self.rate_limit.window_seconds
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.provider_order, vec!["google_cse", "brave", "serpapi"]);
        assert_eq!(config.search.request_timeout_seconds, 10);
        assert_eq!(config.search.max_results_per_provider, 3);
        assert!(config.search.guess_fallback);
        assert_eq!(config.cache.ttl_days, 7);
        assert_eq!(config.rate_limit.max_requests, 20);
        assert_eq!(config.rate_limit.window_seconds, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[rate_limit]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [search]
            provider_order = ["brave"]
            brave_api_key = "from-file"

            [rate_limit]
            max_requests = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.search.provider_order, vec!["brave"]);
        assert_eq!(config.rate_limit.max_requests, 5);

        assert_eq!(config.rate_limit.window_seconds, 3600);
        assert_eq!(config.cache.ttl_days, 7);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.search.brave_api_key = "from-file".to_string();
        config.search.serpapi_key = "serp-from-file".to_string();

        config.apply_overrides_from(|name| match name {
            "BRAVE_API_KEY" => Some(" from-env ".to_string()),
            "SERPAPI_KEY" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.search.brave_api_key, "from-env");
        assert_eq!(config.search.serpapi_key, "serp-from-file");
        assert!(config.search.google_api_key.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.search.provider_order.push("bing".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.request_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.confidence_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.window_seconds = 0;
        assert!(config.validate().is_err());

        config.rate_limit.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_durations() {
        let mut config = Config::default();
        config.cache.ttl_days = u32::MAX;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.window_seconds = u64::MAX;
        assert!(config.validate().is_err());

        config.rate_limit.enabled = false;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.ttl_days = cache::MAX_TTL_DAYS;
        config.rate_limit.window_seconds = limits::MAX_RATE_LIMIT_WINDOW_SECONDS;
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.ttl(), chrono::TimeDelta::days(3650));
    }

    #[test]
    fn test_duration_helpers_saturate() {
        let mut config = Config::default();
        config.rate_limit.window_seconds = u64::MAX;
        assert_eq!(config.rate_limit.window(), chrono::TimeDelta::MAX);
        assert_eq!(
            RateLimitConfig::default().window(),
            chrono::TimeDelta::hours(1)
        );
    }
}
