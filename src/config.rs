//! Client configuration
//!
//! One immutable configuration object supplies everything the pipeline needs
//! at construction time: endpoint, credentials, timeout, rate budget, retry
//! defaults and cache tuning. Values come from the environment (`.env`
//! honored via dotenvy), an optional TOML file, or the builder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::api::cache::CacheConfig;
use crate::api::error::SuperOpsError;
use crate::api::resilience::ResilienceConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.superops.ai/msp";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable configuration for a [`crate::SuperOpsClient`]
#[derive(Debug, Clone)]
pub struct SuperOpsConfig {
    /// GraphQL endpoint URL.
    pub base_url: String,
    /// API token, sent as a bearer credential.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub resilience: ResilienceConfig,
    pub cache: CacheConfig,
}

impl SuperOpsConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            resilience: ResilienceConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    pub fn builder() -> SuperOpsConfigBuilder {
        SuperOpsConfigBuilder::default()
    }

    /// Load configuration from the environment. Reads `.env` if present.
    ///
    /// Recognized variables: `SUPEROPS_API_KEY` (required),
    /// `SUPEROPS_BASE_URL`, `SUPEROPS_TIMEOUT_SECS`,
    /// `SUPEROPS_RATE_CAPACITY`, `SUPEROPS_RATE_REFILL_PER_SEC`,
    /// `SUPEROPS_CACHE_ENABLED`, `SUPEROPS_CACHE_TTL_SECS`.
    pub fn from_env() -> Result<Self, SuperOpsError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("SUPEROPS_API_KEY")
            .map_err(|_| SuperOpsError::config("SUPEROPS_API_KEY is not set"))?;
        let base_url =
            std::env::var("SUPEROPS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(base_url, api_key);

        if let Some(secs) = read_env_number::<u64>("SUPEROPS_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = read_env_number::<u32>("SUPEROPS_RATE_CAPACITY")? {
            config.resilience.rate_limit.capacity = capacity;
        }
        if let Some(refill) = read_env_number::<f64>("SUPEROPS_RATE_REFILL_PER_SEC")? {
            config.resilience.rate_limit.refill_per_second = refill;
        }
        if let Ok(enabled) = std::env::var("SUPEROPS_CACHE_ENABLED") {
            config.cache.enabled = matches!(enabled.as_str(), "1" | "true" | "yes");
        }
        if let Some(secs) = read_env_number::<u64>("SUPEROPS_CACHE_TTL_SECS")? {
            config.cache.ttl = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SuperOpsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SuperOpsError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|e| {
            SuperOpsError::config(format!("failed to parse {}: {e}", path.display()))
        })?;

        let config: Self = file.into();
        config.validate()?;
        Ok(config)
    }

    /// Load from the default config file when it exists, otherwise from the
    /// environment.
    pub fn load() -> Result<Self, SuperOpsError> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Self::from_env()
    }

    /// `<config dir>/superops/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("superops").join("config.toml"))
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), SuperOpsError> {
        if self.base_url.is_empty() {
            return Err(SuperOpsError::config("base URL must not be empty"));
        }
        if self.api_key.is_empty() {
            return Err(SuperOpsError::config("API key must not be empty"));
        }
        if self.timeout.is_zero() {
            return Err(SuperOpsError::config("request timeout must be > 0"));
        }
        self.resilience.validate()
    }
}

fn read_env_number<T: std::str::FromStr>(name: &str) -> Result<Option<T>, SuperOpsError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| SuperOpsError::config(format!("{name} is not a valid number: {raw}"))),
        Err(_) => Ok(None),
    }
}

/// On-disk layout of config.toml
#[derive(Debug, Deserialize)]
struct ConfigFile {
    base_url: Option<String>,
    api_key: String,
    timeout_secs: Option<u64>,
    #[serde(default)]
    rate_limit: RateLimitFile,
    #[serde(default)]
    cache: CacheFile,
    #[serde(default)]
    retry: RetryFile,
}

#[derive(Debug, Default, Deserialize)]
struct RateLimitFile {
    capacity: Option<u32>,
    refill_per_second: Option<f64>,
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct CacheFile {
    enabled: Option<bool>,
    ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RetryFile {
    max_attempts: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    backoff_multiplier: Option<f64>,
    jitter: Option<bool>,
}

impl From<ConfigFile> for SuperOpsConfig {
    fn from(file: ConfigFile) -> Self {
        let mut config = SuperOpsConfig::new(
            file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            file.api_key,
        );

        if let Some(secs) = file.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = file.rate_limit.capacity {
            config.resilience.rate_limit.capacity = capacity;
        }
        if let Some(refill) = file.rate_limit.refill_per_second {
            config.resilience.rate_limit.refill_per_second = refill;
        }
        if let Some(enabled) = file.rate_limit.enabled {
            config.resilience.rate_limit.enabled = enabled;
        }
        if let Some(enabled) = file.cache.enabled {
            config.cache.enabled = enabled;
        }
        if let Some(secs) = file.cache.ttl_secs {
            config.cache.ttl = Duration::from_secs(secs);
        }
        if let Some(attempts) = file.retry.max_attempts {
            config.resilience.query_retry.max_attempts = attempts;
        }
        if let Some(ms) = file.retry.base_delay_ms {
            config.resilience.query_retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = file.retry.max_delay_ms {
            config.resilience.query_retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(multiplier) = file.retry.backoff_multiplier {
            config.resilience.query_retry.backoff_multiplier = multiplier;
        }
        if let Some(jitter) = file.retry.jitter {
            config.resilience.query_retry.jitter = jitter;
        }

        config
    }
}

/// Builder for programmatic configuration
#[derive(Debug, Default)]
pub struct SuperOpsConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    resilience: Option<ResilienceConfig>,
    cache: Option<CacheConfig>,
}

impl SuperOpsConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn resilience(mut self, resilience: ResilienceConfig) -> Self {
        self.resilience = Some(resilience);
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        let mut cache = self.cache.take().unwrap_or_default();
        cache.enabled = enabled;
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> SuperOpsConfig {
        let mut config = SuperOpsConfig::new(
            self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            self.api_key.unwrap_or_default(),
        );
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(resilience) = self.resilience {
            config.resilience = resilience;
        }
        if let Some(cache) = self.cache {
            config.cache = cache;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuperOpsConfig::new("https://api.superops.ai/msp", "token");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.cache.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let config = SuperOpsConfig::new("https://api.superops.ai/msp", "");
        assert!(matches!(
            config.validate(),
            Err(SuperOpsError::Config { .. })
        ));
    }

    #[test]
    fn test_builder() {
        let config = SuperOpsConfig::builder()
            .base_url("https://eu.superops.ai/msp")
            .api_key("token")
            .timeout(Duration::from_secs(10))
            .cache_enabled(false)
            .build();

        assert_eq!(config.base_url, "https://eu.superops.ai/msp");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_parse_config_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            api_key = "secret"
            timeout_secs = 15

            [rate_limit]
            capacity = 4
            refill_per_second = 0.5

            [cache]
            enabled = false

            [retry]
            max_attempts = 5
            base_delay_ms = 250
            "#,
        )
        .unwrap();

        let config: SuperOpsConfig = file.into();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.resilience.rate_limit.capacity, 4);
        assert!(!config.cache.enabled);
        assert_eq!(config.resilience.query_retry.max_attempts, 5);
        assert_eq!(
            config.resilience.query_retry.base_delay,
            Duration::from_millis(250)
        );
    }
}
