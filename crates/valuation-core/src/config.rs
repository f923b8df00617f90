//! Configuration for valuation comparison operations

use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the FinancialModelingPrep API key
pub const FMP_API_KEY_VAR: &str = "FMP_API_KEY";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_VAR: &str = "FINANCEBRO_CACHE_DIR";

/// Default FinancialModelingPrep REST base URL
pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Maximum number of peers requested per industry
pub const DEFAULT_PEER_LIMIT: usize = 50;

/// Industry averages move slowly; bulk peer calls dominate cost
pub const DEFAULT_AVERAGE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Configuration for valuation comparison operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// FinancialModelingPrep API key
    pub fmp_api_key: Option<String>,

    /// FinancialModelingPrep base URL
    pub fmp_base_url: String,

    /// Maximum number of peers per industry
    pub peer_limit: usize,

    /// Time-to-live for cached industry averages
    pub average_ttl: Duration,

    /// Per-call HTTP timeout
    pub request_timeout: Duration,

    /// Outbound FMP requests allowed per minute
    pub rate_limit_per_minute: u32,

    /// Directory for the persisted averages snapshot
    pub cache_dir: Option<PathBuf>,

    /// Persist industry averages across restarts
    pub persist_cache: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            fmp_api_key: None,
            fmp_base_url: DEFAULT_FMP_BASE_URL.to_string(),
            peer_limit: DEFAULT_PEER_LIMIT,
            average_ttl: DEFAULT_AVERAGE_TTL,
            request_timeout: Duration::from_secs(15),
            rate_limit_per_minute: 300,
            cache_dir: None,
            persist_cache: true,
        }
    }
}

impl CompareConfig {
    /// Create a new configuration builder
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fmp_api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(CompareError::Config(format!(
                "FMP API key required (set {FMP_API_KEY_VAR})"
            )));
        }

        if self.peer_limit == 0 {
            return Err(CompareError::Config(
                "peer_limit must be greater than 0".to_string(),
            ));
        }

        if self.average_ttl.as_secs() == 0 {
            return Err(CompareError::Config(
                "average_ttl must be at least one second".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(CompareError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(CompareError::Config(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the cache directory, defaulting to `~/.financebro/cache`
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone().or_else(|| {
            directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".financebro").join("cache"))
        })
    }
}

/// Builder for CompareConfig
#[derive(Debug, Default)]
pub struct CompareConfigBuilder {
    fmp_api_key: Option<String>,
    fmp_base_url: Option<String>,
    peer_limit: Option<usize>,
    average_ttl: Option<Duration>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    cache_dir: Option<PathBuf>,
    persist_cache: Option<bool>,
}

impl CompareConfigBuilder {
    /// Set FMP API key
    pub fn fmp_api_key(mut self, key: impl Into<String>) -> Self {
        self.fmp_api_key = Some(key.into());
        self
    }

    /// Set FMP base URL
    pub fn fmp_base_url(mut self, url: impl Into<String>) -> Self {
        self.fmp_base_url = Some(url.into());
        self
    }

    /// Set the maximum number of peers per industry
    pub fn peer_limit(mut self, limit: usize) -> Self {
        self.peer_limit = Some(limit);
        self
    }

    /// Set the industry average TTL
    pub fn average_ttl(mut self, ttl: Duration) -> Self {
        self.average_ttl = Some(ttl);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the FMP request budget per minute
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set the snapshot directory
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Enable or disable snapshot persistence
    pub fn persist_cache(mut self, persist: bool) -> Self {
        self.persist_cache = Some(persist);
        self
    }

    /// Load API key and cache directory from environment
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var(FMP_API_KEY_VAR) {
            self.fmp_api_key = Some(key);
        }
        if let Ok(dir) = std::env::var(CACHE_DIR_VAR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<CompareConfig> {
        let defaults = CompareConfig::default();

        let config = CompareConfig {
            fmp_api_key: self.fmp_api_key,
            fmp_base_url: self.fmp_base_url.unwrap_or(defaults.fmp_base_url),
            peer_limit: self.peer_limit.unwrap_or(defaults.peer_limit),
            average_ttl: self.average_ttl.unwrap_or(defaults.average_ttl),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            cache_dir: self.cache_dir,
            persist_cache: self.persist_cache.unwrap_or(defaults.persist_cache),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompareConfig::default();
        assert_eq!(config.peer_limit, 50);
        assert_eq!(config.average_ttl, Duration::from_secs(43_200));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        // No key by default
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = CompareConfig::builder()
            .fmp_api_key("test_key")
            .peer_limit(10)
            .average_ttl(Duration::from_secs(60))
            .persist_cache(false)
            .build()
            .unwrap();

        assert_eq!(config.peer_limit, 10);
        assert_eq!(config.average_ttl, Duration::from_secs(60));
        assert!(!config.persist_cache);
        assert_eq!(config.fmp_base_url, DEFAULT_FMP_BASE_URL);
    }

    #[test]
    fn test_validation_rejects_blank_key() {
        let config = CompareConfig {
            fmp_api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let base = CompareConfig {
            fmp_api_key: Some("k".to_string()),
            ..Default::default()
        };
        assert!(base.validate().is_ok());

        let config = CompareConfig {
            peer_limit: 0,
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = CompareConfig {
            average_ttl: Duration::from_millis(500),
            ..base.clone()
        };
        assert!(config.validate().is_err());

        let config = CompareConfig {
            rate_limit_per_minute: 0,
            ..base
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_cache_dir_wins() {
        let config = CompareConfig {
            cache_dir: Some(PathBuf::from("/tmp/fb")),
            ..Default::default()
        };
        assert_eq!(config.resolved_cache_dir(), Some(PathBuf::from("/tmp/fb")));
    }
}
