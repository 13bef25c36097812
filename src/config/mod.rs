//! Configuration module for Aeris
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. Environment variables (`AERIS_*`)
//! 2. Configuration file (TOML)
//! 3. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use aeris::config::AerisConfig;
//!
//! // Load defaults
//! let config = AerisConfig::default();
//! assert_eq!(config.cache.max_age_minutes, 30);
//!
//! // Parse from TOML
//! let toml = r#"
//! [cache]
//! max_age_minutes = 15
//! "#;
//! let config: AerisConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.cache.max_age_minutes, 15);
//! ```

pub mod error;
pub mod logging;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the acquisition pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AerisConfig {
    /// Primary (global) provider settings
    pub primary: PrimaryConfig,
    /// Regional provider settings
    pub regional: RegionalConfig,
    /// Geocoding backend settings
    pub geocoding: GeocodingConfig,
    /// Freshness cache windows
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Primary provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            api_key: String::new(),
            timeout_secs: 8,
        }
    }
}

/// Regional provider configuration. The provider is skipped entirely when
/// `api_key` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub radius_miles: u32,
    pub timeout_secs: u64,
}

impl Default for RegionalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.airnowapi.org".to_string(),
            api_key: None,
            radius_miles: 25,
            timeout_secs: 8,
        }
    }
}

/// Geocoding backend configuration. The keyed service is tried only when
/// `primary_api_key` is set; the free fallback is always configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub primary_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_api_key: Option<String>,
    pub fallback_base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            primary_base_url: "https://us1.locationiq.com".to_string(),
            primary_api_key: None,
            fallback_base_url: "https://geocoding-api.open-meteo.com".to_string(),
            timeout_secs: 8,
        }
    }
}

/// Freshness cache windows, in minutes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Window for general queries
    pub max_age_minutes: i64,
    /// Tighter window for direct-serving endpoints
    pub serve_max_age_minutes: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_minutes: crate::pipeline::cache::DEFAULT_MAX_AGE_MINUTES,
            serve_max_age_minutes: crate::pipeline::cache::SERVE_MAX_AGE_MINUTES,
        }
    }
}

impl AerisConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports AERIS_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("AERIS_PRIMARY_API_KEY") {
            self.primary.api_key = key;
        }
        if let Ok(key) = std::env::var("AERIS_REGIONAL_API_KEY") {
            self.regional.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("AERIS_GEOCODING_API_KEY") {
            self.geocoding.primary_api_key = Some(key);
        }

        if let Ok(minutes) = std::env::var("AERIS_CACHE_MAX_AGE_MINUTES") {
            if let Ok(m) = minutes.parse() {
                self.cache.max_age_minutes = m;
            }
        }

        // Logging settings
        if let Ok(level) = std::env::var("AERIS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("AERIS_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary.base_url.is_empty() {
            return Err(ConfigError::Validation {
                field: "primary.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if self.regional.base_url.is_empty() {
            return Err(ConfigError::Validation {
                field: "regional.base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if self.geocoding.fallback_base_url.is_empty() {
            return Err(ConfigError::Validation {
                field: "geocoding.fallback_base_url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }

        for (field, secs) in [
            ("primary.timeout_secs", self.primary.timeout_secs),
            ("regional.timeout_secs", self.regional.timeout_secs),
            ("geocoding.timeout_secs", self.geocoding.timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "timeout must be non-zero".to_string(),
                });
            }
        }

        if self.cache.max_age_minutes <= 0 {
            return Err(ConfigError::Validation {
                field: "cache.max_age_minutes".to_string(),
                message: "freshness window must be positive".to_string(),
            });
        }
        if self.cache.serve_max_age_minutes <= 0 {
            return Err(ConfigError::Validation {
                field: "cache.serve_max_age_minutes".to_string(),
                message: "freshness window must be positive".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_config_defaults() {
        let config = AerisConfig::default();
        assert_eq!(config.cache.max_age_minutes, 30);
        assert_eq!(config.cache.serve_max_age_minutes, 10);
        assert_eq!(config.regional.radius_miles, 25);
        assert!(config.regional.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let toml = r#"
        [primary]
        api_key = "pk"
        "#;

        let config: AerisConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.primary.api_key, "pk");
        assert_eq!(config.primary.timeout_secs, 8); // Default
    }

    #[test]
    fn test_config_parse_full_toml() {
        let toml = r#"
        [primary]
        base_url = "http://localhost:8001"
        api_key = "pk"
        timeout_secs = 5

        [regional]
        base_url = "http://localhost:8002"
        api_key = "rk"
        radius_miles = 50

        [geocoding]
        primary_api_key = "gk"

        [cache]
        max_age_minutes = 15
        serve_max_age_minutes = 5

        [logging]
        level = "debug"
        format = "json"
        "#;

        let config: AerisConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.regional.api_key.as_deref(), Some("rk"));
        assert_eq!(config.regional.radius_miles, 50);
        assert_eq!(config.cache.max_age_minutes, 15);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[cache]\nmax_age_minutes = 12").unwrap();

        let config = AerisConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.cache.max_age_minutes, 12);
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = AerisConfig::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_load_none_returns_defaults() {
        let config = AerisConfig::load(None).unwrap();
        assert_eq!(config.cache.max_age_minutes, 30);
    }

    #[test]
    fn test_config_env_override_api_keys() {
        std::env::set_var("AERIS_PRIMARY_API_KEY", "env-pk");
        std::env::set_var("AERIS_REGIONAL_API_KEY", "env-rk");
        let config = AerisConfig::default().with_env_overrides();
        std::env::remove_var("AERIS_PRIMARY_API_KEY");
        std::env::remove_var("AERIS_REGIONAL_API_KEY");

        assert_eq!(config.primary.api_key, "env-pk");
        assert_eq!(config.regional.api_key.as_deref(), Some("env-rk"));
    }

    #[test]
    fn test_config_env_invalid_value_ignored() {
        std::env::set_var("AERIS_CACHE_MAX_AGE_MINUTES", "not-a-number");
        let config = AerisConfig::default().with_env_overrides();
        std::env::remove_var("AERIS_CACHE_MAX_AGE_MINUTES");

        // Should keep default, not crash
        assert_eq!(config.cache.max_age_minutes, 30);
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = AerisConfig::default();
        config.primary.timeout_secs = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "primary.timeout_secs"
        ));
    }

    #[test]
    fn test_config_validation_nonpositive_window() {
        let mut config = AerisConfig::default();
        config.cache.max_age_minutes = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "cache.max_age_minutes"
        ));
    }

    #[test]
    fn test_config_validation_empty_url() {
        let mut config = AerisConfig::default();
        config.regional.base_url = String::new();

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "regional.base_url"
        ));
    }
}
