//! Main application configuration
//!
//! This module defines the top-level configuration for the league-skill
//! tooling, including environment variable and TOML file loading and
//! validation.

use crate::config::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub settlement: SettlementSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Settlement workflow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementSettings {
    /// Extra attempts after a persistence conflict before giving up
    pub max_retry_attempts: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "league-skill".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for SettlementSettings {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(mean) = env::var("RATING_START_MEAN") {
            self.rating.start_mean = mean
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_START_MEAN value: {}", mean))?;
        }
        if let Ok(deviation) = env::var("RATING_START_DEVIATION") {
            self.rating.start_deviation = deviation
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_START_DEVIATION value: {}", deviation))?;
        }
        if let Ok(variance) = env::var("RATING_PERFORMANCE_VARIANCE") {
            self.rating.performance_variance = variance.parse().map_err(|_| {
                anyhow!("Invalid RATING_PERFORMANCE_VARIANCE value: {}", variance)
            })?;
        }
        if let Ok(floor) = env::var("RATING_DEVIATION_FLOOR") {
            self.rating.deviation_floor = floor
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_DEVIATION_FLOOR value: {}", floor))?;
        }

        // Settlement settings
        if let Ok(retries) = env::var("SETTLEMENT_MAX_RETRY_ATTEMPTS") {
            self.settlement.max_retry_attempts = retries.parse().map_err(|_| {
                anyhow!("Invalid SETTLEMENT_MAX_RETRY_ATTEMPTS value: {}", retries)
            })?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.settlement.max_retry_attempts, 3);
        assert_eq!(config.rating.start_mean, 25.0);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_rating_section() {
        let mut config = AppConfig::default();
        config.rating.performance_variance = -1.0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Performance variance"));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("league-skill-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[rating]\nperformance_variance = 4.0\n\n[settlement]\nmax_retry_attempts = 7"
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.rating.performance_variance, 4.0);
        assert_eq!(config.rating.start_deviation, 3.0);
        assert_eq!(config.settlement.max_retry_attempts, 7);
        assert_eq!(config.service.name, "league-skill");
    }

    #[test]
    fn test_from_missing_file() {
        let err = AppConfig::from_file(Path::new("/nonexistent/league-skill.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
