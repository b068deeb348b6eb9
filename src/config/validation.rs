//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use url::Url;

use super::Settings;
use crate::utils::errors::{EventumError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_stats_config(&settings.stats)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventumError::Config("Server host is required".to_string()));
    }

    if config.port == 0 {
        return Err(EventumError::Config(
            "Server port must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventumError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(EventumError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventumError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate stats service configuration
fn validate_stats_config(config: &super::StatsConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(EventumError::Config(
            "Stats service base URL is required".to_string(),
        ));
    }

    Url::parse(&config.base_url)
        .map_err(|e| EventumError::Config(format!("Invalid stats base URL: {}", e)))?;

    if config.timeout_seconds == 0 {
        return Err(EventumError::Config(
            "Stats timeout must be greater than 0".to_string(),
        ));
    }

    if config.app_name.is_empty() {
        return Err(EventumError::Config(
            "Stats application name is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventumError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventumError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_malformed_stats_url() {
        let mut settings = Settings::default();
        settings.stats.base_url = "not a url".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
