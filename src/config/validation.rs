//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{BloodLinkError, Result};
use super::Settings;

/// Minimum length of the token signing secret
const MIN_SECRET_LENGTH: usize = 32;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_registration_config(&settings.registration)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(BloodLinkError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    for origin in &config.allowed_origins {
        url::Url::parse(origin).map_err(|e| {
            BloodLinkError::Config(format!("Invalid allowed origin {}: {}", origin, e))
        })?;
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(BloodLinkError::Config(
            "Database URL is required".to_string()
        ));
    }

    let url = url::Url::parse(&config.url)
        .map_err(|e| BloodLinkError::Config(format!("Invalid database URL: {}", e)))?;
    if !matches!(url.scheme(), "postgres" | "postgresql") {
        return Err(BloodLinkError::Config(
            "Database URL must use the postgres scheme".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(BloodLinkError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(BloodLinkError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate authentication configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(BloodLinkError::Config(format!(
            "JWT secret must be at least {} characters",
            MIN_SECRET_LENGTH
        )));
    }

    if config.cookie_name.is_empty()
        || !config.cookie_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(BloodLinkError::Config(
            "Cookie name must be a non-empty token".to_string()
        ));
    }

    if config.token_ttl_hours <= 0 {
        return Err(BloodLinkError::Config(
            "Token TTL must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate donor eligibility configuration
fn validate_registration_config(config: &super::RegistrationConfig) -> Result<()> {
    if config.donation_cooldown_days < 0 {
        return Err(BloodLinkError::Config(
            "Donation cooldown cannot be negative".to_string()
        ));
    }

    if config.max_units_per_registration < 1 {
        return Err(BloodLinkError::Config(
            "Max units per registration must be at least 1".to_string()
        ));
    }

    Ok(())
}

/// Validate rate limit configuration
fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.max_login_attempts == 0 || config.window_seconds == 0 {
        return Err(BloodLinkError::Config(
            "Rate limit attempts and window must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(BloodLinkError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(BloodLinkError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "x".repeat(MIN_SECRET_LENGTH);
        settings
    }

    #[test]
    fn test_valid_settings() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut settings = valid_settings();
        settings.auth.jwt_secret = "short".to_string();
        assert_matches!(validate_settings(&settings), Err(BloodLinkError::Config(_)));
    }

    #[test]
    fn test_database_url_scheme() {
        let mut settings = valid_settings();
        settings.database.url = "mysql://localhost/db".to_string();
        assert_matches!(validate_settings(&settings), Err(BloodLinkError::Config(_)));
    }

    #[test]
    fn test_connection_bounds() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_origin() {
        let mut settings = valid_settings();
        settings.server.allowed_origins = vec!["not a url".to_string()];
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_cookie_name() {
        let mut settings = valid_settings();
        settings.auth.cookie_name = "bad name;".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
