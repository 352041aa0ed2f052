//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub registration: RegistrationConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to send credentialed requests
    pub allowed_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

/// Authentication cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub cookie_name: String,
    pub token_ttl_hours: i64,
    pub secure_cookies: bool,
}

/// Donor eligibility rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
    pub donation_cooldown_days: i64,
    pub max_units_per_registration: i32,
}

/// Login throttling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub max_login_attempts: u32,
    pub window_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables.
    ///
    /// Values missing from both sources fall back to [`Settings::default`].
    /// Environment variables use the `BLOODLINK__SECTION__KEY` form.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load("config")
    }

    /// Load settings from a specific configuration file (extension optional)
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("BLOODLINK")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::BloodLinkError> {
        super::validation::validate_settings(self)
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/bloodlink".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                run_migrations: true,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                cookie_name: "bloodlink_token".to_string(),
                token_ttl_hours: 24 * 7,
                secure_cookies: false,
            },
            registration: RegistrationConfig {
                donation_cooldown_days: 90,
                max_units_per_registration: 2,
            },
            rate_limit: RateLimitConfig {
                max_login_attempts: 5,
                window_seconds: 300,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "bloodlink.log".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.cookie_name, "bloodlink_token");
        assert_eq!(settings.registration.donation_cooldown_days, 90);
        assert_eq!(settings.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[auth]
jwt_secret = "a-very-long-secret-value-for-tests"
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let settings = Settings::load(path).unwrap();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.auth.jwt_secret, "a-very-long-secret-value-for-tests");
        assert_eq!(settings.auth.token_ttl_hours, 24 * 7);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load("/nonexistent/bloodlink-config").unwrap();
        assert_eq!(settings.database.max_connections, 10);
    }
}
