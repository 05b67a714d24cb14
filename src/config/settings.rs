//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "EVENTS_CONFIG";

/// Prefix for environment overrides, e.g. `EVENTS__DATABASE__URL`
pub const ENV_PREFIX: &str = "EVENTS";

/// Database URL selecting the in-process store
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with(MEMORY_DATABASE_URL)
    }
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
}

/// Outbound mail configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// `smtp` or `console`
    pub backend: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: String,
}

/// Rate limiting for the token endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_seconds: u64,
    pub burst_allowance: u32,
    /// Key clients by `X-Forwarded-For`/`X-Real-IP`; enable only behind a proxy that sets them
    pub trust_forwarded_headers: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Directory for daily-rolling log files; stdout only when unset
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from the configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from(&path)
    }

    /// Load settings layered as defaults, then `path` (optional), then environment
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::EventManagementError> {
        super::validation::validate_settings(self)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/event_management".to_string(),
                max_connections: 10,
                min_connections: 1,
                run_migrations: true,
            },
            auth: AuthConfig {
                jwt_secret: "development-secret-change-me".to_string(),
                access_token_ttl_seconds: 300,
                refresh_token_ttl_seconds: 86_400,
            },
            mail: MailConfig {
                backend: "console".to_string(),
                smtp_host: None,
                smtp_port: 587,
                smtp_username: None,
                smtp_password: None,
                from_email: "noreply@example.com".to_string(),
            },
            rate_limit: RateLimitSettings {
                enabled: true,
                max_requests: 20,
                window_seconds: 60,
                burst_allowance: 5,
                trust_forwarded_headers: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                file_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_survive_missing_file() {
        let settings = Settings::load_from("definitely-not-a-config-file").unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.auth.access_token_ttl_seconds, 300);
        assert_eq!(settings.mail.backend, "console");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[database]
url = "memory://"

[mail]
from_email = "events@example.org"
"#
        )
        .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert!(settings.database.is_in_memory());
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.mail.from_email, "events@example.org");
    }

    #[test]
    fn test_bind_address() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address(), "127.0.0.1:8000");
    }
}
