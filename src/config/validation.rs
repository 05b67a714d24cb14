//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::Settings;
use crate::utils::errors::{EventManagementError, Result};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_mail_config(&settings.mail)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventManagementError::Config("Server host is required".to_string()));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventManagementError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(EventManagementError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventManagementError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate JWT configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(EventManagementError::Config("JWT secret is required".to_string()));
    }

    if config.access_token_ttl_seconds <= 0 || config.refresh_token_ttl_seconds <= 0 {
        return Err(EventManagementError::Config(
            "Token lifetimes must be positive".to_string(),
        ));
    }

    if config.refresh_token_ttl_seconds < config.access_token_ttl_seconds {
        return Err(EventManagementError::Config(
            "Refresh token lifetime cannot be shorter than access token lifetime".to_string(),
        ));
    }

    Ok(())
}

/// Validate mail configuration
fn validate_mail_config(config: &super::MailConfig) -> Result<()> {
    if config.from_email.is_empty() {
        return Err(EventManagementError::Config("Sender address is required".to_string()));
    }

    match config.backend.as_str() {
        "console" => Ok(()),
        "smtp" => {
            if config.smtp_host.as_deref().map_or(true, str::is_empty) {
                return Err(EventManagementError::Config(
                    "SMTP host is required for the smtp mail backend".to_string(),
                ));
            }
            Ok(())
        }
        other => Err(EventManagementError::Config(format!(
            "Invalid mail backend: {}. Valid backends: [\"smtp\", \"console\"]",
            other
        ))),
    }
}

/// Validate rate limit configuration
fn validate_rate_limit_config(config: &super::RateLimitSettings) -> Result<()> {
    if config.enabled && (config.max_requests == 0 || config.window_seconds == 0) {
        return Err(EventManagementError::Config(
            "Rate limit window and request budget must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventManagementError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventManagementError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    let valid_formats = ["pretty", "json"];
    if !valid_formats.contains(&config.format.as_str()) {
        return Err(EventManagementError::Config(format!(
            "Invalid log format: {}. Valid formats: {:?}",
            config.format, valid_formats
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_rejects_empty_secret() {
        let mut settings = Settings::default();
        settings.auth.jwt_secret.clear();
        assert_matches!(validate_settings(&settings), Err(EventManagementError::Config(_)));
    }

    #[test]
    fn test_rejects_inverted_pool_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(EventManagementError::Config(_)));
    }

    #[test]
    fn test_smtp_backend_requires_host() {
        let mut settings = Settings::default();
        settings.mail.backend = "smtp".to_string();
        assert!(validate_settings(&settings).is_err());

        settings.mail.smtp_host = Some("smtp.example.com".to_string());
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
