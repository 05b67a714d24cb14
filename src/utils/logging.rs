//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the event management service.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::utils::errors::{EventManagementError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process does.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| EventManagementError::Config(format!("Invalid log filter: {}", e)))?;

    let (file_layer, guard) = match config.file_path.as_deref() {
        Some(directory) if !directory.is_empty() => {
            let file_appender = tracing_appender::rolling::daily(directory, "event-management.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    let json = config.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stdout)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stdout)))
        .with(file_layer)
        .try_init()
        .map_err(|e| EventManagementError::Config(format!("Logging already initialized: {}", e)))?;

    info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log authorization denials
pub fn log_permission_denied(action: &str, user_id: Option<i64>, reason: &str) {
    warn!(
        action = action,
        user_id = user_id,
        reason = reason,
        "Permission denied"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64) {
    debug!(
        operation = operation,
        table = table,
        duration_ms = duration_ms,
        "Database operation completed"
    );
}
