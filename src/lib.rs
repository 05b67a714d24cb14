//! Event Management API
//!
//! A REST service where users register accounts, authenticate with JWT,
//! publish events and register attendance. This library provides the
//! configuration, storage, services and HTTP layer; the binary wires them
//! together.

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventManagementError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use handlers::router;
pub use services::ServiceFactory;
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
