//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod event;
pub mod notification;
pub mod permission;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, TokenService};
pub use event::EventService;
pub use notification::{mailer_from_config, ConsoleMailer, EmailMessage, Mailer, NotificationService, SmtpMailer};
pub use permission::{Action, AuthorizationPolicy, Decision, DenyReason, EventPolicy};
pub use user::UserService;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub event_service: EventService,
}

impl ServiceFactory {
    /// Wire every service over the given store and mailer
    pub fn new(settings: &Settings, database: &DatabaseService, mailer: Arc<dyn Mailer>) -> Self {
        let user_service = UserService::new(database.users.clone());
        let auth_service = AuthService::new(user_service.clone(), TokenService::new(&settings.auth));
        let notification_service = NotificationService::new(mailer, settings.mail.from_email.clone());
        let event_service = EventService::new(
            database.events.clone(),
            Arc::new(EventPolicy),
            notification_service,
        );

        Self {
            user_service,
            auth_service,
            event_service,
        }
    }
}
