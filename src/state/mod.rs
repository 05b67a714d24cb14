//! Shared application state handed to every handler

use std::sync::Arc;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimitMiddleware};
use crate::services::{Mailer, ServiceFactory};

#[derive(Clone)]
pub struct AppState {
    pub database: DatabaseService,
    pub services: ServiceFactory,
    pub rate_limiter: RateLimitMiddleware,
}

impl AppState {
    pub fn new(settings: Settings, database: DatabaseService, mailer: Arc<dyn Mailer>) -> Self {
        let services = ServiceFactory::new(&settings, &database, mailer);
        let rate_limiter = RateLimitMiddleware::new(RateLimitConfig::from(&settings.rate_limit));

        Self {
            database,
            services,
            rate_limiter,
        }
    }
}
