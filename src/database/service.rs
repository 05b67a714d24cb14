//! Database service layer
//!
//! This module picks the store behind the repository traits and exposes it
//! to the rest of the application.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::connection::{self, ConnectionConfig, DatabasePool};
use crate::database::memory::InMemoryDatabase;
use crate::database::repositories::{
    EventRepository, PgEventRepository, PgUserRepository, UserRepository,
};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pool: Option<DatabasePool>,
}

impl fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseService")
            .field("backend", &self.backend())
            .finish()
    }
}

impl DatabaseService {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            events: Arc::new(PgEventRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Fresh, empty in-process store
    pub fn in_memory() -> Self {
        let db = InMemoryDatabase::new();
        Self {
            users: Arc::new(db.users()),
            events: Arc::new(db.events()),
            pool: None,
        }
    }

    /// Open the store named by the configuration, running migrations if asked
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.is_in_memory() {
            info!("Using in-memory store");
            return Ok(Self::in_memory());
        }

        let pool = connection::create_pool(&ConnectionConfig::from(config)).await?;
        if config.run_migrations {
            connection::run_migrations(&pool).await?;
        }
        Ok(Self::postgres(pool))
    }

    pub fn backend(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    pub async fn health_check(&self) -> Result<()> {
        match &self.pool {
            Some(pool) => connection::health_check(pool).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let config = DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 1,
            min_connections: 1,
            run_migrations: true,
        };
        let service = DatabaseService::connect(&config).await.unwrap();
        assert_eq!(service.backend(), "memory");
        assert!(service.pool().is_none());
        assert!(service.health_check().await.is_ok());
    }
}
