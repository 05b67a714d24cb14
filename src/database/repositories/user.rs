//! User repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::UserRepository;
use crate::models::user::{NewUser, User};
use crate::utils::errors::{EventManagementError, FieldErrors, Result};

pub(crate) const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, request: NewUser) -> Result<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, is_active, date_joined)
            VALUES ($1, $2, $3, TRUE, $4)
            RETURNING id, username, email, password_hash, is_active, date_joined
            "#,
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                EventManagementError::Validation(FieldErrors::single("username", DUPLICATE_USERNAME)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_active, date_joined FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_active, date_joined FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
