//! User service implementation
//!
//! This service handles account registration and credential checks.

use std::sync::Arc;

use tracing::{debug, info};

use crate::database::repositories::UserRepository;
use crate::models::user::{NewUser, RegisterUserRequest, User, UserResponse};
use crate::services::auth::{hash_password, verify_password};
use crate::utils::errors::{EventManagementError, FieldErrors, Result};
use crate::utils::logging::log_user_action;

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Create an account with a hashed password
    pub async fn register(&self, request: RegisterUserRequest) -> Result<UserResponse> {
        request.check().map_err(EventManagementError::Validation)?;

        let RegisterUserRequest {
            username,
            email,
            password,
        } = request;
        let (Some(username), Some(password)) = (username, password) else {
            return Err(EventManagementError::Validation(FieldErrors::single(
                "non_field_errors",
                "This field is required.",
            )));
        };

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(EventManagementError::Validation(FieldErrors::single(
                "username",
                "A user with that username already exists.",
            )));
        }

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = self
            .users
            .create(NewUser {
                username,
                email: email.map(|e| e.trim().to_string()).unwrap_or_default(),
                password_hash,
            })
            .await?;

        log_user_action(user.id, "register", Some(&user.username));
        info!(user_id = user.id, "New user registered successfully");
        Ok(UserResponse::from(&user))
    }

    /// The active user whose stored hash verifies against `password`
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!(username = username, "Authentication failed: unknown user");
            return Ok(None);
        };
        if !user.is_active {
            debug!(user_id = user.id, "Authentication failed: inactive user");
            return Ok(None);
        }

        let hash = user.password_hash.clone();
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?;

        if verified {
            log_user_action(user.id, "login", None);
            Ok(Some(user))
        } else {
            debug!(user_id = user.id, "Authentication failed: bad password");
            Ok(None)
        }
    }

    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryDatabase;
    use assert_matches::assert_matches;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryDatabase::new().users()))
    }

    fn request(username: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: Some(username.to_string()),
            email: Some("alice@example.com".to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let users = service();
        let created = users.register(request("alice", "pw123")).await.unwrap();
        assert_eq!(created.username, "alice");
        assert_eq!(created.email, "alice@example.com");

        let user = users.authenticate("alice", "pw123").await.unwrap().unwrap();
        assert_eq!(user.id, created.id);
        assert_ne!(user.password_hash, "pw123");

        assert!(users.authenticate("alice", "nope").await.unwrap().is_none());
        assert!(users.authenticate("nobody", "pw123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let users = service();
        users.register(request("alice", "pw123")).await.unwrap();
        let err = users.register(request("alice", "other")).await.unwrap_err();
        assert_matches!(
            err,
            EventManagementError::Validation(fields)
                if fields.get("username") == Some(&["A user with that username already exists.".to_string()][..])
        );
    }
}
