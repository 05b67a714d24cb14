//! Token endpoint payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::user::not_blank;
use crate::utils::errors::FieldErrors;

/// Body of `POST /api/token/`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TokenObtainRequest {
    #[validate(required(message = "This field is required."), custom(function = "not_blank"))]
    pub username: Option<String>,
    #[validate(required(message = "This field is required."), custom(function = "not_blank"))]
    #[schema(write_only)]
    pub password: Option<String>,
}

impl TokenObtainRequest {
    /// Validated `(username, password)`
    pub fn credentials(self) -> Result<(String, String), FieldErrors> {
        if let Err(e) = self.validate() {
            return Err(FieldErrors::from(e));
        }
        match (self.username, self.password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(FieldErrors::single("non_field_errors", "This field is required.")),
        }
    }
}

/// Body of `POST /api/token/refresh/`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TokenRefreshRequest {
    #[validate(required(message = "This field is required."), custom(function = "not_blank"))]
    pub refresh: Option<String>,
}

impl TokenRefreshRequest {
    pub fn token(self) -> Result<String, FieldErrors> {
        if let Err(e) = self.validate() {
            return Err(FieldErrors::from(e));
        }
        self.refresh
            .ok_or_else(|| FieldErrors::single("refresh", "This field is required."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_fields() {
        let request = TokenObtainRequest {
            username: Some("alice".into()),
            password: None,
        };
        let errors = request.credentials().unwrap_err();
        assert_eq!(errors.get("password"), Some(&["This field is required.".to_string()][..]));
        assert!(errors.get("username").is_none());
    }

    #[test]
    fn test_refresh_token_blank() {
        let request = TokenRefreshRequest {
            refresh: Some("  ".into()),
        };
        assert!(request.token().is_err());
    }
}
