//! User model

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::utils::errors::FieldErrors;

/// Letters, digits and `@ . + - _`
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid")
});

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Body of `POST /api/users/register/`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUserRequest {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank"),
        length(max = 150, message = "Ensure this field has no more than 150 characters."),
        regex(
            path = *USERNAME_RE,
            message = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
        )
    )]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[validate(required(message = "This field is required."), custom(function = "not_blank"))]
    #[schema(write_only)]
    pub password: Option<String>,
}

impl RegisterUserRequest {
    /// Run field validation, including the optional-email rule
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        if let Some(email) = self.email.as_deref().map(str::trim) {
            if !email.is_empty() && !email.validate_email() {
                errors.add("email", "Enter a valid email address.");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Public view of a user; the password hash never leaves the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(
            ValidationError::new("blank").with_message(Cow::Borrowed("This field may not be blank."))
        );
    }
    Ok(())
}
