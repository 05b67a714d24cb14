//! Account registration endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{RegisterUserRequest, UserResponse};
use crate::state::AppState;
use crate::utils::errors::Result;

/// Create a user account
#[utoipa::path(
    post,
    path = "/api/users/register/",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid fields or username taken")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(request) = body?;
    let user = state.services.user_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
