//! Token endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::models::{AccessToken, TokenObtainRequest, TokenPair, TokenRefreshRequest};
use crate::state::AppState;
use crate::utils::errors::{EventManagementError, Result};

/// Obtain an access and refresh token pair
#[utoipa::path(
    post,
    path = "/api/token/",
    tag = "auth",
    request_body = TokenObtainRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "No active account found with the given credentials"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    body: std::result::Result<Json<TokenObtainRequest>, JsonRejection>,
) -> Result<Json<TokenPair>> {
    let Json(request) = body?;
    let (username, password) = request.credentials().map_err(EventManagementError::Validation)?;

    let pair = state
        .services
        .auth_service
        .obtain_pair(&username, &password)
        .await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    tag = "auth",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "Access token issued", body = AccessToken),
        (status = 400, description = "Missing refresh token"),
        (status = 401, description = "Token is invalid or expired"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    body: std::result::Result<Json<TokenRefreshRequest>, JsonRejection>,
) -> Result<Json<AccessToken>> {
    let Json(request) = body?;
    let token = request.token().map_err(EventManagementError::Validation)?;

    let access = state.services.auth_service.refresh(&token).await?;
    Ok(Json(access))
}
