//! Request extractors with API-shaped rejections

use std::collections::HashMap;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::utils::errors::EventManagementError;

/// Numeric `{id}` path segment; anything else is an unknown route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for EventId
where
    S: Send + Sync,
{
    type Rejection = EventManagementError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let unknown = move || EventManagementError::UnknownPath(path.clone());

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| unknown())?;

        params
            .get("id")
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(EventId)
            .ok_or_else(unknown)
    }
}
