//! Bearer authentication
//!
//! [`Caller`] is extracted from the `Authorization` header of every request.
//! Extraction never rejects a request over a bad token; the policy decides
//! whether the operation needs a valid one.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::models::Caller;
use crate::state::AppState;
use crate::utils::errors::EventManagementError;

/// Credentials found in the `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BearerCredentials<'a> {
    Missing,
    Token(&'a str),
    Malformed,
}

/// Read the bearer token; other schemes count as no credentials
pub fn bearer_token(headers: &HeaderMap) -> BearerCredentials<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return BearerCredentials::Missing;
    };
    let Ok(value) = value.to_str() else {
        return BearerCredentials::Malformed;
    };

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            BearerCredentials::Token(token)
        }
        (Some(scheme), _, _) if scheme.eq_ignore_ascii_case("bearer") => BearerCredentials::Malformed,
        _ => BearerCredentials::Missing,
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = EventManagementError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            BearerCredentials::Missing => Ok(Caller::Anonymous),
            BearerCredentials::Malformed => Ok(Caller::InvalidToken(
                "Invalid Authorization header.".to_string(),
            )),
            BearerCredentials::Token(token) => {
                state.services.auth_service.resolve_caller(Some(token)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&HeaderMap::new()), BearerCredentials::Missing);
        assert_eq!(bearer_token(&headers("Bearer abc.def")), BearerCredentials::Token("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc")), BearerCredentials::Token("abc"));
        assert_eq!(bearer_token(&headers("Bearer")), BearerCredentials::Malformed);
        assert_eq!(bearer_token(&headers("Bearer a b")), BearerCredentials::Malformed);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), BearerCredentials::Missing);
    }
}
