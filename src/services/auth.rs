//! Authentication service implementation
//!
//! This service hashes and verifies passwords, issues and validates the
//! access/refresh JWT pair, and turns a bearer token into a [`Caller`].

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::{AccessToken, AuthUser, Caller, TokenPair};
use crate::services::user::UserService;
use crate::utils::errors::{EventManagementError, Result};

const NO_ACTIVE_ACCOUNT: &str = "No active account found with the given credentials";
const TOKEN_NOT_VALID: &str = "Given token not valid for any token type";
const TOKEN_INVALID_OR_EXPIRED: &str = "Token is invalid or expired";

/// Hash a password into an argon2id PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| EventManagementError::PasswordHash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| EventManagementError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string; a malformed hash never verifies
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT payload shared by both token types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub user_id: i64,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 token issuer and validator
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_token_ttl_seconds),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_seconds),
        }
    }

    fn issue(&self, user_id: i64, token_type: TokenType) -> Result<String> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            token_type,
            user_id,
            jti: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn issue_access(&self, user_id: i64) -> Result<String> {
        self.issue(user_id, TokenType::Access)
    }

    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair> {
        Ok(TokenPair {
            refresh: self.issue(user_id, TokenType::Refresh)?,
            access: self.issue(user_id, TokenType::Access)?,
        })
    }

    /// Decode and check signature, expiry and token type
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                EventManagementError::InvalidToken(TOKEN_INVALID_OR_EXPIRED.to_string())
            })?
            .claims;

        if claims.token_type != expected {
            return Err(EventManagementError::InvalidToken("Token has wrong type".to_string()));
        }
        Ok(claims)
    }
}

/// Authentication service for credentials and bearer tokens
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserService, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Exchange credentials for a token pair
    pub async fn obtain_pair(&self, username: &str, password: &str) -> Result<TokenPair> {
        let user = self
            .users
            .authenticate(username, password)
            .await?
            .ok_or_else(|| EventManagementError::Unauthenticated(NO_ACTIVE_ACCOUNT.to_string()))?;

        info!(user_id = user.id, "Token pair issued");
        self.tokens.issue_pair(user.id)
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken> {
        let claims = self.tokens.decode(refresh_token, TokenType::Refresh)?;
        self.active_user(claims.user_id).await?;

        Ok(AccessToken {
            access: self.tokens.issue_access(claims.user_id)?,
        })
    }

    /// Resolve the caller behind an optional bearer token.
    ///
    /// Only infrastructure failures are errors; a bad token yields
    /// [`Caller::InvalidToken`].
    pub async fn resolve_caller(&self, bearer: Option<&str>) -> Result<Caller> {
        let Some(token) = bearer else {
            return Ok(Caller::Anonymous);
        };

        let claims = match self.tokens.decode(token, TokenType::Access) {
            Ok(claims) => claims,
            Err(EventManagementError::InvalidToken(_)) => {
                return Ok(Caller::InvalidToken(TOKEN_NOT_VALID.to_string()));
            }
            Err(e) => return Err(e),
        };

        match self.active_user(claims.user_id).await {
            Ok(user) => Ok(Caller::Authenticated(user)),
            Err(EventManagementError::InvalidToken(reason)) => Ok(Caller::InvalidToken(reason)),
            Err(e) => Err(e),
        }
    }

    async fn active_user(&self, user_id: i64) -> Result<AuthUser> {
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(AuthUser::from(&user)),
            _ => Err(EventManagementError::InvalidToken("User not found".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_ttl_seconds: 300,
            refresh_token_ttl_seconds: 3600,
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let tokens = TokenService::new(&config());
        let pair = tokens.issue_pair(7).unwrap();

        let claims = tokens.decode(&pair.access, TokenType::Access).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.exp - claims.iat, 300);

        assert_matches!(
            tokens.decode(&pair.refresh, TokenType::Access),
            Err(EventManagementError::InvalidToken(_))
        );
        assert_matches!(
            tokens.decode(&pair.access, TokenType::Refresh),
            Err(EventManagementError::InvalidToken(_))
        );
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let tokens = TokenService::new(&config());
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..config()
        });
        let token = other.issue_access(1).unwrap();
        assert!(tokens.decode(&token, TokenType::Access).is_err());
        assert!(tokens.decode("garbage", TokenType::Access).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new(&AuthConfig {
            access_token_ttl_seconds: -10,
            ..config()
        });
        let token = tokens.issue_access(1).unwrap();
        assert!(tokens.decode(&token, TokenType::Access).is_err());
    }
}
