//! The identities `RequireAuth` can establish and the authenticators that
//! produce them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::auth_middleware::Authenticator;
use crate::auth::{bearer_token, validate_access_token, verify_api_key, Sessions};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Caller proven by a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// A stored refresh session presented as `Bearer <refresh_token>`.
///
/// The session may already be revoked or expired; the handler decides
/// what that means for its operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshSession {
    /// Whether this session may mint access tokens at `now`
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.revoked_at.is_some() {
            return Err(AuthError::RefreshTokenRevoked);
        }
        if now >= self.expires_at {
            return Err(AuthError::RefreshTokenExpired);
        }
        Ok(())
    }
}

/// A well-formed but not yet resolved `Bearer <token>` credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Marker for requests carrying the webhook API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookCaller;

#[derive(Clone)]
pub struct AccessTokenAuthenticator {
    settings: JwtSettings,
}

impl AccessTokenAuthenticator {
    pub fn new(settings: JwtSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait(?Send)]
impl Authenticator for AccessTokenAuthenticator {
    type Identity = AuthenticatedUser;

    async fn authenticate(&self, header: &str) -> Result<AuthenticatedUser, AppError> {
        let user_id = validate_access_token(header, &self.settings)?;
        tracing::debug!(user_id = %user_id, "Access token validated");
        Ok(AuthenticatedUser { user_id })
    }
}

#[derive(Clone)]
pub struct RefreshTokenAuthenticator {
    sessions: Sessions,
}

impl RefreshTokenAuthenticator {
    pub fn new(sessions: Sessions) -> Self {
        Self { sessions }
    }
}

#[async_trait::async_trait(?Send)]
impl Authenticator for RefreshTokenAuthenticator {
    type Identity = RefreshSession;

    async fn authenticate(&self, header: &str) -> Result<RefreshSession, AppError> {
        let token = bearer_token(header)?;
        let record = self.sessions.lookup(token).await?;

        Ok(RefreshSession {
            token: token.to_string(),
            user_id: record.user_id,
            expires_at: record.expires_at,
            revoked_at: record.revoked_at,
        })
    }
}

/// Only checks the header shape. Used where the handler resolves the token
/// itself, so that the revoke policy decides what an unknown token means.
#[derive(Clone)]
pub struct BearerTokenAuthenticator;

#[async_trait::async_trait(?Send)]
impl Authenticator for BearerTokenAuthenticator {
    type Identity = BearerToken;

    async fn authenticate(&self, header: &str) -> Result<BearerToken, AppError> {
        Ok(BearerToken(bearer_token(header)?.to_string()))
    }
}

#[derive(Clone)]
pub struct ApiKeyAuthenticator {
    key: String,
}

impl ApiKeyAuthenticator {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait::async_trait(?Send)]
impl Authenticator for ApiKeyAuthenticator {
    type Identity = WebhookCaller;

    async fn authenticate(&self, header: &str) -> Result<WebhookCaller, AppError> {
        verify_api_key(header, &self.key)?;
        Ok(WebhookCaller)
    }
}
