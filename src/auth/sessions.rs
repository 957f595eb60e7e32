/// Refresh-token sessions
///
/// Wraps a `SessionStore` so callers deal in opaque tokens while storage
/// only ever sees their SHA-256 digests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::refresh_token::{hash_token, issue_refresh_token, IssuedRefreshToken};
use crate::configuration::{JwtSettings, RevokePolicy};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::models::RefreshTokenRecord;
use crate::store::SessionStore;

#[derive(Clone)]
pub struct Sessions {
    store: Arc<dyn SessionStore>,
    lifetime: Duration,
    revoke_policy: RevokePolicy,
}

impl Sessions {
    pub fn new(store: Arc<dyn SessionStore>, lifetime: Duration, revoke_policy: RevokePolicy) -> Self {
        Self {
            store,
            lifetime,
            revoke_policy,
        }
    }

    pub fn from_settings(store: Arc<dyn SessionStore>, settings: &JwtSettings) -> Self {
        Self::new(store, settings.refresh_token_lifetime(), settings.revoke_policy)
    }

    /// Issue a refresh token for `user_id` and persist its digest.
    ///
    /// Every call creates an independent session.
    pub async fn start(&self, user_id: Uuid) -> Result<IssuedRefreshToken, AppError> {
        let issued = issue_refresh_token(self.lifetime)?;
        self.store
            .create_refresh_token(user_id, &hash_token(&issued.token), issued.expires_at)
            .await?;

        tracing::debug!(user_id = %user_id, expires_at = %issued.expires_at, "Refresh session started");
        Ok(issued)
    }

    /// Resolve an opaque token to its stored session, usable or not.
    pub async fn lookup(&self, token: &str) -> Result<RefreshTokenRecord, AppError> {
        match self.store.lookup_refresh_token(&hash_token(token)).await {
            Ok(record) => Ok(record),
            Err(DatabaseError::NotFound(_)) => Err(AuthError::RefreshTokenNotFound.into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Revoke a session. Revoking twice keeps the first timestamp.
    ///
    /// Unknown tokens fail with `RefreshTokenNotFound` under the strict
    /// policy and succeed silently under the lenient one.
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        let matched = self
            .store
            .revoke_refresh_token(&hash_token(token), Utc::now())
            .await?;

        if !matched && self.revoke_policy == RevokePolicy::Strict {
            return Err(AuthError::RefreshTokenNotFound.into());
        }

        Ok(())
    }
}
