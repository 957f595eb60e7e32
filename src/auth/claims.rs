/// JWT Claims structure
///
/// Payload of an access token: the registered claims of RFC 7519 that the
/// service issues and checks.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create claims for `user_id` expiring `ttl` from now
    pub fn new(user_id: Uuid, ttl: Duration, issuer: &str) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            iss: issuer.to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `SubjectParseError` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::SubjectParseError)
    }

    /// A token is expired once `now >= exp`
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
