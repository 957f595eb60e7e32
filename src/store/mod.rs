//! Persistence boundary.
//!
//! Handlers and the session service only see these traits. `PgStore` backs
//! them with PostgreSQL; `InMemoryStore` keeps everything behind a single
//! lock for development and tests.

mod memory;
mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::models::{Chirp, RefreshTokenRecord, User};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Fields of a user that may change after registration
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `UniqueConstraintViolation` if the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, DatabaseError>;

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, DatabaseError>;

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User, DatabaseError>;

    /// Delete every user, and with them every chirp and refresh token.
    async fn reset(&self) -> Result<u64, DatabaseError>;
}

#[async_trait::async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError>;

    /// All chirps, oldest first.
    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError>;

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError>;

    async fn delete_chirp(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// Refresh-token persistence, keyed by the SHA-256 digest of the token.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, DatabaseError>;

    /// Exact match on the digest; `NotFound` otherwise.
    async fn lookup_refresh_token(&self, token_hash: &str)
        -> Result<RefreshTokenRecord, DatabaseError>;

    /// Set `revoked_at` unless already set. Returns whether a row matched.
    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError>;
}

/// The stores the application runs against
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserStore>,
    pub chirps: Arc<dyn ChirpStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            chirps: store.clone(),
            sessions: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::default());
        Self {
            users: store.clone(),
            chirps: store.clone(),
            sessions: store,
        }
    }
}
