use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ChirpStore, SessionStore, UserStore, UserUpdate};
use crate::error::DatabaseError;
use crate::models::{Chirp, RefreshTokenRecord, User};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    chirps: Vec<Chirp>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// In-process store for development and tests.
///
/// One lock guards all tables so that deleting a user and its dependents is
/// atomic. Guards are never held across an `.await`.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DatabaseError> {
        self.state
            .read()
            .map_err(|_| DatabaseError::Persistence("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DatabaseError> {
        self.state
            .write()
            .map_err(|_| DatabaseError::Persistence("store lock poisoned".to_string()))
    }
}

fn user_not_found() -> DatabaseError {
    DatabaseError::NotFound("user".to_string())
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut state = self.write()?;
        if state.email_taken(email, None) {
            return Err(DatabaseError::UniqueConstraintViolation("email".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        self.read()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        self.read()?
            .users
            .get(&id)
            .cloned()
            .ok_or_else(user_not_found)
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, DatabaseError> {
        let mut state = self.write()?;
        if let Some(email) = &update.email {
            if state.email_taken(email, Some(id)) {
                return Err(DatabaseError::UniqueConstraintViolation("email".to_string()));
            }
        }

        let user = state.users.get_mut(&id).ok_or_else(user_not_found)?;
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User, DatabaseError> {
        let mut state = self.write()?;
        let user = state.users.get_mut(&id).ok_or_else(user_not_found)?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn reset(&self) -> Result<u64, DatabaseError> {
        let mut state = self.write()?;
        let deleted = state.users.len() as u64;
        *state = State::default();

        Ok(deleted)
    }
}

#[async_trait::async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user_id) {
            return Err(user_not_found());
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            user_id,
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.chirps.push(chirp.clone());

        Ok(chirp)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError> {
        // insertion order is creation order
        Ok(self.read()?.chirps.clone())
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError> {
        self.read()?
            .chirps
            .iter()
            .find(|chirp| chirp.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut state = self.write()?;
        let before = state.chirps.len();
        state.chirps.retain(|chirp| chirp.id != id);

        if state.chirps.len() == before {
            return Err(DatabaseError::NotFound("chirp".to_string()));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemoryStore {
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, DatabaseError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user_id) {
            return Err(user_not_found());
        }
        if state.refresh_tokens.contains_key(token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "refresh token".to_string(),
            ));
        }

        let now = Utc::now();
        let record = RefreshTokenRecord {
            id: Uuid::new_v4(),
            user_id,
            token_hash: token_hash.to_string(),
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        state
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());

        Ok(record)
    }

    async fn lookup_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<RefreshTokenRecord, DatabaseError> {
        self.read()?
            .refresh_tokens
            .get(token_hash)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("refresh token".to_string()))
    }

    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let mut state = self.write()?;
        match state.refresh_tokens.get_mut(token_hash) {
            Some(record) => {
                if record.revoked_at.is_none() {
                    record.revoked_at = Some(at);
                    record.updated_at = at;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
