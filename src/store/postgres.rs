use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChirpStore, SessionStore, UserStore, UserUpdate};
use crate::error::DatabaseError;
use crate::models::{Chirp, RefreshTokenRecord, User};

const USER_COLUMNS: &str = "id, email, password_hash, is_chirpy_red, created_at, updated_at";
const CHIRP_COLUMNS: &str = "id, user_id, body, created_at, updated_at";
const REFRESH_TOKEN_COLUMNS: &str =
    "id, user_id, token_hash, created_at, updated_at, expires_at, revoked_at";

/// PostgreSQL-backed store. Every operation is a single statement.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503"))
}

/// A write referencing a user that no longer exists
fn missing_user(err: sqlx::Error) -> DatabaseError {
    if is_foreign_key_violation(&err) {
        DatabaseError::NotFound("user".to_string())
    } else {
        err.into()
    }
}

fn email_conflict(err: sqlx::Error) -> DatabaseError {
    match DatabaseError::from(err) {
        DatabaseError::UniqueConstraintViolation(_) => {
            DatabaseError::UniqueConstraintViolation("email".to_string())
        }
        other => other,
    }
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, is_chirpy_red, created_at, updated_at)
            VALUES ($1, $2, $3, false, $4, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(email_conflict)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("user".to_string()))
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                updated_at = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.email)
        .bind(update.password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(email_conflict)?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))
    }

    async fn upgrade_to_chirpy_red(&self, id: Uuid) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET is_chirpy_red = true, updated_at = $2
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("user".to_string()))
    }

    async fn reset(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl ChirpStore for PgStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, DatabaseError> {
        let now = Utc::now();

        sqlx::query_as::<_, Chirp>(&format!(
            r#"
            INSERT INTO chirps (id, user_id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {CHIRP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(body)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_user)
    }

    async fn list_chirps(&self) -> Result<Vec<Chirp>, DatabaseError> {
        let chirps = sqlx::query_as::<_, Chirp>(&format!(
            "SELECT {CHIRP_COLUMNS} FROM chirps ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(chirps)
    }

    async fn get_chirp(&self, id: Uuid) -> Result<Chirp, DatabaseError> {
        sqlx::query_as::<_, Chirp>(&format!("SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("chirp".to_string()))
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("chirp".to_string()));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for PgStore {
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, DatabaseError> {
        let now = Utc::now();

        sqlx::query_as::<_, RefreshTokenRecord>(&format!(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, created_at, updated_at, expires_at)
            VALUES ($1, $2, $3, $4, $4, $5)
            RETURNING {REFRESH_TOKEN_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(now)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_user)
    }

    async fn lookup_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<RefreshTokenRecord, DatabaseError> {
        sqlx::query_as::<_, RefreshTokenRecord>(&format!(
            "SELECT {REFRESH_TOKEN_COLUMNS} FROM refresh_tokens WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("refresh token".to_string()))
    }

    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        // The first revocation timestamp wins
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
