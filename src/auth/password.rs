/// Password Hashing and Verification
///
/// bcrypt with a fixed cost of 12. Strength rules live in `validators`;
/// this module only turns passwords into digests and checks candidates.

use bcrypt::{hash, verify};

use crate::error::{AppError, CryptoError};

pub const BCRYPT_COST: u32 = 12;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `CryptoError::Hashing` if bcrypt fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST).map_err(|e| CryptoError::Hashing(e.to_string()).into())
}

/// Verify a candidate password against a stored bcrypt digest
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
/// Returns `CryptoError::Hashing` if the digest is malformed
pub fn verify_password(password_hash: &str, candidate: &str) -> Result<bool, AppError> {
    verify(candidate, password_hash).map_err(|e| CryptoError::Hashing(e.to_string()).into())
}

/// [`hash_password`] on the blocking pool
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool
pub async fn verify_password_blocking(
    password_hash: String,
    candidate: String,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password_hash, &candidate))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))?
}
