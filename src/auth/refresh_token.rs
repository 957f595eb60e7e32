/// Refresh Token Generation
///
/// Refresh tokens are:
/// - 32 bytes from the OS random source, hex-encoded (64 characters)
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Valid for a fixed lifetime unless revoked first

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{AppError, CryptoError};

const REFRESH_TOKEN_BYTES: usize = 32;

/// A freshly minted refresh token. `token` is what the client keeps.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Generate a new refresh token valid for `lifetime`
///
/// # Errors
/// Returns `CryptoError::Entropy` if the OS random source fails
pub fn issue_refresh_token(lifetime: Duration) -> Result<IssuedRefreshToken, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;

    Ok(IssuedRefreshToken {
        token: hex::encode(bytes),
        expires_at: Utc::now() + lifetime,
    })
}

/// Hash a refresh token using SHA-256
///
/// Only this digest is ever stored or used as a lookup key.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_issue_refresh_token() {
        let issued = issue_refresh_token(Duration::days(60)).unwrap();

        assert_eq!(issued.token.len(), 64);
        assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));

        let remaining = issued.expires_at - Utc::now();
        assert!(remaining > Duration::days(59));
        assert!(remaining <= Duration::days(60));
    }

    #[test]
    fn test_tokens_do_not_collide() {
        let tokens: HashSet<String> = (0..1000)
            .map(|_| issue_refresh_token(Duration::days(1)).unwrap().token)
            .collect();

        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_token_hashing() {
        let token = issue_refresh_token(Duration::days(1)).unwrap().token;
        let hash1 = hash_token(&token);
        let hash2 = hash_token(&token);

        assert_eq!(hash1, hash2);
        assert_ne!(token, hash1);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
