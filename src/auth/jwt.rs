/// Access Token Issuing and Validation
///
/// Access tokens are HS256-signed JWTs carrying the user id as subject.
/// They are never stored; validity is decided by signature and expiry alone.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, CryptoError};

const BEARER_PREFIX: &str = "Bearer ";

/// Issue a signed access token for a user
///
/// # Arguments
/// * `user_id` - Subject of the token
/// * `secret` - HMAC signing secret
/// * `ttl` - Lifetime of the token
/// * `issuer` - Value of the `iss` claim
///
/// # Errors
/// Returns `CryptoError::Signing` if the secret is empty or encoding fails
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    ttl: Duration,
    issuer: &str,
) -> Result<String, AppError> {
    if secret.is_empty() {
        return Err(CryptoError::Signing("signing secret is empty".to_string()).into());
    }

    let claims = Claims::new(user_id, ttl, issuer);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CryptoError::Signing(e.to_string()).into())
}

/// Lifetime for a new access token.
///
/// A client may ask for a shorter window than the configured maximum, never
/// a longer one. Missing or non-positive requests get the maximum.
pub fn access_token_ttl(requested_seconds: Option<i64>, max: Duration) -> Duration {
    match requested_seconds {
        Some(seconds) if seconds > 0 && seconds < max.num_seconds() => Duration::seconds(seconds),
        _ => max,
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingOrMalformedHeader)
}

/// Validate an `Authorization` header carrying an access token and return
/// the authenticated user id
///
/// # Errors
/// - `MissingOrMalformedHeader` if the header is not `Bearer <token>`
/// - `UnexpectedSigningMethod` if the token is not HS256
/// - `InvalidSignature` if the signature does not verify under the secret
/// - `TokenExpired` once `now >= exp`
/// - `SubjectParseError` if the subject is not a UUID
/// - `InvalidToken` for any other decoding or claim failure
pub fn validate_access_token(header: &str, config: &JwtSettings) -> Result<Uuid, AuthError> {
    let token = bearer_token(header)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation error: {}", e);
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => AuthError::UnexpectedSigningMethod,
            _ => AuthError::InvalidToken(e.to_string()),
        }
    })?;

    // jsonwebtoken accepts exp == now; the token is already dead at that instant
    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    claims.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::RevokePolicy;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "chirpy".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 5_184_000,
            revoke_policy: RevokePolicy::Strict,
        }
    }

    fn issue(config: &JwtSettings, user_id: Uuid, ttl: Duration) -> String {
        issue_access_token(user_id, &config.secret, ttl, &config.issuer)
            .expect("Failed to issue token")
    }

    #[test]
    fn test_issue_and_validate_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = issue(&config, user_id, Duration::hours(1));
        let validated = validate_access_token(&format!("Bearer {}", token), &config)
            .expect("Failed to validate token");

        assert_eq!(validated, user_id);
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc"), Ok("abc"));
        assert_eq!(bearer_token("Bearer   abc  "), Ok("abc"));
        assert_eq!(bearer_token("Token abc"), Err(AuthError::MissingOrMalformedHeader));
        assert_eq!(bearer_token("bearer abc"), Err(AuthError::MissingOrMalformedHeader));
        assert_eq!(bearer_token("Bearer "), Err(AuthError::MissingOrMalformedHeader));
        assert_eq!(bearer_token(""), Err(AuthError::MissingOrMalformedHeader));
    }

    #[test]
    fn test_wrong_scheme_is_malformed_header() {
        let config = get_test_config();
        let token = issue(&config, Uuid::new_v4(), Duration::hours(1));

        let result = validate_access_token(&format!("Token {}", token), &config);
        assert_eq!(result, Err(AuthError::MissingOrMalformedHeader));
    }

    #[test]
    fn test_empty_secret_fails_to_sign() {
        let result = issue_access_token(Uuid::new_v4(), "", Duration::hours(1), "chirpy");
        assert!(matches!(result, Err(AppError::Crypto(CryptoError::Signing(_)))));
    }

    #[test]
    fn test_garbage_token() {
        let config = get_test_config();
        let result = validate_access_token("Bearer invalid.token.here", &config);

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let token = issue(&config, Uuid::new_v4(), Duration::hours(1));

        let tampered = format!("{}X", token);
        let result = validate_access_token(&format!("Bearer {}", tampered), &config);

        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_flipped_signature_bit() {
        let config = get_test_config();
        let token = issue(&config, Uuid::new_v4(), Duration::hours(1));

        let (message, signature) = token.rsplit_once('.').unwrap();
        let mut signature = signature.to_string();
        // 'A' and 'B' differ only in the lowest of the six bits they encode
        let flipped = if signature.starts_with('A') { "B" } else { "A" };
        signature.replace_range(0..1, flipped);

        let result =
            validate_access_token(&format!("Bearer {}.{}", message, signature), &config);
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret() {
        let config = get_test_config();
        let token = issue(&config, Uuid::new_v4(), Duration::hours(1));

        let mut other = get_test_config();
        other.secret = "a-completely-different-signing-secret".to_string();

        let result = validate_access_token(&format!("Bearer {}", token), &other);
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_expired_token() {
        let config = get_test_config();
        let token = issue(&config, Uuid::new_v4(), Duration::seconds(-10));

        let result = validate_access_token(&format!("Bearer {}", token), &config);
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_token_expires_at_exact_instant() {
        let config = get_test_config();
        let token = issue(&config, Uuid::new_v4(), Duration::zero());

        let result = validate_access_token(&format!("Bearer {}", token), &config);
        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_unexpected_signing_method() {
        let config = get_test_config();
        let claims = Claims::new(Uuid::new_v4(), Duration::hours(1), &config.issuer);
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let result = validate_access_token(&format!("Bearer {}", token), &config);
        assert_eq!(result, Err(AuthError::UnexpectedSigningMethod));
    }

    #[test]
    fn test_non_uuid_subject() {
        let config = get_test_config();
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1), &config.issuer);
        claims.sub = "17".to_string();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        let result = validate_access_token(&format!("Bearer {}", token), &config);
        assert_eq!(result, Err(AuthError::SubjectParseError));
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        let token = issue(&config, Uuid::new_v4(), Duration::hours(1));

        config.issuer = "wrong-issuer".to_string();
        let result = validate_access_token(&format!("Bearer {}", token), &config);

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_access_token_ttl_is_capped() {
        let max = Duration::hours(1);

        assert_eq!(access_token_ttl(None, max), max);
        assert_eq!(access_token_ttl(Some(1), max), Duration::seconds(1));
        assert_eq!(access_token_ttl(Some(7200), max), max);
        assert_eq!(access_token_ttl(Some(0), max), max);
        assert_eq!(access_token_ttl(Some(-5), max), max);
    }
}
