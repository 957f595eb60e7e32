/// Pre-shared API keys for server-to-server callers
use subtle::ConstantTimeEq;

use crate::error::AuthError;

const API_KEY_PREFIX: &str = "ApiKey ";

/// Check an `Authorization: ApiKey <key>` header against the configured key.
///
/// The comparison runs in constant time. An unconfigured (empty) key
/// rejects every caller.
pub fn verify_api_key(header: &str, expected: &str) -> Result<(), AuthError> {
    let presented = header
        .strip_prefix(API_KEY_PREFIX)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(AuthError::MissingOrMalformedHeader)?;

    if expected.is_empty() {
        return Err(AuthError::InvalidApiKey);
    }

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::InvalidApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key() {
        assert_eq!(verify_api_key("ApiKey f271c81ff7084ee5b99a5091b42d486e", "f271c81ff7084ee5b99a5091b42d486e"), Ok(()));
    }

    #[test]
    fn test_wrong_key() {
        assert_eq!(verify_api_key("ApiKey nope", "secret"), Err(AuthError::InvalidApiKey));
        assert_eq!(verify_api_key("ApiKey secre", "secret"), Err(AuthError::InvalidApiKey));
    }

    #[test]
    fn test_wrong_scheme() {
        assert_eq!(
            verify_api_key("Bearer secret", "secret"),
            Err(AuthError::MissingOrMalformedHeader)
        );
        assert_eq!(verify_api_key("ApiKey ", "secret"), Err(AuthError::MissingOrMalformedHeader));
    }

    #[test]
    fn test_unconfigured_key_rejects_everyone() {
        assert_eq!(verify_api_key("ApiKey anything", ""), Err(AuthError::InvalidApiKey));
    }
}
