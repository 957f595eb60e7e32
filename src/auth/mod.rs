/// Authentication module
///
/// Handles access-token issuing/validation, password hashing,
/// refresh-token sessions and webhook API keys.

mod api_key;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod sessions;

pub use api_key::verify_api_key;
pub use claims::Claims;
pub use jwt::{access_token_ttl, bearer_token, issue_access_token, validate_access_token};
pub use password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};
pub use refresh_token::{hash_token, issue_refresh_token, IssuedRefreshToken};
pub use sessions::Sessions;
