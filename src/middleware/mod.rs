/// Middleware module
///
/// `RequireAuth` and the authenticators it can be configured with.

mod auth_middleware;
mod authenticators;

pub use auth_middleware::{Authenticator, RequireAuth};
pub use authenticators::{
    AccessTokenAuthenticator, ApiKeyAuthenticator, AuthenticatedUser, BearerToken,
    BearerTokenAuthenticator, RefreshSession, RefreshTokenAuthenticator, WebhookCaller,
};
