mod admin;
mod auth;
mod chirps;
mod health_check;
mod metrics;
mod users;
mod webhooks;

pub use admin::reset;
pub use auth::{login, refresh, revoke, LoginRequest, LoginResponse, TokenResponse};
pub use chirps::{create_chirp, delete_chirp, get_chirp, list_chirps, CreateChirpRequest};
pub use health_check::health_check;
pub use metrics::{metrics, reset_metrics};
pub use users::{register, update_user, RegisterRequest, UpdateUserRequest};
pub use webhooks::{polka_webhook, PolkaEvent, PolkaEventData};
