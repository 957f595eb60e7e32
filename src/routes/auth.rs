/// Authentication Routes
///
/// Login, access-token refresh and refresh-token revocation.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditLog};
use crate::auth::{access_token_ttl, issue_access_token, verify_password_blocking, Sessions};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError, ErrorContext};
use crate::middleware::{BearerToken, RefreshSession};
use crate::models::UserResponse;
use crate::store::Storage;

/// Cost-12 digest checked when the email is unknown
const DUMMY_PASSWORD_HASH: &str = "$2b$12$......................21jzCB1r6pN6rp5O2Ev0ejjTAboskKm";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Shorter access-token lifetime requested by the client
    pub expires_in_seconds: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// Returns an access token and a new refresh token. Every login opens an
/// independent session.
///
/// # Errors
/// - 401: unknown email or wrong password (same message for both)
pub async fn login(
    body: web::Json<LoginRequest>,
    storage: web::Data<Storage>,
    sessions: web::Data<Sessions>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let LoginRequest {
        email,
        password,
        expires_in_seconds,
    } = body.into_inner();

    // Registration stores the trimmed address
    let user = match storage.users.get_user_by_email(email.trim()).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => {
            // Spend the same bcrypt time as a real check
            verify_password_blocking(DUMMY_PASSWORD_HASH.to_string(), password).await?;
            AuditLog::failure(AuditAction::Login, "user", "unknown email").emit();
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password_blocking(user.password_hash.clone(), password).await? {
        AuditLog::failure(AuditAction::Login, "user", "wrong password")
            .with_user_id(user.id)
            .emit();
        return Err(AuthError::InvalidCredentials.into());
    }

    let ttl = access_token_ttl(expires_in_seconds, jwt_config.access_token_ttl());
    let token = issue_access_token(user.id, &jwt_config.secret, ttl, &jwt_config.issuer)?;
    let refresh = sessions.start(user.id).await?;

    AuditLog::success(AuditAction::Login, "user", "login succeeded")
        .with_user_id(user.id)
        .emit();

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        access_ttl_seconds = ttl.num_seconds(),
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: user.into(),
        token,
        refresh_token: refresh.token,
    }))
}

/// POST /api/refresh
///
/// Mint a new access token from a usable refresh token. The refresh token
/// itself is not rotated.
///
/// # Errors
/// - 401: refresh token unknown, revoked or expired
pub async fn refresh(
    session: web::ReqData<RefreshSession>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh").with_user_id(session.user_id);

    if let Err(e) = session.ensure_usable(Utc::now()) {
        AuditLog::failure(AuditAction::RefreshAccessToken, "refresh_token", e.to_string())
            .with_user_id(session.user_id)
            .emit();
        let err = AppError::from(e);
        context.log_error(&err);
        return Err(err);
    }

    let token = issue_access_token(
        session.user_id,
        &jwt_config.secret,
        jwt_config.access_token_ttl(),
        &jwt_config.issuer,
    )?;

    AuditLog::success(AuditAction::RefreshAccessToken, "refresh_token", "access token minted")
        .with_user_id(session.user_id)
        .emit();

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Revoke the presented refresh token. Revoking an already revoked token
/// succeeds and keeps the original revocation time; an unknown token is
/// handled according to the configured revoke policy.
pub async fn revoke(
    presented: web::ReqData<BearerToken>,
    sessions: web::Data<Sessions>,
) -> Result<HttpResponse, AppError> {
    if let Err(e) = sessions.revoke(&presented.0).await {
        AuditLog::failure(AuditAction::RevokeRefreshToken, "refresh_token", e.to_string()).emit();
        return Err(e);
    }

    AuditLog::success(AuditAction::RevokeRefreshToken, "refresh_token", "refresh token revoked")
        .emit();

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;

    #[test]
    fn test_dummy_hash_is_a_full_cost_digest() {
        assert!(DUMMY_PASSWORD_HASH.starts_with("$2b$12$"));
        // Parses, so unknown emails pay for a real comparison
        let matched = verify_password(DUMMY_PASSWORD_HASH, "Secret123!")
            .expect("Failed to verify password");
        assert!(!matched);
    }
}
