/// User Routes
///
/// Registration and credential updates.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::audit::{AuditAction, AuditLog};
use crate::auth::hash_password_blocking;
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::models::UserResponse;
use crate::store::{Storage, UserUpdate};
use crate::validators::{is_valid_email, validate_password};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or weak password
/// - 409: email already registered
pub async fn register(
    body: web::Json<RegisterRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");
    let RegisterRequest { email, password } = body.into_inner();

    let email = is_valid_email(&email)?;
    validate_password(&password)?;
    let password_hash = hash_password_blocking(password).await?;

    let user = match storage.users.create_user(&email, &password_hash).await {
        Ok(user) => user,
        Err(e) => {
            let err = AppError::from(e);
            context.log_error(&err);
            AuditLog::failure(AuditAction::Register, "user", "registration rejected").emit();
            return Err(err);
        }
    };

    AuditLog::success(AuditAction::Register, "user", "user registered")
        .with_user_id(user.id)
        .with_resource_id(user.id)
        .emit();

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Change the caller's email and/or password. At least one is required.
pub async fn update_user(
    user: web::ReqData<AuthenticatedUser>,
    body: web::Json<UpdateUserRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(user.user_id);
    let UpdateUserRequest { email, password } = body.into_inner();

    if email.is_none() && password.is_none() {
        return Err(ValidationError::EmptyField("email or password".to_string()).into());
    }

    let email = email.as_deref().map(is_valid_email).transpose()?;
    let password_hash = match password {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password_blocking(password).await?)
        }
        None => None,
    };

    let updated = storage
        .users
        .update_user(
            user.user_id,
            UserUpdate {
                email,
                password_hash,
            },
        )
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            context.log_error(&err);
            err
        })?;

    AuditLog::success(AuditAction::UpdateCredentials, "user", "credentials updated")
        .with_user_id(updated.id)
        .with_resource_id(updated.id)
        .emit();

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
