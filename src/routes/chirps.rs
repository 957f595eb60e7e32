use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditLog};
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::Storage;

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("chirp id".to_string()).into())
}

/// GET /api/chirps
pub async fn list_chirps(storage: web::Data<Storage>) -> Result<HttpResponse, AppError> {
    let chirps = storage.chirps.list_chirps().await?;
    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = storage.chirps.get_chirp(chirp_id).await?;
    Ok(HttpResponse::Ok().json(chirp))
}

/// POST /api/chirps
///
/// The author is always the authenticated caller.
pub async fn create_chirp(
    user: web::ReqData<AuthenticatedUser>,
    body: web::Json<CreateChirpRequest>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let chirp = storage
        .chirps
        .create_chirp(user.user_id, &body.body)
        .await?;

    AuditLog::success(AuditAction::CreateChirp, "chirp", "chirp created")
        .with_user_id(user.user_id)
        .with_resource_id(chirp.id)
        .emit();

    Ok(HttpResponse::Created().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 403: the caller is not the author
/// - 404: no such chirp
pub async fn delete_chirp(
    user: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_delete").with_user_id(user.user_id);
    let chirp_id = parse_chirp_id(&path)?;
    let chirp = storage.chirps.get_chirp(chirp_id).await?;

    if chirp.user_id != user.user_id {
        let err = AppError::Forbidden("you can only delete your own chirps".to_string());
        context.log_error(&err);
        AuditLog::failure(AuditAction::DeleteChirp, "chirp", "caller is not the author")
            .with_user_id(user.user_id)
            .with_resource_id(chirp_id)
            .emit();
        return Err(err);
    }

    storage.chirps.delete_chirp(chirp_id).await?;

    AuditLog::success(AuditAction::DeleteChirp, "chirp", "chirp deleted")
        .with_user_id(user.user_id)
        .with_resource_id(chirp_id)
        .emit();

    Ok(HttpResponse::NoContent().finish())
}
