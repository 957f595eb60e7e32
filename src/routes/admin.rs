use actix_web::{web, HttpResponse};

use crate::audit::{AuditAction, AuditLog};
use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::store::Storage;

/// POST /admin/reset
///
/// Delete every user, cascading to chirps and refresh tokens. Only
/// available on the `dev` platform.
pub async fn reset(
    app_config: web::Data<ApplicationSettings>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    if !app_config.is_dev() {
        AuditLog::failure(AuditAction::Reset, "user", "reset outside dev platform").emit();
        return Err(AppError::Forbidden(
            "reset is only allowed in the dev environment".to_string(),
        ));
    }

    let deleted = storage.users.reset().await?;

    AuditLog::success(AuditAction::Reset, "user", format!("{} users deleted", deleted)).emit();
    tracing::warn!(deleted_users = deleted, "All users deleted");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Reset complete: {} users deleted", deleted)))
}
