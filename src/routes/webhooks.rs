use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditLog};
use crate::error::{AppError, ValidationError};
use crate::middleware::WebhookCaller;
use crate::store::Storage;

const USER_UPGRADED: &str = "user.upgraded";

/// Only `user.upgraded` needs `data`; other events may omit it.
#[derive(Deserialize)]
pub struct PolkaEvent {
    pub event: String,
    #[serde(default)]
    pub data: Option<PolkaEventData>,
}

#[derive(Deserialize, Default)]
pub struct PolkaEventData {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl PolkaEvent {
    fn upgraded_user_id(&self) -> Result<Uuid, ValidationError> {
        let raw = self
            .data
            .as_ref()
            .and_then(|data| data.user_id.as_deref())
            .ok_or_else(|| ValidationError::EmptyField("data.user_id".to_string()))?;

        Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat("data.user_id".to_string()))
    }
}

/// POST /api/polka/webhooks
///
/// `user.upgraded` grants Chirpy Red. Other events are acknowledged and
/// ignored so Polka stops retrying them.
pub async fn polka_webhook(
    _caller: web::ReqData<WebhookCaller>,
    body: web::Json<PolkaEvent>,
    storage: web::Data<Storage>,
) -> Result<HttpResponse, AppError> {
    if body.event != USER_UPGRADED {
        tracing::debug!(event = %body.event, "Ignoring Polka event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = body.upgraded_user_id()?;
    let user = storage.users.upgrade_to_chirpy_red(user_id).await?;

    AuditLog::success(AuditAction::UpgradeMembership, "user", "upgraded to Chirpy Red")
        .with_user_id(user.id)
        .with_resource_id(user.id)
        .emit();

    Ok(HttpResponse::NoContent().finish())
}
