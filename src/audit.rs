/// Audit trail
///
/// Security-relevant events (registration, logins, token refresh and
/// revocation, membership upgrades) are emitted as structured records on
/// the `audit` tracing target, separate from the request log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Register,
    UpdateCredentials,
    Login,
    RefreshAccessToken,
    RevokeRefreshToken,
    CreateChirp,
    DeleteChirp,
    UpgradeMembership,
    Reset,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuditAction::Register => "register",
            AuditAction::UpdateCredentials => "update_credentials",
            AuditAction::Login => "login",
            AuditAction::RefreshAccessToken => "refresh_access_token",
            AuditAction::RevokeRefreshToken => "revoke_refresh_token",
            AuditAction::CreateChirp => "create_chirp",
            AuditAction::DeleteChirp => "delete_chirp",
            AuditAction::UpgradeMembership => "upgrade_membership",
            AuditAction::Reset => "reset",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    Success,
    Failure,
}

/// One audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditLog {
    pub log_id: String,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    /// user, chirp, refresh_token, ...
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub user_id: Option<String>,
    pub status: AuditStatus,
    pub message: String,
}

impl AuditLog {
    pub fn new(
        action: AuditAction,
        resource_type: impl Into<String>,
        status: AuditStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            log_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            resource_type: resource_type.into(),
            resource_id: None,
            user_id: None,
            status,
            message: message.into(),
        }
    }

    pub fn success(action: AuditAction, resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(action, resource_type, AuditStatus::Success, message)
    }

    pub fn failure(action: AuditAction, resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(action, resource_type, AuditStatus::Failure, message)
    }

    pub fn with_resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Write the record to the audit target. Failures go out at `warn`.
    pub fn emit(&self) {
        match self.status {
            AuditStatus::Failure => tracing::warn!(
                target: "audit",
                log_id = %self.log_id,
                action = %self.action,
                resource_type = %self.resource_type,
                resource_id = ?self.resource_id,
                user_id = ?self.user_id,
                status = "FAILURE",
                message = %self.message,
                "Audit log entry"
            ),
            AuditStatus::Success => tracing::info!(
                target: "audit",
                log_id = %self.log_id,
                action = %self.action,
                resource_type = %self.resource_type,
                resource_id = ?self.resource_id,
                user_id = ?self.user_id,
                status = "SUCCESS",
                message = %self.message,
                "Audit log entry"
            ),
        }
    }
}
