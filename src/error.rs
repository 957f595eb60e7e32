/// Application error handling
///
/// Every fallible path in the service returns `AppError`. It wraps a small
/// set of domain errors so handlers can use `?` freely while the HTTP layer
/// still knows which status code and client message each failure maps to:
/// 1. Domain-specific error types (auth, crypto, storage, validation)
/// 2. Unified application error type
/// 3. HTTP response mapping with level-appropriate logging
/// 4. Error context for handler logs

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for request input
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(String),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(String, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
    #[error("password {0}")]
    WeakPassword(String),
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

/// Storage errors, shared by every store implementation
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    #[error("{0} already exists")]
    UniqueConstraintViolation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("record".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                DatabaseError::UniqueConstraintViolation(
                    db_err
                        .constraint()
                        .unwrap_or("record")
                        .to_string(),
                )
            }
            _ => DatabaseError::Persistence(err.to_string()),
        }
    }
}

/// Failures of the hashing, signing and randomness primitives
#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("secure random source unavailable: {0}")]
    Entropy(String),
}

/// Authentication failures. All of them are terminal for the request and
/// surface as `401 Unauthorized`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing or invalid Authorization header")]
    MissingOrMalformedHeader,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token has expired")]
    TokenExpired,
    #[error("unexpected signing method")]
    UnexpectedSigningMethod,
    #[error("token subject is not a valid user id")]
    SubjectParseError,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("refresh token not found")]
    RefreshTokenNotFound,
    #[error("refresh token has been revoked")]
    RefreshTokenRevoked,
    #[error("refresh token has expired")]
    RefreshTokenExpired,
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("invalid API key")]
    InvalidApiKey,
}

impl AuthError {
    /// Message returned to the client.
    ///
    /// Access-token failures other than expiry and bad signatures collapse
    /// into a generic "invalid token".
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::MissingOrMalformedHeader => "missing or invalid Authorization header",
            AuthError::TokenExpired => "token has expired",
            AuthError::InvalidSignature => "invalid token signature",
            AuthError::UnexpectedSigningMethod
            | AuthError::SubjectParseError
            | AuthError::InvalidToken(_) => "invalid token",
            AuthError::RefreshTokenNotFound => "refresh token not found",
            AuthError::RefreshTokenRevoked => "refresh token has been revoked",
            AuthError::RefreshTokenExpired => "refresh token has expired",
            AuthError::InvalidCredentials => "incorrect email or password",
            AuthError::InvalidApiKey => "invalid API key",
        }
    }
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure is on the server side and belongs in the
    /// operational log at `error` level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned to clients: `{"error": "..."}`
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, error_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, _error_id: &str) -> (StatusCode, ErrorResponse) {
        let message = match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) | DatabaseError::NotFound(_) => {
                    e.to_string()
                }
                DatabaseError::Persistence(_) => "Database error occurred".to_string(),
            },
            AppError::Crypto(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Auth(e) => e.client_message().to_string(),
            AppError::Forbidden(msg) => msg.clone(),
        };

        (self.status_code(), ErrorResponse::new(message))
    }

    fn log_error(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Database(DatabaseError::Persistence(_)) => {
                tracing::error!(error_id = error_id, error = %self, "Persistence error");
            }
            AppError::Database(e) => {
                tracing::info!(error_id = error_id, error = %e, "Storage lookup failed");
            }
            AppError::Crypto(e) => {
                tracing::error!(error_id = error_id, error = %e, "Cryptographic operation failed");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(error_id = error_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::Forbidden(msg) => {
                tracing::warn!(error_id = error_id, error = %msg, "Forbidden");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, body) = <Self as ErrorHandler>::error_response(self, &error_id);

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
                DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                DatabaseError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Request-scoped context for handler logs
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Log a failure with this context attached. Server-side failures go to
    /// the operational log at `error` level.
    pub fn log_error(&self, error: &AppError) {
        if error.is_server_error() {
            tracing::error!(
                request_id = %self.request_id,
                operation = %self.operation,
                user_id = ?self.user_id,
                error = %error,
                "Operation failed"
            );
        } else {
            tracing::warn!(
                request_id = %self.request_id,
                operation = %self.operation,
                user_id = ?self.user_id,
                error = %error,
                "Operation rejected"
            );
        }
    }
}
