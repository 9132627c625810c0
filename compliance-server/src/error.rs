//! Error types for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use compliance_core::ComplianceError;
use serde::Serialize;
use std::fmt;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Not found (404)
    NotFound(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),

    /// Compliance engine error
    Core(ComplianceError),

    /// Serialization error
    SerializationError(serde_json::Error),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    timestamp: chrono::DateTime<chrono::Utc>,
    path: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::Core(e) => write!(f, "Compliance engine error: {}", e),
            ApiError::SerializationError(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ComplianceError> for ApiError {
    fn from(err: ComplianceError) -> Self {
        ApiError::Core(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err)
    }
}

/// Map a [`ComplianceError`] to a status code and stable `(code, message, details)`,
/// per the §7 error taxonomy.
fn classify_core_error(err: &ComplianceError) -> (StatusCode, String, Option<String>) {
    let status = match err {
        ComplianceError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
        ComplianceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ComplianceError::BusinessRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ComplianceError::InvalidState { .. } => StatusCode::CONFLICT,
        ComplianceError::DuplicateOperation(_) => StatusCode::CONFLICT,
        ComplianceError::InactiveEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ComplianceError::OrganizationContextRequired => StatusCode::BAD_REQUEST,
        ComplianceError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        ComplianceError::Serialization(_) => StatusCode::BAD_REQUEST,
    };
    let details = match err {
        ComplianceError::ValidationError(errs) => Some(errs.join("; ")),
        ComplianceError::InvalidState { allowed, .. } => Some(format!("allowed: {:?}", allowed)),
        _ => None,
    };
    (status, err.to_string(), details)
}

impl ApiError {
    /// Render the error response, stamping the originating request path.
    pub fn into_response_with_path(self, path: String) -> Response {
        let (status, code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "ENTITY_NOT_FOUND", msg, None),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg, None)
            }
            ApiError::Core(e) => {
                let (status, message, details) = classify_core_error(&e);
                (status, e.code(), message, details)
            }
            ApiError::SerializationError(e) => {
                (StatusCode::BAD_REQUEST, "SERIALIZATION_ERROR", format!("invalid JSON: {}", e), None)
            }
        };

        crate::metrics::record_error(code);

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody { code, message, details, timestamp: chrono::Utc::now(), path },
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_with_path(String::new())
    }
}
