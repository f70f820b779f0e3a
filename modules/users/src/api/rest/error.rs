use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::error::DomainError;

/// Error body for every non-validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Validation failures: field name → first message for that field, no envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FieldErrors(pub BTreeMap<String, String>);

/// Everything a REST handler can fail with. The single place where
/// failures turn into status codes and JSON bodies.
#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    BadRequest(String),
    Domain(DomainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(e) => map_domain_error_to_status_code(e),
        }
    }
}

/// Map domain errors to HTTP status codes
fn map_domain_error_to_status_code(error: &DomainError) -> StatusCode {
    match error {
        DomainError::UserNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::EmailAlreadyExists { .. } => StatusCode::BAD_REQUEST,
        DomainError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::Domain(e)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                let message = errs.first().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })?;
                Some((field.to_string(), message))
            })
            .collect();
        ApiError::Validation(FieldErrors(fields))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(fields) => (status, Json(fields)).into_response(),
            ApiError::BadRequest(message) => {
                (status, Json(ErrorBody::new(status, message))).into_response()
            }
            ApiError::Domain(e @ DomainError::Database { .. }) => {
                error!(error = %e, "Unexpected error while handling request");
                let body = ErrorBody::new(status, format!("An unexpected error occurred: {e}"));
                (status, Json(body)).into_response()
            }
            ApiError::Domain(e) => (status, Json(ErrorBody::new(status, e.to_string()))).into_response(),
        }
    }
}
