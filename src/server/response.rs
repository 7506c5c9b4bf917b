//! JSON envelopes and error mapping

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::blueprint::BlueprintSource;
use crate::storage::{DiagnosisKind, diagnose};
use crate::types::ForgeError;

/// Success envelope: `{data, warnings?, source?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<BlueprintSource>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            source: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_source(mut self, source: BlueprintSource) -> Self {
        self.source = Some(source);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

/// Error response: `{error, code?}` with a mapped status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<ForgeError> for ApiError {
    fn from(err: ForgeError) -> Self {
        let diagnosis = diagnose(&err);
        let status = match (&err, diagnosis.kind) {
            (_, DiagnosisKind::PolicyViolation) => StatusCode::FORBIDDEN,
            (_, DiagnosisKind::ForeignKey) => StatusCode::CONFLICT,
            (_, DiagnosisKind::NotFound) => StatusCode::NOT_FOUND,
            (ForgeError::Validation(_), _) => StatusCode::BAD_REQUEST,
            (ForgeError::Auth(_), _) => StatusCode::UNAUTHORIZED,
            (ForgeError::Timeout { .. } | ForgeError::Llm(_) | ForgeError::LlmApi(_), _) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            warn!("Request rejected ({}): {}", status, err);
        }

        let message = match diagnosis.kind {
            DiagnosisKind::Other => err.to_string(),
            _ => diagnosis.message,
        };
        Self {
            status,
            message,
            code: diagnosis.code,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ValidationError, ValidationErrorKind};

    #[test]
    fn test_status_mapping() {
        let policy: ApiError = ForgeError::access_denied("ideas", "denied").into();
        assert_eq!(policy.status, StatusCode::FORBIDDEN);
        assert_eq!(policy.code.as_deref(), Some("42501"));

        let missing: ApiError = ForgeError::NotFound {
            entity: "Idea",
            id: "x".to_string(),
        }
        .into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let invalid: ApiError =
            ForgeError::from(ValidationError::new(ValidationErrorKind::Format, "bad")).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let storage: ApiError = ForgeError::Storage("disk".to_string()).into();
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(storage.message.contains("disk"));
    }
}
