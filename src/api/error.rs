//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::scheduling::SchedulingError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },
    #[error("Appointment conflict")]
    Conflict,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, details)
            }
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                "APPOINTMENT_CONFLICT",
                "Appointment already exists for this professional and startAt.".to_string(),
                None,
            ),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Unexpected internal error.".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(message) => ApiError::Validation {
                message,
                details: None,
            },
            SchedulingError::Conflict => ApiError::Conflict,
            SchedulingError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn validation_returns_400() {
        let response = ApiError::validation("startAt must be in the future.").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "startAt must be in the future.");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn validation_details_are_serialized() {
        let response = ApiError::Validation {
            message: "Validation failed.".into(),
            details: Some(serde_json::json!([
                {"field": "professionalId", "message": "must be a non-empty string"}
            ])),
        }
        .into_response();
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["details"][0]["field"], "professionalId");
    }

    #[tokio::test]
    async fn conflict_returns_409() {
        let response = ApiError::Conflict.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "APPOINTMENT_CONFLICT");
    }

    #[tokio::test]
    async fn internal_returns_500_and_hides_detail() {
        let response = ApiError::Internal("db exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], "Unexpected internal error.");
    }

    #[tokio::test]
    async fn scheduling_errors_map_to_api_errors() {
        let validation: ApiError =
            SchedulingError::Validation("startAt minute must be 0 or 30.".into()).into();
        assert_eq!(
            validation.into_response().status(),
            StatusCode::BAD_REQUEST
        );

        let conflict: ApiError = SchedulingError::Conflict.into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let storage: ApiError = SchedulingError::Storage(DatabaseError::ConstraintViolation(
            "something else".into(),
        ))
        .into();
        assert_eq!(
            storage.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
