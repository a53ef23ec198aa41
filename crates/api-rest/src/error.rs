//! API error type with structured JSON responses.

use api_shared::{ErrorRes, FieldError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use herbdx_core::{CatalogError, DiagnosisError};

const VALIDATION_MESSAGE: &str = "입력 값이 올바르지 않습니다";

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request")]
    Validation(Vec<FieldError>),
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorRes::new("VALIDATION_ERROR", VALIDATION_MESSAGE).with_details(details),
            ),
            ApiError::CatalogUnavailable(detail) => {
                tracing::error!(detail = %detail, "catalog unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorRes::new(
                        "CATALOG_UNAVAILABLE",
                        "The catalog is temporarily unavailable",
                    ),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorRes::new("INTERNAL", "An internal error occurred"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DiagnosisError> for ApiError {
    fn from(err: DiagnosisError) -> Self {
        match &err {
            DiagnosisError::CatalogTimeout { .. } => ApiError::CatalogUnavailable(err.to_string()),
            DiagnosisError::Catalog {
                source: CatalogError::Unavailable(_),
                ..
            } => ApiError::CatalogUnavailable(err.to_string()),
            DiagnosisError::Catalog { .. } => ApiError::Internal(err.to_string()),
        }
    }
}
