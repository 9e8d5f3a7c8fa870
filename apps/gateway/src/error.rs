use agrogate_core::AppError;
use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

/// Gateway error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/gateway-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    /// Stable machine-readable error kind.
    code: &'static str,
    message: String,
}

/// HTTP error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "not_authenticated"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            // Upstream identity failures surface as 502.
            AppError::Unavailable(_) => (StatusCode::BAD_GATEWAY, "identity_unavailable"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Internal detail stays in the logs.
        let message = match &self.0 {
            AppError::Internal(detail) => {
                error!(%detail, "gateway request failed");
                "internal gateway error".to_owned()
            }
            AppError::Unavailable(detail) => {
                warn!(%detail, "identity backend unavailable");
                self.0.to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            [(header::CACHE_CONTROL, "no-store")],
            Json(ErrorResponse { code, message }),
        )
            .into_response()
    }
}

/// Standard gateway result type.
pub type ApiResult<T> = Result<T, ApiError>;
