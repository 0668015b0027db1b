use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::utils::error::AppError;

/// Envelope for the catalog admin endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Body of a completed trigger run.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerResponse {
    pub status: String,
    pub found: usize,
}

/// Body of a rejected or crashed trigger run.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerFailure {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "stock-watcher".to_string(),
        }
    }
}

// Errors surfaced by the admin API
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::InternalServerError(msg) => msg.clone(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(format!("{} not found", resource.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::<()>::error(self.error_code(), self.message());
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized => ApiError::Unauthorized,
            AppError::Validation(msg) => ApiError::BadRequest(msg),
            AppError::NotFound { resource } => ApiError::not_found(resource),
            AppError::Conflict(msg) => ApiError::Conflict(msg),
            other => {
                // Store and client details stay in the log
                error!(error = %other, "Request failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success("test data");
        assert!(response.success);
        assert_eq!(response.data, Some("test data"));
        assert!(response.error.is_none());
    }

    #[test]
    fn test_api_response_error() {
        let response = ApiResponse::<()>::error("TEST_ERROR", "Test error message");
        assert!(!response.success);
        assert!(response.data.is_none());

        let error = response.error.unwrap();
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test error message");
    }

    #[test]
    fn test_app_error_mapping() {
        assert_eq!(
            ApiError::from(AppError::Validation("bad url".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AppError::Conflict("dup".to_string())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::from(AppError::Unauthorized).status_code(), StatusCode::UNAUTHORIZED);

        let internal = ApiError::from(AppError::DataAccess(sqlx::Error::PoolTimedOut));
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.message(), "Internal server error");
    }

    #[test]
    fn test_not_found_message() {
        let not_found = ApiError::not_found("Product");
        assert_eq!(not_found.error_code(), "NOT_FOUND");
        assert_eq!(not_found.message(), "Product not found");
    }

    #[test]
    fn test_trigger_bodies() {
        let ok = serde_json::to_value(TriggerResponse {
            status: "ok".to_string(),
            found: 2,
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({ "status": "ok", "found": 2 }));

        let failure = serde_json::to_value(TriggerFailure {
            error: "Unauthorized".to_string(),
        })
        .unwrap();
        assert_eq!(failure, serde_json::json!({ "error": "Unauthorized" }));
    }
}
