pub mod attendance;
pub mod employees;
pub mod health;
pub mod onboarding;
pub mod records;
pub mod reports;

// Common response types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::errors::{
    ApiError, RepositoryError, ValidationError, CODE_BAD_GATEWAY, CODE_INTERNAL, CODE_NOT_FOUND,
    CODE_VALIDATION,
};
use serde::Serialize;
use std::any::Any;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            CODE_NOT_FOUND => StatusCode::NOT_FOUND,
            CODE_VALIDATION => StatusCode::BAD_REQUEST,
            CODE_BAD_GATEWAY => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ErrorResponse {
    fn from(err: RepositoryError) -> Self {
        match &err {
            RepositoryError::NotFound { .. } => tracing::debug!(error = %err, "Record not found"),
            RepositoryError::Validation(_) => tracing::warn!(error = %err, "Request rejected"),
            RepositoryError::Transport(_) => {
                tracing::error!(error = %err, "Record backend unavailable")
            }
        }

        let api_error = ApiError::from(&err);
        let response = ErrorResponse::new(api_error.error, api_error.message);
        match api_error.details {
            Some(details) => response.with_details(details),
            None => response,
        }
    }
}

impl From<ValidationError> for ErrorResponse {
    fn from(err: ValidationError) -> Self {
        ErrorResponse::from(RepositoryError::Validation(err))
    }
}

/// Standard error body for a handler that panicked
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Request handler panicked");
    ErrorResponse::new(CODE_INTERNAL, "Internal server error").into_response()
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_status_codes() {
        let cases = [
            (RepositoryError::not_found("Employee", 1), StatusCode::NOT_FOUND),
            (
                ValidationError::field("name", "Name is required").into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepositoryError::Transport("timeout".into()),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ErrorResponse::from(err).status(), status);
        }
        assert_eq!(
            ErrorResponse::new(CODE_INTERNAL, "boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_response_carries_fields() {
        let response = ErrorResponse::from(ValidationError::field("title", "Title is required"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["details"]["fields"][0]["field"], "title");
        assert!(!json["trace_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error_body() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], CODE_INTERNAL);
        assert_eq!(json["message"], "Internal server error");
    }
}
