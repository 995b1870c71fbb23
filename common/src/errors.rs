// Error handling framework

use crate::models::RecordId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by every repository operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: RecordId },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: RecordId) -> Self {
        RepositoryError::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

/// A single rejected field, as reported by a form or a remote backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid file type '{content_type}'. Please upload PDF, DOC, DOCX, JPG, or PNG files.")]
    InvalidDocumentType { content_type: String },

    #[error("File size {size} bytes exceeds {limit_mb}MB limit.", limit_mb = .limit / (1024 * 1024))]
    DocumentTooLarge { size: u64, limit: u64 },

    #[error("Validation failed: {}", describe_fields(.0))]
    Fields(Vec<FieldError>),
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Fields(vec![FieldError::new(field, message)])
    }

    /// Field-level breakdown, empty for document rejections
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ValidationError::Fields(fields) => fields,
            _ => &[],
        }
    }
}

fn describe_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Seed file errors
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid seed JSON: {0}")]
    InvalidJson(String),

    #[error("Duplicate {entity} id in seed data: {id}")]
    DuplicateId { entity: &'static str, id: RecordId },

    #[error("{entity} seed data leaves no ids to assign")]
    IdsExhausted { entity: &'static str },
}

impl From<serde_json::Error> for SeedError {
    fn from(err: serde_json::Error) -> Self {
        SeedError::InvalidJson(err.to_string())
    }
}

/// Error body exchanged over HTTP between the API server and remote repositories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

pub const CODE_NOT_FOUND: &str = "not_found";
pub const CODE_VALIDATION: &str = "validation_error";
pub const CODE_BAD_GATEWAY: &str = "bad_gateway";
pub const CODE_INTERNAL: &str = "internal_error";

impl ApiError {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Per-field errors carried in `details.fields`, if any
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.details
            .as_ref()
            .and_then(|d| d.get("fields"))
            .and_then(|f| serde_json::from_value::<Vec<FieldError>>(f.clone()).ok())
            .unwrap_or_default()
    }
}

impl From<&RepositoryError> for ApiError {
    fn from(err: &RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::new(CODE_NOT_FOUND, err.to_string()),
            RepositoryError::Validation(validation) => {
                let api_err = ApiError::new(CODE_VALIDATION, err.to_string());
                let fields = validation.field_errors();
                if fields.is_empty() {
                    api_err
                } else {
                    api_err.with_details(serde_json::json!({ "fields": fields }))
                }
            }
            RepositoryError::Transport(_) => ApiError::new(CODE_BAD_GATEWAY, err.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RepositoryError::not_found("Employee", 7);
        assert_eq!(err.to_string(), "Employee not found: 7");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_document_too_large_mentions_limit() {
        let err = ValidationError::DocumentTooLarge {
            size: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024,
        };
        assert!(err.to_string().contains("5MB limit"));
    }

    #[test]
    fn test_field_errors_are_listed() {
        let err = ValidationError::Fields(vec![
            FieldError::new("firstName", "First name is required"),
            FieldError::new("email", "Email is invalid"),
        ]);
        let message = err.to_string();
        assert!(message.contains("firstName: First name is required"));
        assert!(message.contains("email: Email is invalid"));
    }

    #[test]
    fn test_validation_error_to_api_error_carries_fields() {
        let err = RepositoryError::from(ValidationError::field("name", "Name is required"));
        let api_err = ApiError::from(&err);
        assert_eq!(api_err.error, CODE_VALIDATION);
        assert_eq!(
            api_err.field_errors(),
            vec![FieldError::new("name", "Name is required")]
        );
    }

    #[test]
    fn test_transport_error_maps_to_bad_gateway() {
        let api_err = ApiError::from(RepositoryError::Transport("connection refused".into()));
        assert_eq!(api_err.error, CODE_BAD_GATEWAY);
        assert!(api_err.details.is_none());
    }
}
