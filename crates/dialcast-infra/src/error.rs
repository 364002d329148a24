//! HTTP error envelope
//!
//! The `IntoResponse` conversion for `AppError` lives in the API crate: neither the
//! trait nor the type is local here.

use serde::Serialize;
use utoipa::ToSchema;

/// One rejected input field, listed in validation error responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recoverable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    /// Bare `{"error": ...}` body.
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
            code: None,
            recoverable: None,
            suggested_action: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_message_serializes_only_error() {
        let json = serde_json::to_value(ErrorResponse::message("Token is required.")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Token is required." }));
    }
}
