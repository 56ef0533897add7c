//! HTTP error handling
//!
//! Every failed request answers with the same JSON shape so clients can branch on
//! `code` without parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::services::NodeServiceError;

/// JSON error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create a new HTTP error with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NODE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "STRUCTURAL_MISUSE" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<NodeServiceError> for HttpError {
    fn from(err: NodeServiceError) -> Self {
        match &err {
            NodeServiceError::NodeNotFound { .. } => {
                HttpError::new(err.to_string(), "NODE_NOT_FOUND")
            }
            NodeServiceError::StructuralMisuse(_) => {
                HttpError::new(err.to_string(), "STRUCTURAL_MISUSE")
            }
            NodeServiceError::ValidationFailed(_) => {
                HttpError::new(err.to_string(), "VALIDATION_ERROR")
            }
            NodeServiceError::Store(source) => {
                tracing::error!(error = %source, "Store failure while serving request");
                HttpError::with_details(
                    "Store operation failed",
                    "STORE_ERROR",
                    format!("{:?}", source),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;
    use crate::models::ValidationError;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (NodeServiceError::node_not_found("n1"), StatusCode::NOT_FOUND),
            (
                NodeServiceError::structural_misuse("terminal"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                NodeServiceError::ValidationFailed(ValidationError::MissingField("id".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                NodeServiceError::Store(StoreError::lock_poisoned("test")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_details_only_serialized_when_present() {
        let json = serde_json::to_value(HttpError::new("gone", "NODE_NOT_FOUND")).unwrap();
        assert!(json.get("details").is_none());

        let error = HttpError::with_details("boom", "STORE_ERROR", "disk full");
        let json = serde_json::to_value(error).unwrap();
        assert_eq!(json["details"], "disk full");
    }
}
