use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::syllabus::document::DocumentError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`;
/// the CLI logs it and exits non-zero.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Structured recovery produced an error marker where data was required.
    #[error("Failed to extract structured data: {0}")]
    Extraction(String),

    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Document(DocumentError::Unsupported(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::Document(DocumentError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Document(DocumentError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Document(_) | AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Document(_) => "DOCUMENT_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                "An AI processing error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Document(DocumentError::Io(e)) => {
                tracing::error!("Document I/O error: {e}");
                "Failed to read the uploaded document".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Document(DocumentError::Unsupported(".odt".into())).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::Document(DocumentError::NotFound(PathBuf::from("a.pdf"))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Extraction("bad".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Llm("x".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_document_error_message_passes_through() {
        let err = AppError::from(DocumentError::Unsupported(".odt".into()));
        assert_eq!(err.to_string(), "Unsupported file type: .odt");
    }

    #[tokio::test]
    async fn test_llm_error_body_hides_details() {
        let response = AppError::Llm("upstream said 500 with key abc".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "LLM_ERROR");
        assert_eq!(json["error"]["message"], "An AI processing error occurred");
    }

    #[tokio::test]
    async fn test_validation_error_body_keeps_message() {
        let response = AppError::Validation("content cannot be empty".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            json["error"]["message"],
            "Validation error: content cannot be empty"
        );
    }
}
