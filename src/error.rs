use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures talking to the remote ledger.
///
/// None of these are retried inside the client. The watcher's next tick is the
/// retry for anything on the polling path.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Ledger returned {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    Protocol(String),
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", message),
            other => {
                tracing::error!("❌ Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON encoding error: {:?}", error))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let response = AppError::NotFound("Result not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Result not found");
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_leaked() {
        let err = AppError::Ledger(LedgerError::HttpStatus {
            code: 401,
            body: "bad api key sk-secret".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal error");
        assert!(!body.to_string().contains("sk-secret"));
    }

    #[test]
    fn test_http_status_display_includes_body() {
        let err = LedgerError::HttpStatus {
            code: 503,
            body: "maintenance".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance"));
    }
}
