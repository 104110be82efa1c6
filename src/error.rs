/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 回復できない故障 (validator の障害など) だけがここに来る
 *   プロトコルエラーは error page として描画されるのでここには来ない
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::authorize::AuthorizeError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("authorize endpoint failure: {0}")]
    Authorize(#[from] AuthorizeError),

    #[error("request timed out")]
    Timeout,

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authorize(AuthorizeError::ValidatorTimedOut) | AppError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "TEMPORARILY_UNAVAILABLE",
                "the service is temporarily unavailable".to_string(),
            ),
            // Internals stay in the logs, not in the body.
            AppError::Config(_) | AppError::Authorize(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validation::ValidatorError;

    #[test]
    fn validator_fault_is_500() {
        let err = AppError::from(AuthorizeError::from(ValidatorError::Internal("boom".into())));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validator_timeout_is_503() {
        let err = AppError::from(AuthorizeError::ValidatorTimedOut);
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn body_does_not_leak_internals() {
        let err = AppError::from(AuthorizeError::from(ValidatorError::Internal("db password".into())));
        let res = err.into_response();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("db password"));
        assert!(text.contains("INTERNAL_SERVER_ERROR"));
    }
}
