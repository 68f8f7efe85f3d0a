/*
 * Responsibility
 * - アプリ共通の AppError 定義 (呼び出し元に見せる分類はここだけ)
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - ServiceError を統一的に変換。内部エラーの詳細はレスポンスに載せない
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ServiceError;

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
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            AppError::Internal => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidArgument(message) => AppError::invalid_argument(message),
            ServiceError::DeadlineExceeded => AppError::DeadlineExceeded,
            // Already logged with op/uid by the service.
            ServiceError::Internal(_) => AppError::Internal,
        }
    }
}
