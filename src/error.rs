use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::{
    ERR_ACCESS_DENIED, ERR_ENDPOINT_NOT_FOUND, ERR_INTERNAL, ERR_INVALID_CREDENTIALS,
    ERR_INVALID_TOKEN, ERR_NEWS_FETCH_INTERNAL, ERR_NEWS_MALFORMED, ERR_NEWS_SEARCH,
    ERR_TASK_NOT_FOUND, ERR_TOKEN_REQUIRED, ERR_USER_NOT_FOUND, ERR_USERNAME_TAKEN,
};
use crate::news::NewsError;
use crate::security::TokenError;
use crate::storage::StorageError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("News provider error: {0}")]
    News(#[from] NewsError),

    #[error("News search error: {0}")]
    NewsSearch(NewsError),

    #[error("Task not found")]
    TaskNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token required")]
    TokenRequired,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Access denied")]
    AccessDenied,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Endpoint not found")]
    EndpointNotFound,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ERR_INTERNAL)
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ERR_INTERNAL)
            }
            AppError::News(NewsError::Malformed(_)) => (StatusCode::BAD_GATEWAY, ERR_NEWS_MALFORMED),
            AppError::News(_) => (StatusCode::INTERNAL_SERVER_ERROR, ERR_NEWS_FETCH_INTERNAL),
            AppError::NewsSearch(_) => (StatusCode::INTERNAL_SERVER_ERROR, ERR_NEWS_SEARCH),
            AppError::TaskNotFound => (StatusCode::NOT_FOUND, ERR_TASK_NOT_FOUND),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, ERR_USER_NOT_FOUND),
            AppError::UsernameTaken => (StatusCode::CONFLICT, ERR_USERNAME_TAKEN),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, ERR_INVALID_CREDENTIALS),
            AppError::TokenRequired => (StatusCode::UNAUTHORIZED, ERR_TOKEN_REQUIRED),
            AppError::InvalidToken(ref e) => {
                tracing::warn!("Rejected token: {}", e);
                (StatusCode::FORBIDDEN, ERR_INVALID_TOKEN)
            }
            AppError::AccessDenied => (StatusCode::FORBIDDEN, ERR_ACCESS_DENIED),
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::EndpointNotFound => (StatusCode::NOT_FOUND, ERR_ENDPOINT_NOT_FOUND),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
