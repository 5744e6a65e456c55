use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    FromRequest, FromRequestParts,
};

use crate::constants::{ERR_INVALID_COMPLETED_FILTER, ERR_INVALID_TASK_ID};
use crate::error::AppError;

/// JSON body extractor whose rejections render as `{ "error": ... }` with 400
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string extractor whose rejections render as `{ "error": ... }` with 400
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Path parameter extractor whose rejections render as `{ "error": ... }`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Parse a task id path segment
pub fn parse_task_id(raw: &str) -> Result<u64, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput(ERR_INVALID_TASK_ID.to_string()))
}

/// Parse the optional `completed` filter, accepting only `true` or `false`
pub fn parse_completed_filter(raw: Option<&str>) -> Result<Option<bool>, AppError> {
    match raw {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(AppError::InvalidInput(
            ERR_INVALID_COMPLETED_FILTER.to_string(),
        )),
    }
}
