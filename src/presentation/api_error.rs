// Error responses for HTTP handlers
use crate::domain::preferences::PreferenceParseError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidPreference(#[from] PreferenceParseError),
    #[error("response could not be built")]
    Internal(StatusCode),
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        ApiError::Internal(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidPreference(e) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
            }
            ApiError::Internal(status) => status.into_response(),
        }
    }
}
