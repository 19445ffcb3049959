use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON error body returned by every endpoint: `{ "error": ..., "details": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, details): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
