use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::error;

use crate::audit::{percent_complete, CurriculumProgress};
use crate::db::{DbError, DbProgress};
use crate::server::types::ApiErrorType;

/// Query carrying the student identifier (email, username or M-number).
#[derive(Debug, Deserialize)]
pub struct StudentQuery {
    pub email: Option<String>,
}

impl StudentQuery {
    /// Returns the trimmed identifier, or a 400 response when it is missing.
    pub fn identifier(&self) -> Result<&str, Response> {
        require_identifier(self.email.as_deref())
    }
}

pub fn require_identifier(email: Option<&str>) -> Result<&str, Response> {
    match email.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(
            ApiErrorType::from((StatusCode::BAD_REQUEST, "email is required", None))
                .into_response(),
        ),
    }
}

pub fn not_found(message: &str) -> Response {
    ApiErrorType::from((StatusCode::NOT_FOUND, message, None)).into_response()
}

/// Logs a database failure and converts it into a 500 response.
pub fn db_error_response(context: &str, e: DbError) -> Response {
    error!("{}: {}", context, e);
    ApiErrorType::from((
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(e.to_string()),
    ))
    .into_response()
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn curriculum_progress(progress: DbProgress) -> CurriculumProgress {
    CurriculumProgress {
        id: progress.curriculum_id,
        percent: percent_complete(progress.courses_completed, progress.total_courses),
        name: progress.name,
        description: progress.description,
        total_courses: progress.total_courses,
        courses_completed: progress.courses_completed,
        gpa: progress.gpa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_require_identifier() {
        assert_eq!(require_identifier(Some(" alice ")).ok(), Some("alice"));
        assert!(require_identifier(Some("  ")).is_err());
        assert!(require_identifier(None).is_err());
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }
}
