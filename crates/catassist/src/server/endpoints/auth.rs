//! Demo sign-in backed by the session store.
//!
//! Passwords are not checked; signing in only resolves the student and opens
//! a bearer-token session for them.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::server::types::ApiErrorType;
use crate::server::util::{bearer_token, db_error_response, not_found};
use crate::session::Identity;
use crate::types::AppState;

const DEMO_ALIASES: [(&str, &str); 10] = [
    ("alice", "alice@example.com"),
    ("bob", "bob@example.com"),
    ("charlie", "charlie@example.com"),
    ("diana", "diana@example.com"),
    ("eric", "eric@example.com"),
    ("m10000001", "alice@example.com"),
    ("m10000002", "bob@example.com"),
    ("m10000003", "charlie@example.com"),
    ("m10000004", "diana@example.com"),
    ("m10000005", "eric@example.com"),
];

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub identifier: String,
}

/// Lower-cases an identifier and maps demo usernames and M-numbers to their email.
pub fn normalize_identifier(identifier: &str) -> String {
    let raw = identifier.trim().to_lowercase();
    if raw.contains('@') {
        return raw;
    }

    DEMO_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, email)| email.to_string())
        .unwrap_or(raw)
}

fn unauthorized() -> Response {
    ApiErrorType::from((StatusCode::UNAUTHORIZED, "Not signed in", None)).into_response()
}

/// POST /auth/login
pub async fn post_login(
    State(s): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let identifier = normalize_identifier(&body.identifier);
    info!("POST /auth/login");

    if identifier.is_empty() {
        return ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "identifier is required",
            Some("Enter your email or demo username (alice/bob/charlie/diana/eric)".to_string()),
        ))
        .into_response();
    }

    let student = match s.db.resolve_student(&identifier) {
        Ok(Some(student)) => student,
        Ok(None) => {
            warn!("Login for unknown student");
            return not_found("not found");
        }
        Err(e) => return db_error_response("Failed to sign in", e),
    };

    let name = match s.db.profile_for(student.id) {
        Ok(profile) => profile
            .and_then(|p| p.full_name)
            .unwrap_or_else(|| student.username.clone()),
        Err(e) => return db_error_response("Failed to sign in", e),
    };

    let identity = Identity {
        email: student.email,
        name,
    };
    let token = s.sessions.open(identity.clone());
    info!(student_id = student.id, "Opened session");

    (
        StatusCode::OK,
        Json(json!({
            "token": token,
            "user": identity,
        })),
    )
        .into_response()
}

/// GET /auth/session
pub async fn get_session(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    info!("GET /auth/session");

    match bearer_token(&headers).and_then(|token| s.sessions.get(token)) {
        Some(identity) => (StatusCode::OK, Json(identity)).into_response(),
        None => unauthorized(),
    }
}

/// POST /auth/logout
pub async fn post_logout(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    info!("POST /auth/logout");

    match bearer_token(&headers) {
        Some(token) => {
            let closed = s.sessions.close(token);
            (StatusCode::OK, Json(json!({ "logged_out": closed }))).into_response()
        }
        None => unauthorized(),
    }
}

/// GET /auth/session_stats
pub async fn get_session_stats(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /auth/session_stats");

    s.sessions.cleanup_expired();
    (StatusCode::OK, Json(s.sessions.stats())).into_response()
}
