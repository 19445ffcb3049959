use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::chat::{AssistantError, ChatMessage, ChatResponder};
use crate::server::types::ApiErrorType;
use crate::server::util::{db_error_response, require_identifier};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct RuleChatRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// POST /data/chat
///
/// Answers a fixed set of advising questions from the student's records.
pub async fn post_rule_chat(
    State(s): State<Arc<AppState>>,
    Json(body): Json<RuleChatRequest>,
) -> Response {
    let identifier = match require_identifier(body.email.as_deref()) {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("POST /data/chat");

    let responder = ChatResponder::new(&s.db, &s.planner, &s.intents);

    match responder.respond(identifier, &body.message) {
        Ok(reply) => (StatusCode::OK, Json(json!({ "reply": reply }))).into_response(),
        Err(e) => db_error_response("Failed to answer chat message", e),
    }
}

/// Converts AssistantError to API response.
fn assistant_error_to_response(error: AssistantError) -> Response {
    let (status, message) = if error.is_unavailable() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Assistant temporarily unavailable",
        )
    } else if matches!(error, AssistantError::InvalidRequest { .. }) {
        (StatusCode::BAD_REQUEST, "Invalid request")
    } else {
        (StatusCode::BAD_GATEWAY, "Assistant request failed")
    };

    ApiErrorType::from((status, message, Some(error.to_string()))).into_response()
}

/// GET /chat/status
///
/// Reports whether an API key is set and the state of the circuit breaker.
pub async fn get_assistant_status(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /chat/status");
    Json(s.assistant.status()).into_response()
}

/// POST /chat
///
/// Forwards a conversation (`{ "messages": [...] }`) to the LLM assistant.
pub async fn post_assistant_chat(
    State(s): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Response {
    info!("POST /chat");

    let messages = match body.get("messages") {
        Some(Value::Array(items)) => items.clone(),
        _ => {
            return ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid request", None))
                .into_response()
        }
    };

    let messages: Vec<ChatMessage> = match serde_json::from_value(Value::Array(messages)) {
        Ok(messages) => messages,
        Err(e) => {
            return ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                "Invalid request",
                Some(e.to_string()),
            ))
            .into_response()
        }
    };

    match s.assistant.reply(&messages).await {
        Ok(reply) => (StatusCode::OK, Json(json!({ "reply": reply }))).into_response(),
        Err(e) => {
            error!("Assistant chat failed: {}", e);
            assistant_error_to_response(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_error_status_codes() {
        let cases = [
            (
                AssistantError::CircuitBreakerOpen {
                    retry_after_secs: 12,
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AssistantError::NotConfigured, StatusCode::SERVICE_UNAVAILABLE),
            (
                AssistantError::InvalidRequest {
                    message: "conversation has no messages".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AssistantError::Network {
                    message: "connection reset".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(assistant_error_to_response(error).status(), expected);
        }
    }
}
