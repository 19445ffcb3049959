use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::server::endpoints::{audit, auth, chat, classes, plan, status, student};
use crate::types::AppState;

mod endpoints;
mod types;
mod util;

pub use types::ApiErrorType;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let auth_router = Router::new()
        .route("/login", post(auth::post_login))
        .route("/session", get(auth::get_session))
        .route("/logout", post(auth::post_logout))
        .route("/session_stats", get(auth::get_session_stats));

    // Student-specific data, keyed by the `email` query parameter
    let data_router = Router::new()
        .route("/overview", get(student::get_overview))
        .route("/profile", get(student::get_profile))
        .route("/curriculum", get(student::get_curriculum))
        .route("/schedule", get(student::get_schedule))
        .route("/scenario", get(student::get_scenario))
        .route("/audit", get(audit::get_audit))
        .route("/classes", get(classes::get_classes))
        .route("/plan", get(plan::get_plan))
        .route("/chat", post(chat::post_rule_chat));

    Router::new()
        .route("/health", get(status::get_health))
        .nest("/auth", auth_router)
        .nest("/data", data_router)
        .route("/chat", post(chat::post_assistant_chat))
        .route("/chat/status", get(chat::get_assistant_status))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::AdvisorDb;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use tower::ServiceExt;

    fn test_app() -> Router {
        test_app_with(AppConfig::default())
    }

    fn test_app_with(config: AppConfig) -> Router {
        let db = AdvisorDb::open_in_memory().unwrap();
        db.seed_demo_data().unwrap();
        let state = AppState::new(config, db).unwrap();
        create_router(Arc::new(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();

        let (status, body) = get_json(&app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_email_is_rejected() {
        let app = test_app();

        for uri in ["/data/overview", "/data/plan", "/data/classes?email="] {
            let (status, body) = get_json(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body, json!({ "error": "email is required" }));
        }
    }

    #[tokio::test]
    async fn test_overview() {
        let app = test_app();

        let (status, body) = get_json(&app, "/data/overview?email=alice%40example.com").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "Alice Johnson");
        assert_eq!(body["curriculum"], "Information Technology (BSIT)");
        assert_eq!(body["total"], 40);
        assert_eq!(body["profile"]["advisor"], "Dr. Nguyen");

        let completed = body["completed"].as_u64().unwrap() as u32;
        let expected = crate::audit::percent_complete(completed, 40);
        assert_eq!(body["percent"].as_u64().unwrap() as u32, expected);

        let (status, _) = get_json(&app, "/data/overview?email=nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_plan_endpoint() {
        let app = test_app();

        let (status, body) = get_json(&app, "/data/plan?email=bob&targetCredits=9").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targetCredits"], 9);

        let sections = body["sections"].as_array().unwrap();
        assert!(!sections.is_empty());

        let planned: u64 = sections.iter().map(|s| s["credits"].as_u64().unwrap()).sum();
        assert_eq!(body["plannedCredits"].as_u64().unwrap(), planned);

        let mut slots = HashSet::new();
        let mut courses = HashSet::new();
        for section in sections {
            assert!(section["seats_left"].as_i64().unwrap() > 0);
            assert!(slots.insert((
                section["day"].as_str().unwrap().to_string(),
                section["time"].as_str().unwrap().to_string()
            )));
            assert!(courses.insert(section["course_id"].as_i64().unwrap()));
        }

        let (status, body) = get_json(&app, "/data/plan?email=M10000002").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targetCredits"], 15);

        let (status, _) = get_json(&app, "/data/plan?email=nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_audit_and_classes() {
        let app = test_app();

        let (status, body) = get_json(&app, "/data/audit?email=charlie").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["curriculum"], "Accounting (BBA)");
        let taken_credits: u64 = body["taken"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["credits"].as_u64().unwrap())
            .sum();
        assert_eq!(body["credits_taken"].as_u64().unwrap(), taken_credits);

        let (status, body) = get_json(&app, "/data/classes?email=charlie").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["sections"].as_array().unwrap().len() >= 20);

        let (status, body) = get_json(&app, "/data/classes?email=nobody").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "sections": [] }));
    }

    #[tokio::test]
    async fn test_student_records() {
        let app = test_app();

        let (_, body) = get_json(&app, "/data/schedule?email=eric").await;
        assert_eq!(body["events"].as_array().unwrap().len(), 5);

        let (_, body) = get_json(&app, "/data/scenario?email=eric").await;
        assert!(body["scenario"].as_str().unwrap().starts_with("Design a heatsink"));

        let (_, body) = get_json(&app, "/data/curriculum?email=eric").await;
        assert_eq!(body["curriculum"]["name"], "Mechanical Engineering (BSE)");
        assert_eq!(body["courses"].as_array().unwrap().len(), 10);

        let (_, body) = get_json(&app, "/data/profile?email=nobody").await;
        assert_eq!(body, json!({ "user": null, "profile": null, "curriculum": null }));
    }

    #[tokio::test]
    async fn test_session_flow() {
        let app = test_app();

        let (status, body) = post_json(&app, "/auth/login", json!({ "identifier": "Diana" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "diana@example.com");
        assert_eq!(body["user"]["name"], "Diana Shah");
        let token = body["token"].as_str().unwrap().to_string();

        let session = || {
            Request::get("/auth/session")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let (status, body) = send(&app, session()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "diana@example.com");

        let logout = Request::post("/auth/logout")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, logout).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logged_out"], true);

        let (status, _) = send(&app, session()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post_json(&app, "/auth/login", json!({ "identifier": "zoe" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rule_chat() {
        let app = test_app();

        let (status, body) = post_json(
            &app,
            "/data/chat",
            json!({ "email": "alice@example.com", "message": "What is my curriculum?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["reply"]
            .as_str()
            .unwrap()
            .starts_with("Program: Information Technology (BSIT)"));

        let (status, _) = post_json(&app, "/data/chat", json!({ "message": "hi" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rule_chat_plans_full_time_load() {
        let app = test_app_with(AppConfig {
            default_target_credits: 9,
            ..AppConfig::default()
        });

        let (_, body) = post_json(
            &app,
            "/data/chat",
            json!({ "email": "bob", "message": "How many credits do I need for next semester?" }),
        )
        .await;
        assert!(body["reply"]
            .as_str()
            .unwrap()
            .starts_with("A typical full-time load is ~15 credits."));

        let (_, body) = get_json(&app, "/data/plan?email=bob").await;
        assert_eq!(body["targetCredits"], 9);
    }

    #[tokio::test]
    async fn test_assistant_chat_validation() {
        let app = test_app();

        let (status, body) = post_json(&app, "/chat", json!({ "messages": "hello" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");

        // No API key in the default config
        let (status, body) = post_json(
            &app,
            "/chat",
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Assistant temporarily unavailable");
        assert_eq!(body["details"], "Assistant is not configured");

        let (status, body) = get_json(&app, "/chat/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["configured"], false);
        assert_eq!(body["breaker"]["open"], false);
        assert_eq!(body["breaker"]["trips"], 0);
    }
}
