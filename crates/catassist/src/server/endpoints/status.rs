use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use tracing::info;

/// GET /health
pub async fn get_health() -> impl IntoResponse {
    info!("GET /health");

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "time": Utc::now().to_rfc3339(),
        })),
    )
}
