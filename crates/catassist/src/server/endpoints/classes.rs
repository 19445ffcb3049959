use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::db::DbError;
use crate::server::util::{db_error_response, StudentQuery};
use crate::types::AppState;

/// GET /data/classes
///
/// Every section offered for the student's curriculum, full ones included.
pub async fn get_classes(
    State(s): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> Response {
    let identifier = match q.identifier() {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("GET /data/classes");

    classes(&s, identifier).unwrap_or_else(|e| db_error_response("Failed to list classes", e))
}

fn classes(s: &AppState, identifier: &str) -> Result<Response, DbError> {
    let Some(user) = s.db.resolve_student(identifier)? else {
        return Ok(Json(json!({ "sections": [] })).into_response());
    };
    let Some(program) = s.db.program_for(user.id)? else {
        return Ok(Json(json!({ "sections": [] })).into_response());
    };

    let sections = s.db.class_listing(program.curriculum_id)?;

    Ok(Json(json!({
        "curriculum": program.curriculum,
        "sections": sections,
    }))
    .into_response())
}
