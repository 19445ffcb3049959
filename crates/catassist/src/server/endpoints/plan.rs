use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::db::DbError;
use crate::server::util::{db_error_response, not_found, require_identifier};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub email: Option<String>,
    #[serde(rename = "targetCredits")]
    pub target_credits: Option<i32>,
}

/// GET /data/plan
///
/// Builds a conflict-free next-semester plan.
///
/// Query parameters:
/// - `email`: student identifier
/// - `targetCredits` (optional): credit target, defaults to the configured one
pub async fn get_plan(State(s): State<Arc<AppState>>, Query(q): Query<PlanQuery>) -> Response {
    let identifier = match require_identifier(q.email.as_deref()) {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    let target = q
        .target_credits
        .unwrap_or(s.config.default_target_credits);
    info!("GET /data/plan (targetCredits={})", target);

    plan(&s, identifier, target).unwrap_or_else(|e| db_error_response("Failed to build plan", e))
}

fn plan(s: &AppState, identifier: &str, target: i32) -> Result<Response, DbError> {
    let Some(user) = s.db.resolve_student(identifier)? else {
        warn!("Plan requested for unknown student");
        return Ok(not_found("not found"));
    };
    let Some(program) = s.db.program_for(user.id)? else {
        warn!(student_id = user.id, "Plan requested without curriculum");
        return Ok(not_found("no curriculum"));
    };

    let start = Instant::now();
    let inputs = s.db.load_planning_inputs(user.id, program.curriculum_id)?;
    let plan = s.planner.build(
        target,
        &inputs.catalog,
        &inputs.completed,
        &inputs.sections_by_course,
    );

    info!(
        student_id = user.id,
        sections = plan.len(),
        credits = plan.credits,
        duration_ms = start.elapsed().as_millis() as u64,
        "Built plan"
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "curriculum": program.curriculum,
            "targetCredits": target,
            "plannedCredits": plan.credits,
            "sections": plan.sections,
        })),
    )
        .into_response())
}
