//! API endpoints for a student's own records.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::audit::percent_complete;
use crate::db::DbError;
use crate::server::util::{curriculum_progress, db_error_response, not_found, StudentQuery};
use crate::types::AppState;

const EMPTY: &str = "—";

/// GET /data/overview
///
/// Dashboard summary: name, curriculum progress and a profile block.
/// Missing values render as "—".
pub async fn get_overview(
    State(s): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> Response {
    let identifier = match q.identifier() {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("GET /data/overview");

    overview(&s, identifier)
        .unwrap_or_else(|e| db_error_response("Failed to load overview", e))
}

fn overview(s: &AppState, identifier: &str) -> Result<Response, DbError> {
    let Some(user) = s.db.resolve_student(identifier)? else {
        warn!("Overview requested for unknown student");
        return Ok(not_found("not found"));
    };

    let progress = s.db.progress_for(user.id)?;
    let profile = s.db.profile_for(user.id)?.unwrap_or_default();

    let total = progress.as_ref().map(|p| p.total_courses).unwrap_or(0);
    let completed = progress.as_ref().map(|p| p.courses_completed).unwrap_or(0);
    let or_empty = |v: &Option<String>| v.clone().unwrap_or_else(|| EMPTY.to_string());

    Ok((
        StatusCode::OK,
        Json(json!({
            "username": profile.full_name.clone().unwrap_or(user.username),
            "email": user.email,
            "curriculum": progress.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            "total": total,
            "completed": completed,
            "percent": percent_complete(completed, total),
            "gpa": progress
                .as_ref()
                .and_then(|p| p.gpa)
                .map(|g| format!("{:.2}", g))
                .unwrap_or_else(|| EMPTY.to_string()),
            "description": progress
                .as_ref()
                .and_then(|p| p.description.clone())
                .unwrap_or_else(|| EMPTY.to_string()),
            "profile": {
                "phone": or_empty(&profile.phone),
                "year": or_empty(&profile.year),
                "advisor": or_empty(&profile.advisor),
                "hometown": or_empty(&profile.hometown),
                "bio": or_empty(&profile.bio),
            },
        })),
    )
        .into_response())
}

/// GET /data/profile
pub async fn get_profile(
    State(s): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> Response {
    let identifier = match q.identifier() {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("GET /data/profile");

    profile(&s, identifier).unwrap_or_else(|e| db_error_response("Failed to load profile", e))
}

fn profile(s: &AppState, identifier: &str) -> Result<Response, DbError> {
    let Some(user) = s.db.resolve_student(identifier)? else {
        return Ok(Json(json!({ "user": null, "profile": null, "curriculum": null })).into_response());
    };

    let profile = s.db.profile_for(user.id)?;
    let curriculum = s.db.progress_for(user.id)?.map(curriculum_progress);

    Ok(Json(json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
        },
        "profile": profile,
        "curriculum": curriculum,
    }))
    .into_response())
}

/// GET /data/curriculum
pub async fn get_curriculum(
    State(s): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> Response {
    let identifier = match q.identifier() {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("GET /data/curriculum");

    curriculum(&s, identifier)
        .unwrap_or_else(|e| db_error_response("Failed to load curriculum", e))
}

fn curriculum(s: &AppState, identifier: &str) -> Result<Response, DbError> {
    let Some(user) = s.db.resolve_student(identifier)? else {
        return Ok(Json(json!({ "curriculum": null, "courses": [] })).into_response());
    };

    let courses = s.db.student_courses(user.id)?;
    let curriculum = s.db.progress_for(user.id)?.map(curriculum_progress);

    Ok(Json(json!({
        "curriculum": curriculum,
        "courses": courses,
    }))
    .into_response())
}

/// GET /data/schedule
pub async fn get_schedule(
    State(s): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> Response {
    let identifier = match q.identifier() {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("GET /data/schedule");

    let events = s.db.resolve_student(identifier).and_then(|user| match user {
        Some(user) => s.db.events_for(user.id),
        None => Ok(Vec::new()),
    });

    match events {
        Ok(events) => Json(json!({ "events": events })).into_response(),
        Err(e) => db_error_response("Failed to load schedule", e),
    }
}

/// GET /data/scenario
pub async fn get_scenario(
    State(s): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> Response {
    let identifier = match q.identifier() {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("GET /data/scenario");

    let scenario = s.db.resolve_student(identifier).and_then(|user| match user {
        Some(user) => s.db.scenario_for(user.id),
        None => Ok(None),
    });

    match scenario {
        Ok(scenario) => Json(json!({ "scenario": scenario })).into_response(),
        Err(e) => db_error_response("Failed to load scenario", e),
    }
}
