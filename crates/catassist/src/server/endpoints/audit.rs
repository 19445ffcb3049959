use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::audit::DegreeAuditProcessor;
use crate::db::DbError;
use crate::server::util::{db_error_response, not_found, StudentQuery};
use crate::types::AppState;

/// GET /data/audit
///
/// Courses taken, required courses still missing and their credit totals.
pub async fn get_audit(
    State(s): State<Arc<AppState>>,
    Query(q): Query<StudentQuery>,
) -> Response {
    let identifier = match q.identifier() {
        Ok(identifier) => identifier,
        Err(response) => return response,
    };
    info!("GET /data/audit");

    audit(&s, identifier).unwrap_or_else(|e| db_error_response("Failed to run degree audit", e))
}

fn audit(s: &AppState, identifier: &str) -> Result<Response, DbError> {
    let Some(user) = s.db.resolve_student(identifier)? else {
        warn!("Audit requested for unknown student");
        return Ok(not_found("not found"));
    };
    let Some(program) = s.db.program_for(user.id)? else {
        warn!(student_id = user.id, "Audit requested without curriculum");
        return Ok(not_found("no curriculum"));
    };

    let catalog = s.db.catalog_for(program.curriculum_id)?;
    let transcript = s.db.transcript_for(user.id)?;
    let audit = DegreeAuditProcessor::audit(&program.curriculum, &catalog, &transcript);

    Ok((StatusCode::OK, Json(audit)).into_response())
}
