//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! [`SchedulingEngine`](crate::services::SchedulingEngine).

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::dto::{
    CourseWorkloadQuery, DeleteQuery, HealthResponse, ListAssignmentsQuery,
    ResolveConflictRequest, TermQuery, UpdateQuery, ValidateRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::ApiResponse;
use crate::models::{
    Assignment, AssignmentFilter, AssignmentId, AssignmentPatch, ConflictLogEntry, ConflictLogId,
    CourseLinkId, DeleteOutcome, InstructorId, InstructorWorkload, ReplicationResult,
    ValidationResult, WorkloadReport, WriteOutcome,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<ApiResponse<T>>, AppError>;

fn ok<T>(data: T) -> HandlerResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

/// A rejection becomes a 409 carrying the first conflict.
fn committed<T>(outcome: WriteOutcome<T>) -> Result<T, AppError> {
    match outcome {
        WriteOutcome::Committed { data } => Ok(data),
        WriteOutcome::Rejected { conflict } => Err(AppError::Conflict(conflict)),
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.engine.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    ok(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    })
}

// =============================================================================
// Assignments
// =============================================================================

/// POST /v1/assignments
///
/// Validate and commit one assignment. 201 on success, 409 on a conflict.
pub async fn create_assignment(
    State(state): State<AppState>,
    body: Result<Json<Assignment>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Assignment>>), AppError> {
    let Json(candidate) = body?;
    let stored = committed(state.engine.create(candidate).await?)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(stored))))
}

/// GET /v1/assignments?term=..
pub async fn list_assignments(
    State(state): State<AppState>,
    query: Result<Query<ListAssignmentsQuery>, QueryRejection>,
) -> HandlerResult<Vec<Assignment>> {
    let Query(query) = query?;
    let filter = AssignmentFilter::try_from(query).map_err(AppError::BadRequest)?;
    ok(state.engine.list_assignments(&filter).await?)
}

/// PATCH /v1/assignments/{id}?apply_to_series=bool
///
/// Returns every row the patch was written to.
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    query: Result<Query<UpdateQuery>, QueryRejection>,
    body: Result<Json<AssignmentPatch>, JsonRejection>,
) -> HandlerResult<Vec<Assignment>> {
    let Query(query) = query?;
    let Json(patch) = body?;
    let outcome = state
        .engine
        .update(AssignmentId(id), &patch, query.apply_to_series)
        .await?;
    ok(committed(outcome)?)
}

/// DELETE /v1/assignments/{id}?delete_series=bool
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> HandlerResult<DeleteOutcome> {
    let Query(query) = query?;
    ok(state
        .engine
        .delete(AssignmentId(id), query.delete_series)
        .await?)
}

/// POST /v1/assignments/validate
///
/// Dry run: conflicts come back as data with a 200.
pub async fn validate_assignment(
    State(state): State<AppState>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> HandlerResult<ValidationResult> {
    let Json(request) = body?;
    ok(state
        .engine
        .validate(&request.assignment, request.excluding)
        .await?)
}

/// POST /v1/assignments/replicate
///
/// Partial failures are reported per target inside a 200.
pub async fn replicate_assignment(
    State(state): State<AppState>,
    body: Result<Json<Assignment>, JsonRejection>,
) -> HandlerResult<ReplicationResult> {
    let Json(base) = body?;
    ok(state.engine.replicate(&base).await?)
}

// =============================================================================
// Workload
// =============================================================================

/// GET /v1/workload/course?course_link_id=..&parallel=..&term=..
pub async fn course_workload(
    State(state): State<AppState>,
    query: Result<Query<CourseWorkloadQuery>, QueryRejection>,
) -> HandlerResult<WorkloadReport> {
    let Query(q) = query?;
    ok(state
        .engine
        .validate_workload(CourseLinkId(q.course_link_id), q.parallel, &q.term)
        .await?)
}

/// GET /v1/workload/instructors/{id}?term=..
pub async fn instructor_workload(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    query: Result<Query<TermQuery>, QueryRejection>,
) -> HandlerResult<InstructorWorkload> {
    let Query(q) = query?;
    ok(state
        .engine
        .instructor_workload(InstructorId(id), &q.term)
        .await?)
}

// =============================================================================
// Conflict log
// =============================================================================

/// GET /v1/conflicts/pending
pub async fn list_pending_conflicts(
    State(state): State<AppState>,
) -> HandlerResult<Vec<ConflictLogEntry>> {
    ok(state.engine.list_pending_conflicts().await?)
}

/// POST /v1/conflicts/{id}/resolve
pub async fn resolve_conflict(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<ResolveConflictRequest>, JsonRejection>,
) -> HandlerResult<ConflictLogEntry> {
    let Json(request) = body?;
    ok(state
        .engine
        .resolve_conflict(ConflictLogId(id), &request.resolution)
        .await?)
}
