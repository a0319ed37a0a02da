use axum::Json;
use axum::extract::Path;
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::error::AppError;
use crate::models::*;
use crate::services::publishing;
use crate::services::{MigrationService, PollOutcome};
use crate::session::SessionTokens;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/tokens", put(set_tokens).delete(clear_tokens))
        .route("/courses", get(list_courses))
        .route("/courses/{course_id}/coursework", get(list_course_work))
        .route("/courses/{course_id}/materials", get(list_course_work_materials))
        .route("/classes", get(list_classes))
        .route("/classes/{class_id}/migrations", post(run_migration))
        .route(
            "/classes/{class_id}/assignments/{assignment_id}/publish",
            post(publish_assignment),
        )
        .route(
            "/classes/{class_id}/assignments/{assignment_id}/submissions",
            get(list_submissions),
        )
        .route(
            "/classes/{class_id}/assignments/{assignment_id}/submissions/{submission_id}/return",
            post(return_submission),
        )
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn set_tokens(
    State(state): State<AppState>,
    Json(tokens): Json<SessionTokens>,
) -> Result<StatusCode, AppError> {
    if tokens.source_token.is_none() && tokens.destination_token.is_none() {
        return Err(AppError::BadRequest("no token supplied".to_string()));
    }
    state.session.apply(tokens)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_tokens(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.session.clear()?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.classroom.list_courses().await?;
    Ok(Json(courses))
}

async fn list_course_work(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<CourseWork>>, AppError> {
    let items = state.classroom.list_course_work(&course_id).await?;
    Ok(Json(items))
}

async fn list_course_work_materials(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<CourseWorkMaterial>>, AppError> {
    let items = state.classroom.list_course_work_materials(&course_id).await?;
    Ok(Json(items))
}

async fn list_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<EducationClass>>, AppError> {
    let classes = state.graph.list_classes().await?;
    Ok(Json(classes))
}

async fn run_migration(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(req): Json<MigrationRequest>,
) -> Result<Json<MigrationReport>, AppError> {
    let service = MigrationService::new(
        state.classroom.clone(),
        state.graph.clone(),
        state.migration.clone(),
    );
    let report = service.run(&class_id, req).await?;
    Ok(Json(report))
}

async fn publish_assignment(
    State(state): State<AppState>,
    Path((class_id, assignment_id)): Path<(String, String)>,
) -> Result<Json<PollOutcome<AssignmentStatus>>, AppError> {
    let outcome = publishing::publish_assignment(
        state.graph.as_ref(),
        &class_id,
        &assignment_id,
        &state.migration.poll,
    )
    .await?;
    Ok(Json(outcome))
}

async fn list_submissions(
    State(state): State<AppState>,
    Path((class_id, assignment_id)): Path<(String, String)>,
) -> Result<Json<Vec<EducationSubmission>>, AppError> {
    let submissions = state
        .graph
        .list_submissions(&class_id, &assignment_id)
        .await?;
    Ok(Json(submissions))
}

async fn return_submission(
    State(state): State<AppState>,
    Path((class_id, assignment_id, submission_id)): Path<(String, String, String)>,
) -> Result<Json<PollOutcome<SubmissionStatus>>, AppError> {
    let outcome = publishing::return_submission(
        state.graph.as_ref(),
        &class_id,
        &assignment_id,
        &submission_id,
        &state.migration.poll,
    )
    .await?;
    Ok(Json(outcome))
}
