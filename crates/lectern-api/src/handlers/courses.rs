use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use lectern_core::models::{
    CommitPayload, CourseListResponse, CourseResponse, CreateCourseResponse,
};
use std::sync::Arc;
use uuid::Uuid;

/// Persist a course tree whose videos are already in storage
#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "courses",
    request_body = CommitPayload,
    responses(
        (status = 201, description = "Course created", body = CreateCourseResponse),
        (status = 400, description = "Invalid payload or video missing from storage", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, payload), fields(operation = "create_course"))]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CommitPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let course = state.courses.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateCourseResponse { ok: true, course }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "courses",
    responses(
        (status = 200, description = "Courses, newest first", body = CourseListResponse)
    )
)]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let courses = state.courses.list().await?;
    Ok(Json(CourseListResponse { courses }))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "courses",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let course = state.courses.get(id).await?;
    Ok(Json(CourseResponse { course }))
}
