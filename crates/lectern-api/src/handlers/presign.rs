use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use lectern_core::models::{PresignRequest, PresignResponse};
use std::sync::Arc;

/// Mint write credentials for every lesson that announces a video file
#[utoipa::path(
    post,
    path = "/api/courses/presign",
    tag = "courses",
    request_body = PresignRequest,
    responses(
        (status = 200, description = "One credential per announced video", body = PresignResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Storage misconfigured or signing failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(disciplines = request.disciplines.len(), operation = "presign_course_uploads")
)]
pub async fn presign_course_uploads(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<PresignRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let batch = state.presign.presign(&request).await?;
    Ok(Json(PresignResponse::new(batch)))
}
