//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use lectern_core::models;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lectern API",
        version = "0.1.0",
        description = "Course authoring API. Clients presign one write URL per lesson video, upload directly to object storage, then commit the course tree referencing the uploaded keys."
    ),
    paths(
        handlers::presign::presign_course_uploads,
        handlers::courses::create_course,
        handlers::courses::list_courses,
        handlers::courses::get_course,
    ),
    components(
        schemas(
            models::PresignRequest,
            models::PresignDiscipline,
            models::PresignLesson,
            models::PresignedCredential,
            models::PresignResponse,
            models::CommitPayload,
            models::CommitDiscipline,
            models::CommitLesson,
            models::Course,
            models::Discipline,
            models::Lesson,
            models::CreateCourseResponse,
            models::CourseResponse,
            models::CourseListResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "courses", description = "Video presigning and course persistence")
    )
)]
pub struct ApiDoc;
