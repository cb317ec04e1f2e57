//! Domain methods for the Lectern API client.
//!
//! Request and response types come from `lectern_core::models`.

use crate::{ApiClient, ApiError};
use lectern_core::models::{
    CommitPayload, Course, CourseListResponse, CourseResponse, CreateCourseResponse,
    PresignRequest, PresignResponse,
};
use serde::Deserialize;
use uuid::Uuid;

pub const PRESIGN_PATH: &str = "/api/courses/presign";
pub const COURSES_PATH: &str = "/api/courses";

/// The `{ ok: false, error, code }` body the API returns on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Parse an error body; `None` when the server sent something else.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

impl ApiClient {
    /// Request one write credential per lesson that announces a video.
    pub async fn presign(&self, request: &PresignRequest) -> Result<PresignResponse, ApiError> {
        self.post_json(PRESIGN_PATH, request).await
    }

    /// Persist a course tree whose videos are already uploaded.
    pub async fn create_course(
        &self,
        payload: &CommitPayload,
    ) -> Result<CreateCourseResponse, ApiError> {
        self.post_json(COURSES_PATH, payload).await
    }

    pub async fn get_course(&self, id: Uuid) -> Result<Course, ApiError> {
        let response: CourseResponse = self.get(&format!("{}/{}", COURSES_PATH, id)).await?;
        Ok(response.course)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let response: CourseListResponse = self.get(COURSES_PATH).await?;
        Ok(response.courses)
    }
}
