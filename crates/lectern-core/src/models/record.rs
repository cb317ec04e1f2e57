use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A persisted course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub disciplines: Vec<Discipline>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Discipline {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub lessons: Vec<Lesson>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub discipline_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    /// Object key of the lesson video
    pub video_blob_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response of `POST /api/courses`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCourseResponse {
    pub ok: bool,
    pub course: Course,
}

/// Response of `GET /api/courses/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    pub course: Course,
}

/// Response of `GET /api/courses`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseListResponse {
    pub courses: Vec<Course>,
}
