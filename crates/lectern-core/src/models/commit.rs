use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::object_key::ObjectKey;

/// Request body for `POST /api/courses`: the final course tree, referencing objects
/// that were already uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    #[validate(length(min = 1, message = "Course title is required"))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub disciplines: Vec<CommitDiscipline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommitDiscipline {
    #[validate(length(min = 1, message = "Discipline title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(nested)]
    pub lessons: Vec<CommitLesson>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommitLesson {
    #[validate(length(min = 1, message = "Lesson title is required"))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Key of an object uploaded in this attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub video_key: Option<ObjectKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Storage identifier of a video uploaded by an earlier attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_blob_id: Option<String>,
}

impl CommitPayload {
    /// Every object key the payload references, in tree order.
    pub fn video_keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.disciplines
            .iter()
            .flat_map(|d| d.lessons.iter())
            .filter_map(|l| l.video_key.as_ref())
    }
}
