use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::object_key::ObjectKey;
use super::slot::SlotId;

/// Credentials for every slot of one presign batch, keyed by slot.
pub type PresignedBatch = BTreeMap<SlotId, PresignedCredential>;

/// Request body for `POST /api/courses/presign`: the course tree, with each lesson
/// announcing whether it will upload a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub disciplines: Vec<PresignDiscipline>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignDiscipline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub lessons: Vec<PresignLesson>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignLesson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whether the client will upload a file for this lesson
    #[serde(default)]
    pub video_file_present: bool,
    /// Original file name; `file-{d}-{l}` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_file_name: Option<String>,
    /// Declared MIME type; `application/octet-stream` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_content_type: Option<String>,
}

/// Write credential for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignedCredential {
    /// Object key the credential is scoped to
    #[schema(value_type = String)]
    pub key: ObjectKey,
    /// Presigned PUT URL, bound to the key and the declared content type
    pub presigned_url: String,
    /// Canonical retrieval address once the object exists
    pub public_url: String,
    /// Issuance time plus 15 minutes
    pub expires_at: DateTime<Utc>,
    /// Presigned DELETE URL for the same key, used to clean up after a failed batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_url: Option<String>,
}

/// Successful response of `POST /api/courses/presign`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PresignResponse {
    pub ok: bool,
    /// Map of `file-{d}-{l}` to credential; lessons without a file are absent
    #[schema(value_type = Object)]
    pub presigned: PresignedBatch,
}

impl PresignResponse {
    pub fn new(presigned: PresignedBatch) -> Self {
        Self {
            ok: true,
            presigned,
        }
    }
}
