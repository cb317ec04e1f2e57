use std::sync::Arc;

use chrono::Utc;
use lectern_core::models::{CommitPayload, Course, Discipline, Lesson};
use lectern_core::AppError;
use lectern_storage::Storage;
use uuid::Uuid;
use validator::Validate;

use super::CourseRepository;

/// Persists committed course trees.
///
/// A lesson's `videoKey` becomes its stored `videoBlobId`, and its `videoUrl` is
/// derived from the key when the payload leaves it out. Lessons without a key keep
/// whatever `videoUrl` / `videoBlobId` the payload carries.
#[derive(Clone)]
pub struct CourseService {
    repository: Arc<dyn CourseRepository>,
    storage: Arc<dyn Storage>,
    verify_uploaded_objects: bool,
}

impl CourseService {
    pub fn new(
        repository: Arc<dyn CourseRepository>,
        storage: Arc<dyn Storage>,
        verify_uploaded_objects: bool,
    ) -> Self {
        Self {
            repository,
            storage,
            verify_uploaded_objects,
        }
    }

    #[tracing::instrument(
        skip(self, payload),
        fields(title = %payload.title, disciplines = payload.disciplines.len())
    )]
    pub async fn create(&self, payload: CommitPayload) -> Result<Course, AppError> {
        payload.validate()?;

        if self.verify_uploaded_objects {
            self.ensure_objects_exist(&payload).await?;
        }

        let now = Utc::now();
        let course_id = Uuid::new_v4();
        let disciplines = payload
            .disciplines
            .into_iter()
            .map(|discipline| {
                let discipline_id = Uuid::new_v4();
                Discipline {
                    id: discipline_id,
                    course_id,
                    title: discipline.title,
                    lessons: discipline
                        .lessons
                        .into_iter()
                        .map(|lesson| {
                            let video_url = lesson.video_url.or_else(|| {
                                lesson
                                    .video_key
                                    .as_ref()
                                    .map(|key| self.storage.public_url(key.as_str()))
                            });
                            Lesson {
                                id: Uuid::new_v4(),
                                discipline_id,
                                title: lesson.title,
                                description: lesson.description,
                                video_url,
                                video_blob_id: lesson
                                    .video_key
                                    .map(String::from)
                                    .or(lesson.video_blob_id),
                                created_at: now,
                            }
                        })
                        .collect(),
                    created_at: now,
                }
            })
            .collect();

        let course = self
            .repository
            .insert(Course {
                id: course_id,
                title: payload.title,
                description: payload.description,
                disciplines,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    async fn ensure_objects_exist(&self, payload: &CommitPayload) -> Result<(), AppError> {
        for key in payload.video_keys() {
            let exists = self
                .storage
                .exists(key.as_str())
                .await
                .map_err(|e| AppError::Storage(format!("Failed to check {}: {}", key, e)))?;
            if !exists {
                tracing::warn!(key = %key, "Commit references an object that was never uploaded");
                return Err(AppError::BadRequest(format!(
                    "Uploaded video not found in storage: {}",
                    key
                )));
            }
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Course>, AppError> {
        self.repository.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Course, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
    }
}
