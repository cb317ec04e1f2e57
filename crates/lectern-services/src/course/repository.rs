use async_trait::async_trait;
use lectern_core::models::Course;
use lectern_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Durable store for committed courses.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn insert(&self, course: Course) -> Result<Course, AppError>;

    /// All courses, newest first.
    async fn list(&self) -> Result<Vec<Course>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Course>, AppError>;
}

#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: RwLock<Vec<Course>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn insert(&self, course: Course) -> Result<Course, AppError> {
        let mut courses = self.courses.write().await;
        if courses.iter().any(|c| c.id == course.id) {
            return Err(AppError::Persistence(format!(
                "course {} already exists",
                course.id
            )));
        }
        courses.push(course.clone());
        Ok(course)
    }

    async fn list(&self) -> Result<Vec<Course>, AppError> {
        let mut courses = self.courses.read().await.clone();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Course>, AppError> {
        Ok(self
            .courses
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }
}
