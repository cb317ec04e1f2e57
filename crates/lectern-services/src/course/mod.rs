mod repository;
mod service;

pub use repository::{CourseRepository, InMemoryCourseRepository};
pub use service::CourseService;
