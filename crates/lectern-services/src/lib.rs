//! Lectern Services Layer
//!
//! Business services between the HTTP handlers and storage: the presign coordinator
//! that mints per-slot write credentials, and the course service that persists a
//! committed course tree. Keep coordination here; keep thin HTTP handling in
//! lectern-api.

pub mod course;
pub mod presign;

pub use course::{CourseRepository, CourseService, InMemoryCourseRepository};
pub use lectern_storage::{create_storage, Storage, StorageBackend, StorageError, StorageResult};
pub use presign::{PresignCoordinator, PresignError};
