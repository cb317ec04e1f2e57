//! Service and repository initialization

use crate::state::AppState;
use lectern_core::Config;
use lectern_services::{CourseService, InMemoryCourseRepository, PresignCoordinator, Storage};
use std::sync::Arc;

pub fn initialize_services(config: &Config, storage: Arc<dyn Storage>) -> Arc<AppState> {
    let presign = PresignCoordinator::new(storage.clone(), config.key_scheme());
    let courses = CourseService::new(
        Arc::new(InMemoryCourseRepository::new()),
        storage.clone(),
        config.server.verify_uploaded_objects,
    );

    tracing::info!(
        key_scheme = %config.key_scheme(),
        verify_uploaded_objects = config.server.verify_uploaded_objects,
        "Services initialized"
    );

    Arc::new(AppState {
        config: config.clone(),
        storage,
        presign,
        courses,
    })
}
