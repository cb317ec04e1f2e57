//! Application state shared by the course handlers.

use lectern_core::Config;
use lectern_services::{CourseService, PresignCoordinator, Storage};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub presign: PresignCoordinator,
    pub courses: CourseService,
}
