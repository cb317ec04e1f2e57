//! API constants
//!
//! Route paths shared by the router, the OpenAPI document and the tests.

/// API base path prefix
pub const API_BASE: &str = "/api";

pub const COURSES_PATH: &str = "/api/courses";
pub const COURSE_PATH: &str = "/api/courses/{id}";
pub const PRESIGN_PATH: &str = "/api/courses/presign";
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Route served by the in-memory storage backend. Its endpoint setting must point at
/// `{public base}/storage`.
pub const STORAGE_OBJECT_PATH: &str = "/storage/{bucket}/{*key}";

/// Default tracing directives when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "lectern=debug,tower_http=debug";
