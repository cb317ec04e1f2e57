//! Route configuration

use crate::auth::{auth_middleware, AuthState};
use crate::constants::{
    COURSES_PATH, COURSE_PATH, OPENAPI_PATH, PRESIGN_PATH, STORAGE_OBJECT_PATH,
};
use crate::handlers;
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use lectern_core::Config;
use lectern_storage::MemoryStorage;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
    memory_storage: Option<Arc<MemoryStorage>>,
) -> Result<Router> {
    let cors = setup_cors(config)?;
    let auth_state = setup_auth(config)?;

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/live", get(handlers::health::liveness_check))
        .route(PRESIGN_PATH, post(handlers::presign::presign_course_uploads))
        .route(COURSES_PATH, get(handlers::courses::list_courses))
        .route(COURSE_PATH, get(handlers::courses::get_course))
        // Committing a course requires the API token.
        .route(
            COURSES_PATH,
            post(handlers::courses::create_course)
                .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware)),
        )
        .with_state(state)
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        );

    if let Some(memory) = memory_storage {
        tracing::info!(
            route = STORAGE_OBJECT_PATH,
            "Serving signed object storage from the API"
        );
        app = app.merge(storage_routes(config, memory));
    }

    Ok(app.layer(cors).layer(TraceLayer::new_for_http()))
}

fn setup_auth(config: &Config) -> Result<Arc<AuthState>> {
    let token = config.server.api_token.as_deref().ok_or_else(|| {
        anyhow::anyhow!("API_TOKEN must be set to accept course commits")
    })?;
    Ok(Arc::new(AuthState::new(token)))
}

/// Signed PUT/GET/DELETE for the in-memory backend. Video bodies are capped at
/// `MAX_VIDEO_SIZE_MB` instead of the default body limit.
fn storage_routes(config: &Config, storage: Arc<MemoryStorage>) -> Router {
    Router::new()
        .route(
            STORAGE_OBJECT_PATH,
            put(handlers::storage::put_object)
                .get(handlers::storage::get_object)
                .delete(handlers::storage::delete_object),
        )
        .layer(DefaultBodyLimit::max(config.server.max_video_size_bytes))
        .with_state(storage)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.server.cors_origins.iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!(
                "CORS configured to allow all origins - not recommended for production"
            );
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .server
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS_ORIGINS entry: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
