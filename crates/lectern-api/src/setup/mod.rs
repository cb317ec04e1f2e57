//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use lectern_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = %config.server.environment,
        storage_backend = %config.storage_backend(),
        bucket = %config.storage.bucket_name,
        "Configuration loaded and validated successfully"
    );

    build_app(config)
}

/// Wire storage, services and routes without touching global telemetry.
pub fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let storage = storage::setup_storage(&config)?;
    let state = services::initialize_services(&config, storage.storage.clone());
    let router = routes::setup_routes(&config, state.clone(), storage.memory)?;

    Ok((state, router))
}
