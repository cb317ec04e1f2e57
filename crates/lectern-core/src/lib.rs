//! Lectern Core Library
//!
//! This crate provides the domain models, the upload manifest builder, error types,
//! and configuration shared by every Lectern component.

pub mod config;
pub mod constants;
pub mod error;
pub mod manifest;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ConfigError, ServerConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use manifest::{build_manifest, Manifest};
pub use storage_types::StorageBackend;
