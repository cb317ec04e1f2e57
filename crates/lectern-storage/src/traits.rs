//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Signature expired at {0}")]
    SignatureExpired(String),

    #[error("Signature does not match request")]
    SignatureMismatch,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Backends hand out credentials rather than moving bytes themselves: a presigned PUT
/// for the upload and a presigned DELETE for cleanup, both scoped to one key.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a presigned PUT URL bound to `storage_key` and `content_type`.
    ///
    /// A PUT with a different `Content-Type`, or after `expires_in`, is rejected by the
    /// storage provider.
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Generate a presigned DELETE URL for `storage_key`.
    async fn presigned_delete_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Canonical, uncredentialed address of the object once it exists.
    fn public_url(&self, storage_key: &str) -> String;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// `{endpoint}/{bucket}/{urlencoded key}`
pub(crate) fn path_style_url(endpoint: &str, bucket: &str, storage_key: &str) -> String {
    format!(
        "{}/{}/{}",
        endpoint.trim_end_matches('/'),
        bucket,
        urlencoding::encode(storage_key)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_style_url_encodes_key() {
        assert_eq!(
            path_style_url("https://r2.example.com/", "videos", "17-0-1-aula 1.mp4"),
            "https://r2.example.com/videos/17-0-1-aula%201.mp4"
        );
    }
}
