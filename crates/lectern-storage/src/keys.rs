//! Storage key checks shared by all backends.

use crate::{StorageError, StorageResult};

/// Reject keys that could escape the bucket namespace or confuse path-style URLs.
pub fn validate_storage_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("empty key".to_string()));
    }
    if storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must not start with '/': {}",
            storage_key
        )));
    }
    if storage_key.split('/').any(|seg| seg == "." || seg == "..") {
        return Err(StorageError::InvalidKey(format!(
            "key must not contain relative segments: {}",
            storage_key
        )));
    }
    if storage_key.chars().any(char::is_control) {
        return Err(StorageError::InvalidKey(
            "key must not contain control characters".to_string(),
        ));
    }
    Ok(())
}
