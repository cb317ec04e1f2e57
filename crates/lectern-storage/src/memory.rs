//! In-process storage backend
//!
//! Holds objects in memory and signs its own URLs with HMAC-SHA256 over the method,
//! key, content type and expiry, keyed by the configured secret. The URLs point at the
//! API's `/storage/{bucket}/{*key}` route, which hands the request back to
//! `accept_put` / `accept_delete` for verification. Used for local development and as
//! the expiry-enforcing stand-in for a real provider in tests.

use crate::keys::validate_storage_key;
use crate::traits::{path_style_url, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use lectern_core::StorageConfig;
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

type HmacSha256 = Hmac<Sha256>;

/// Query parameters carried by every signed URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignedParams {
    /// Expiry, seconds since the epoch
    pub expires: i64,
    /// Hex HMAC-SHA256
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Bytes,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
enum SignedMethod {
    Put,
    Delete,
}

impl SignedMethod {
    fn as_str(self) -> &'static str {
        match self {
            SignedMethod::Put => "PUT",
            SignedMethod::Delete => "DELETE",
        }
    }
}

pub struct MemoryStorage {
    endpoint: String,
    bucket: String,
    secret: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    signatures_issued: AtomicUsize,
}

impl MemoryStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            endpoint: config.endpoint_base().to_string(),
            bucket: config.bucket_name.clone(),
            secret: config.secret_access_key.clone(),
            objects: RwLock::new(HashMap::new()),
            signatures_issued: AtomicUsize::new(0),
        }
    }

    /// Number of URLs signed so far.
    pub fn signatures_issued(&self) -> usize {
        self.signatures_issued.load(Ordering::SeqCst)
    }

    fn mac(
        &self,
        method: SignedMethod,
        storage_key: &str,
        content_type: &str,
        expires: i64,
    ) -> StorageResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(method.as_str().as_bytes());
        mac.update(b"\n");
        mac.update(storage_key.as_bytes());
        mac.update(b"\n");
        mac.update(content_type.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    fn sign(
        &self,
        method: SignedMethod,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_storage_key(storage_key)?;
        let ttl = chrono::Duration::from_std(expires_in)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        let expires = (Utc::now() + ttl).timestamp();
        let signature = hex::encode(
            self.mac(method, storage_key, content_type, expires)?
                .finalize()
                .into_bytes(),
        );
        self.signatures_issued.fetch_add(1, Ordering::SeqCst);

        Ok(format!(
            "{}?expires={}&signature={}",
            self.public_url(storage_key),
            expires,
            signature
        ))
    }

    fn verify(
        &self,
        method: SignedMethod,
        bucket: &str,
        storage_key: &str,
        content_type: &str,
        params: &SignedParams,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        if bucket != self.bucket {
            return Err(StorageError::NotFound(format!("bucket {}", bucket)));
        }
        validate_storage_key(storage_key)?;

        let provided =
            hex::decode(&params.signature).map_err(|_| StorageError::SignatureMismatch)?;
        self.mac(method, storage_key, content_type, params.expires)?
            .verify_slice(&provided)
            .map_err(|_| StorageError::SignatureMismatch)?;

        if now.timestamp() > params.expires {
            let expired_at = DateTime::<Utc>::from_timestamp(params.expires, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| params.expires.to_string());
            return Err(StorageError::SignatureExpired(expired_at));
        }
        Ok(())
    }

    /// Store an object received on a presigned PUT URL.
    pub async fn accept_put(
        &self,
        bucket: &str,
        storage_key: &str,
        params: &SignedParams,
        content_type: &str,
        data: Bytes,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.verify(
            SignedMethod::Put,
            bucket,
            storage_key,
            content_type,
            params,
            now,
        )?;

        let size = data.len();
        self.objects.write().await.insert(
            storage_key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
                uploaded_at: now,
            },
        );

        tracing::info!(
            bucket = %bucket,
            key = %storage_key,
            size_bytes = size,
            "Memory storage upload accepted"
        );
        Ok(())
    }

    /// Remove an object on a presigned DELETE URL. Returns whether it existed.
    pub async fn accept_delete(
        &self,
        bucket: &str,
        storage_key: &str,
        params: &SignedParams,
        now: DateTime<Utc>,
    ) -> StorageResult<bool> {
        self.verify(SignedMethod::Delete, bucket, storage_key, "", params, now)?;
        let existed = self.objects.write().await.remove(storage_key).is_some();

        tracing::info!(
            bucket = %bucket,
            key = %storage_key,
            existed = existed,
            "Memory storage delete accepted"
        );
        Ok(existed)
    }

    pub async fn get_object(&self, bucket: &str, storage_key: &str) -> Option<StoredObject> {
        if bucket != self.bucket {
            return None;
        }
        self.objects.read().await.get(storage_key).cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.sign(SignedMethod::Put, storage_key, content_type, expires_in)
    }

    async fn presigned_delete_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.sign(SignedMethod::Delete, storage_key, "", expires_in)
    }

    fn public_url(&self, storage_key: &str) -> String {
        path_style_url(&self.endpoint, &self.bucket, storage_key)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().await.contains_key(storage_key))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
