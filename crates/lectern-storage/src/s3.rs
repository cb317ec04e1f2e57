use crate::keys::validate_storage_key;
use crate::traits::{path_style_url, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use lectern_core::StorageConfig;
use std::time::Duration;

const CREDENTIALS_PROVIDER_NAME: &str = "lectern-static";

/// S3-compatible storage (Cloudflare R2, MinIO, AWS S3)
///
/// Credentials come only from the validated `StorageConfig`; nothing is read from the
/// ambient AWS environment.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    endpoint_url: String,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        // Path-style addressing: {endpoint}/{bucket}/{key}, required by R2 and MinIO
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region().to_string()))
            .endpoint_url(config.endpoint_base())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(S3Storage {
            client: Client::from_conf(s3_config),
            bucket: config.bucket_name.clone(),
            endpoint_url: config.endpoint_base().to_string(),
        })
    }

    fn presigning_config(expires_in: Duration) -> StorageResult<PresigningConfig> {
        PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::SigningFailed(e.to_string()))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn presigned_put_url(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_storage_key(storage_key)?;
        let presigning_config = Self::presigning_config(expires_in)?;

        let presigned_request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .content_type(content_type)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 PUT presign failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            expires_in_secs = expires_in.as_secs(),
            "S3 PUT presigned"
        );

        Ok(presigned_request.uri().to_string())
    }

    async fn presigned_delete_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_storage_key(storage_key)?;
        let presigning_config = Self::presigning_config(expires_in)?;

        let presigned_request = self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 DELETE presign failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        Ok(presigned_request.uri().to_string())
    }

    fn public_url(&self, storage_key: &str) -> String {
        path_style_url(&self.endpoint_url, &self.bucket, storage_key)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadObjectError::NotFound(_) => Ok(false),
                    _ => Err(StorageError::BackendError(e.to_string())),
                },
                _ => Err(StorageError::BackendError(e.to_string())),
            },
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
