//! Presign coordinator
//!
//! Mints one object key and one time-limited write credential per upload slot. A
//! batch is all-or-nothing: invalid settings fail before any backend exists, and one
//! signing failure discards every credential already minted for the batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lectern_core::constants::PRESIGN_TTL_SECS;
use lectern_core::models::{
    KeyScheme, ObjectKey, PresignRequest, PresignedBatch, PresignedCredential, SlotId,
};
use lectern_core::{AppError, ConfigError, Manifest, StorageConfig};
use lectern_storage::{Storage, StorageError, StorageResult};

#[derive(Debug, thiserror::Error)]
pub enum PresignError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("failed to presign {slot}: {message}")]
    Signing { slot: SlotId, message: String },
}

impl From<PresignError> for AppError {
    fn from(err: PresignError) -> Self {
        match err {
            PresignError::Configuration(e) => AppError::from(e),
            e @ PresignError::Signing { .. } => AppError::Presign(e.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct PresignCoordinator {
    storage: Arc<dyn Storage>,
    key_scheme: KeyScheme,
    ttl: Duration,
}

impl PresignCoordinator {
    pub fn new(storage: Arc<dyn Storage>, key_scheme: KeyScheme) -> Self {
        Self {
            storage,
            key_scheme,
            ttl: Duration::from_secs(PRESIGN_TTL_SECS),
        }
    }

    /// Validate raw `CLOUDFLARE_R2_*` settings, then build the backend with `factory`.
    ///
    /// `factory` is only called once the settings are valid.
    pub fn from_settings<I, F>(
        vars: I,
        key_scheme: KeyScheme,
        factory: F,
    ) -> Result<Self, PresignError>
    where
        I: IntoIterator<Item = (String, String)>,
        F: FnOnce(&StorageConfig) -> StorageResult<Arc<dyn Storage>>,
    {
        let config = StorageConfig::from_vars(vars)?;
        let storage = factory(&config).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(Self::new(storage, key_scheme))
    }

    pub fn key_scheme(&self) -> KeyScheme {
        self.key_scheme
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Presign every lesson the request marks with `videoFilePresent`.
    pub async fn presign(&self, request: &PresignRequest) -> Result<PresignedBatch, PresignError> {
        self.presign_manifest(&Manifest::from_presign_request(request))
            .await
    }

    #[tracing::instrument(
        skip(self, manifest),
        fields(
            slots = manifest.len(),
            bucket = %self.storage.bucket(),
            key_scheme = %self.key_scheme
        )
    )]
    pub async fn presign_manifest(
        &self,
        manifest: &Manifest,
    ) -> Result<PresignedBatch, PresignError> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero());

        let mut batch = PresignedBatch::new();
        for slot in manifest {
            let key = ObjectKey::generate(
                self.key_scheme,
                issued_at,
                slot.id,
                &slot.original_file_name,
            );
            let signing_failed = |e: StorageError| {
                tracing::error!(
                    slot = %slot.id,
                    key = %key,
                    error = %e,
                    "Presign failed, discarding batch"
                );
                PresignError::Signing {
                    slot: slot.id,
                    message: e.to_string(),
                }
            };

            let presigned_url = self
                .storage
                .presigned_put_url(key.as_str(), &slot.declared_content_type, self.ttl)
                .await
                .map_err(signing_failed)?;
            let delete_url = self
                .storage
                .presigned_delete_url(key.as_str(), self.ttl)
                .await
                .map_err(signing_failed)?;
            let public_url = self.storage.public_url(key.as_str());

            tracing::debug!(slot = %slot.id, key = %key, "Slot presigned");

            batch.insert(
                slot.id,
                PresignedCredential {
                    key,
                    presigned_url,
                    public_url,
                    expires_at,
                    delete_url: Some(delete_url),
                },
            );
        }

        tracing::info!(
            credentials = batch.len(),
            expires_at = %expires_at,
            "Presign batch issued"
        );

        Ok(batch)
    }
}
