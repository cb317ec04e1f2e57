//! Upload & commit pipeline.
//!
//! One call to [`UploadOrchestrator::publish`] is one commit attempt:
//! `Draft → Presigning → Uploading → Committing → Committed`, or `Failed` from any
//! of the three working states. Every stage fails closed. Nothing is retried, and a
//! new attempt starts from scratch with fresh keys.
//!
//! Transfers run concurrently and are joined as a whole before the stage decides.
//! When any transfer fails the commit is never sent; under
//! [`OrphanPolicy::DeleteUploaded`] the objects that did land are deleted again
//! through their presigned delete URLs, best effort.

mod payload;
mod transfer;

pub use payload::build_commit_payload;
pub use transfer::TransferError;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use futures::future::join_all;
use lectern_core::models::{
    CommitPayload, Course, CourseDraft, LocalFile, ObjectKey, PresignRequest, PresignedBatch,
    SlotId,
};
use lectern_core::{build_manifest, Manifest};

use crate::api::ErrorBody;
use crate::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Draft,
    Presigning,
    Uploading,
    Committing,
    Committed,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Draft => "draft",
            PipelineState::Presigning => "presigning",
            PipelineState::Uploading => "uploading",
            PipelineState::Committing => "committing",
            PipelineState::Committed => "committed",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Per-slot transfer outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    Pending,
    Succeeded,
    Failed(TransferError),
}

/// What to do with objects that were uploaded by an attempt that then failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Delete them through their presigned delete URLs before reporting the failure.
    #[default]
    DeleteUploaded,
    /// Leave them in storage and report them as orphans.
    Retain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub slot: SlotId,
    pub key: ObjectKey,
    pub error: TransferError,
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error.status {
            Some(status) => write!(f, "{} ({}): {}", self.slot, status, self.error.message),
            None => write!(f, "{}: {}", self.slot, self.error.message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("storage is not configured: {message}")]
    Configuration { message: String },

    #[error("presign failed{}: {message}", status_suffix(.status))]
    Presign {
        status: Option<u16>,
        message: String,
    },

    #[error(
        "presigned slots do not match the draft (missing: {}, unexpected: {})",
        join(.missing),
        join(.unexpected)
    )]
    SlotMismatch {
        missing: Vec<SlotId>,
        unexpected: Vec<SlotId>,
    },

    #[error(
        "upload failed for {}; removed {} uploaded object(s), {} left orphaned",
        join(.failures),
        .removed.len(),
        .orphaned.len()
    )]
    Transfer {
        failures: Vec<TransferFailure>,
        /// Uploaded objects that were deleted again
        removed: Vec<ObjectKey>,
        /// Uploaded objects still in storage
        orphaned: Vec<ObjectKey>,
    },

    /// `message` is the server's response body, verbatim.
    #[error("commit failed{}: {message}", status_suffix(.status))]
    Commit {
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {}", s)).unwrap_or_default()
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A failed attempt: the stage it failed in, the error, and every state it went through.
#[derive(Debug, thiserror::Error)]
#[error("{failed_in} stage failed: {error}")]
pub struct PipelineFailure {
    pub failed_in: PipelineState,
    #[source]
    pub error: PipelineError,
    pub history: Vec<PipelineState>,
}

#[derive(Debug, Clone)]
pub struct PublishedCourse {
    pub course: Course,
    /// The body that was committed
    pub payload: CommitPayload,
    /// Per-slot transfer outcomes, all `Succeeded`
    pub outcomes: BTreeMap<SlotId, SlotOutcome>,
    pub history: Vec<PipelineState>,
}

/// Tracks one attempt through the state machine.
struct Attempt {
    history: Vec<PipelineState>,
}

impl Attempt {
    fn new() -> Self {
        Self {
            history: vec![PipelineState::Draft],
        }
    }

    fn current(&self) -> PipelineState {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineState::Draft)
    }

    fn enter(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.current(), to = %next, "Pipeline transition");
        self.history.push(next);
    }

    fn fail(mut self, error: PipelineError) -> PipelineFailure {
        let failed_in = self.current();
        tracing::error!(stage = %failed_in, error = %error, "Upload pipeline failed");
        self.enter(PipelineState::Failed);
        PipelineFailure {
            failed_in,
            error,
            history: self.history,
        }
    }
}

/// Drives one draft through presign, direct transfers and commit.
#[derive(Clone, Debug)]
pub struct UploadOrchestrator {
    api: ApiClient,
    orphan_policy: OrphanPolicy,
}

impl UploadOrchestrator {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            orphan_policy: OrphanPolicy::default(),
        }
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.orphan_policy
    }

    #[tracing::instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn publish(&self, draft: &CourseDraft) -> Result<PublishedCourse, PipelineFailure> {
        let mut attempt = Attempt::new();
        let manifest = build_manifest(draft);

        attempt.enter(PipelineState::Presigning);
        let batch = match self.presign(draft, &manifest).await {
            Ok(batch) => batch,
            Err(e) => return Err(attempt.fail(e)),
        };

        attempt.enter(PipelineState::Uploading);
        let outcomes = match self.upload_all(draft, &manifest, &batch).await {
            Ok(outcomes) => outcomes,
            Err(e) => return Err(attempt.fail(e)),
        };

        attempt.enter(PipelineState::Committing);
        let payload = build_commit_payload(draft, &batch);
        let course = match self.commit(&payload).await {
            Ok(course) => course,
            Err(e) => return Err(attempt.fail(e)),
        };

        attempt.enter(PipelineState::Committed);
        tracing::info!(course_id = %course.id, videos = batch.len(), "Course published");

        Ok(PublishedCourse {
            course,
            payload,
            outcomes,
            history: attempt.history,
        })
    }

    async fn presign(
        &self,
        draft: &CourseDraft,
        manifest: &Manifest,
    ) -> Result<PresignedBatch, PipelineError> {
        if manifest.is_empty() {
            tracing::debug!("No pending videos, skipping presign");
            return Ok(PresignedBatch::new());
        }

        let response = self
            .api
            .presign(&PresignRequest::from_draft(draft))
            .await
            .map_err(classify_presign_error)?;
        if !response.ok {
            return Err(PipelineError::Presign {
                status: None,
                message: "server reported ok: false".to_string(),
            });
        }

        let missing: Vec<SlotId> = manifest
            .slot_ids()
            .filter(|id| !response.presigned.contains_key(id))
            .collect();
        let unexpected: Vec<SlotId> = response
            .presigned
            .keys()
            .filter(|id| manifest.get(**id).is_none())
            .copied()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(PipelineError::SlotMismatch {
                missing,
                unexpected,
            });
        }

        tracing::info!(slots = response.presigned.len(), "Presigned upload slots");
        Ok(response.presigned)
    }

    async fn upload_all(
        &self,
        draft: &CourseDraft,
        manifest: &Manifest,
        batch: &PresignedBatch,
    ) -> Result<BTreeMap<SlotId, SlotOutcome>, PipelineError> {
        let mut outcomes: BTreeMap<SlotId, SlotOutcome> = manifest
            .slot_ids()
            .map(|id| (id, SlotOutcome::Pending))
            .collect();

        let client = self.api.client();
        let transfers = manifest.iter().filter_map(|slot| {
            let credential = batch.get(&slot.id)?;
            let file = pending_file(draft, slot.id);
            Some(async move {
                let started = Instant::now();
                let result = match file {
                    Some(file) => {
                        transfer::put_object(client, credential, &slot.declared_content_type, file)
                            .await
                    }
                    None => Err(TransferError {
                        status: None,
                        message: "no file is bound to this lesson".to_string(),
                    }),
                };
                match &result {
                    Ok(size) => tracing::info!(
                        slot = %slot.id,
                        key = %credential.key,
                        size_bytes = size,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Video uploaded"
                    ),
                    Err(e) => tracing::warn!(
                        slot = %slot.id,
                        key = %credential.key,
                        status = ?e.status,
                        error = %e.message,
                        "Video upload failed"
                    ),
                }
                (slot.id, result.map(|_| ()))
            })
        });

        for (slot, result) in join_all(transfers).await {
            outcomes.insert(
                slot,
                match result {
                    Ok(()) => SlotOutcome::Succeeded,
                    Err(e) => SlotOutcome::Failed(e),
                },
            );
        }

        let failures: Vec<TransferFailure> = outcomes
            .iter()
            .filter_map(|(slot, outcome)| match outcome {
                SlotOutcome::Failed(error) => Some(TransferFailure {
                    slot: *slot,
                    key: batch.get(slot).map(|c| c.key.clone())?,
                    error: error.clone(),
                }),
                _ => None,
            })
            .collect();
        if failures.is_empty() {
            return Ok(outcomes);
        }

        let uploaded: Vec<SlotId> = outcomes
            .iter()
            .filter(|(_, outcome)| **outcome == SlotOutcome::Succeeded)
            .map(|(slot, _)| *slot)
            .collect();
        let (removed, orphaned) = self.release_uploaded(&uploaded, batch).await;

        Err(PipelineError::Transfer {
            failures,
            removed,
            orphaned,
        })
    }

    /// Apply the orphan policy to the slots that uploaded. Returns `(removed, orphaned)`.
    async fn release_uploaded(
        &self,
        uploaded: &[SlotId],
        batch: &PresignedBatch,
    ) -> (Vec<ObjectKey>, Vec<ObjectKey>) {
        let credentials: Vec<_> = uploaded.iter().filter_map(|id| batch.get(id)).collect();

        if self.orphan_policy == OrphanPolicy::Retain {
            for credential in &credentials {
                tracing::warn!(key = %credential.key, "Uploaded object left orphaned");
            }
            return (
                Vec::new(),
                credentials.iter().map(|c| c.key.clone()).collect(),
            );
        }

        let client = self.api.client();
        let deletes = credentials.iter().map(|credential| async move {
            let result = transfer::delete_object(client, credential).await;
            (*credential, result)
        });

        let mut removed = Vec::new();
        let mut orphaned = Vec::new();
        for (credential, result) in join_all(deletes).await {
            match result {
                Ok(()) => {
                    tracing::info!(key = %credential.key, "Removed object from failed attempt");
                    removed.push(credential.key.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        key = %credential.key,
                        status = ?e.status,
                        error = %e.message,
                        "Could not remove object from failed attempt"
                    );
                    orphaned.push(credential.key.clone());
                }
            }
        }
        (removed, orphaned)
    }

    /// The created course's identifier is the only success signal.
    async fn commit(&self, payload: &CommitPayload) -> Result<Course, PipelineError> {
        let response = self
            .api
            .create_course(payload)
            .await
            .map_err(|e| match e {
                ApiError::Status { status, body } => PipelineError::Commit {
                    status: Some(status),
                    message: body,
                },
                ApiError::Transport(err) => PipelineError::Commit {
                    status: None,
                    message: format!("{:#}", err),
                },
            })?;

        Ok(response.course)
    }
}

fn pending_file(draft: &CourseDraft, slot: SlotId) -> Option<&LocalFile> {
    draft
        .disciplines
        .get(slot.discipline)?
        .lessons
        .get(slot.lesson)?
        .file
        .as_ref()
}

fn classify_presign_error(err: ApiError) -> PipelineError {
    match err {
        ApiError::Status { status, body } => match ErrorBody::parse(&body) {
            Some(parsed) if parsed.code.as_deref() == Some("CONFIGURATION_ERROR") => {
                PipelineError::Configuration {
                    message: parsed.error,
                }
            }
            Some(parsed) => PipelineError::Presign {
                status: Some(status),
                message: parsed.error,
            },
            None => PipelineError::Presign {
                status: Some(status),
                message: body,
            },
        },
        ApiError::Transport(err) => PipelineError::Presign {
            status: None,
            message: format!("{:#}", err),
        },
    }
}

#[cfg(test)]
mod tests;
