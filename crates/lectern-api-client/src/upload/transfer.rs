//! Direct transfers against presigned storage URLs.

use anyhow::Context;
use lectern_core::models::{FileSource, LocalFile, PresignedCredential};
use reqwest::{header, Body, Client};
use tokio_util::io::ReaderStream;

/// Why a single PUT or DELETE did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferError {
    /// Provider status, `None` for local or network failures
    pub status: Option<u16>,
    pub message: String,
}

impl TransferError {
    fn local(err: anyhow::Error) -> Self {
        Self {
            status: None,
            message: format!("{:#}", err),
        }
    }
}

/// Open a file body. Files on disk are streamed with a known length.
async fn request_body(file: &LocalFile) -> anyhow::Result<(Body, u64)> {
    match &file.source {
        FileSource::Memory(data) => Ok((Body::from(data.clone()), data.len() as u64)),
        FileSource::Path(path) => {
            let handle = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let len = handle
                .metadata()
                .await
                .with_context(|| format!("Failed to stat {}", path.display()))?
                .len();
            Ok((Body::wrap_stream(ReaderStream::new(handle)), len))
        }
    }
}

/// PUT `file` to the credential's presigned URL. Any non-2xx status fails the slot.
pub async fn put_object(
    client: &Client,
    credential: &PresignedCredential,
    content_type: &str,
    file: &LocalFile,
) -> Result<u64, TransferError> {
    let (body, len) = request_body(file).await.map_err(TransferError::local)?;

    let response = client
        .put(&credential.presigned_url)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .body(body)
        .send()
        .await
        .context("Upload request failed")
        .map_err(TransferError::local)?;

    let status = response.status();
    if status.is_success() {
        return Ok(len);
    }

    let body = response.text().await.unwrap_or_default();
    Err(TransferError {
        status: Some(status.as_u16()),
        message: if body.is_empty() {
            status.to_string()
        } else {
            body
        },
    })
}

/// DELETE through the credential's presigned delete URL. A missing object counts as
/// removed.
pub async fn delete_object(
    client: &Client,
    credential: &PresignedCredential,
) -> Result<(), TransferError> {
    let url = credential.delete_url.as_deref().ok_or_else(|| TransferError {
        status: None,
        message: "no delete URL was issued for this key".to_string(),
    })?;

    let response = client
        .delete(url)
        .send()
        .await
        .context("Delete request failed")
        .map_err(TransferError::local)?;

    let status = response.status();
    if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
        Ok(())
    } else {
        Err(TransferError {
            status: Some(status.as_u16()),
            message: status.to_string(),
        })
    }
}
