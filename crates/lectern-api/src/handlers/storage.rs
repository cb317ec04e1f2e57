//! Signed object routes for the in-memory storage backend.
//!
//! These stand in for an S3-compatible bucket: the URLs minted by `MemoryStorage`
//! point here, and every write or delete is checked against its signature and expiry.

use crate::error::HttpAppError;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use lectern_core::AppError;
use lectern_storage::{MemoryStorage, SignedParams, StorageError};
use std::sync::Arc;

fn signed_params(
    query: Result<Query<SignedParams>, QueryRejection>,
) -> Result<SignedParams, HttpAppError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        HttpAppError(AppError::Forbidden(format!(
            "Missing or malformed signature: {}",
            rejection.body_text()
        )))
    })
}

#[tracing::instrument(skip(storage, query, headers, body), fields(size_bytes))]
pub async fn put_object(
    State(storage): State<Arc<MemoryStorage>>,
    Path((bucket, key)): Path<(String, String)>,
    query: Result<Query<SignedParams>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let params = signed_params(query)?;
    let body = body?;
    tracing::Span::current().record("size_bytes", body.len());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    storage
        .accept_put(&bucket, &key, &params, content_type, body, Utc::now())
        .await?;
    Ok(StatusCode::OK)
}

#[tracing::instrument(skip(storage, query))]
pub async fn delete_object(
    State(storage): State<Arc<MemoryStorage>>,
    Path((bucket, key)): Path<(String, String)>,
    query: Result<Query<SignedParams>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let params = signed_params(query)?;
    storage
        .accept_delete(&bucket, &key, &params, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public read, the address a lesson's `videoUrl` points at.
pub async fn get_object(
    State(storage): State<Arc<MemoryStorage>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let object = storage
        .get_object(&bucket, &key)
        .await
        .ok_or_else(|| StorageError::NotFound(format!("Object not found: {}", key)))?;

    Ok((
        [(header::CONTENT_TYPE, object.content_type)],
        object.data,
    ))
}
