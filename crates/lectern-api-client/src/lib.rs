//! Shared HTTP client for the Lectern API.
//!
//! Provides a minimal client with optional Bearer auth, generic GET/POST helpers,
//! domain methods (presign, create/get/list courses) and the upload pipeline that
//! turns a local course draft into a committed course.

pub mod api;
pub mod upload;

use anyhow::Context;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    Anonymous,
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

/// Failure of a single API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status. `body` is kept verbatim.
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) => None,
        }
    }
}

/// HTTP client for the Lectern API with configurable auth.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> anyhow::Result<Self> {
        // No overall timeout: video transfers share this client and may run long.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from environment: LECTERN_API_URL, optional LECTERN_API_TOKEN.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            std::env::var("LECTERN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let auth = match std::env::var("LECTERN_API_TOKEN") {
            Ok(token) if !token.is_empty() => Auth::Bearer(token),
            _ => Auth::Anonymous,
        };

        Self::new(base_url, auth)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Anonymous => request,
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
        }
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.apply_auth(self.client.get(self.build_url(path)));
        Self::send(request).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        Self::send(request).await
    }

    async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }

    /// Raw client for requests outside the API, such as presigned storage URLs.
    /// No auth is attached.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

pub use upload::{
    OrphanPolicy, PipelineError, PipelineFailure, PipelineState, PublishedCourse, SlotOutcome,
    TransferFailure, UploadOrchestrator,
};
