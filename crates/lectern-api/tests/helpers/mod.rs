//! Test helpers: build the app over in-memory storage for integration tests.
//!
//! Run from workspace root: `cargo test -p lectern-api --test courses_test`.

pub mod fixtures;

use axum_test::{TestResponse, TestServer};
use lectern_core::{Config, ServerConfig, StorageBackend, StorageConfig};
use lectern_api::setup;
use serde_json::Value;

/// Host prefix of every URL the in-memory backend mints in tests.
pub const TEST_ORIGIN: &str = "http://localhost:3000";

pub const TEST_API_TOKEN: &str = "test-api-token";

pub fn test_config(verify_uploaded_objects: bool) -> Config {
    let storage = StorageConfig::from_json(
        r#"{
            "access_key_id": "test-access-key",
            "secret_access_key": "test-secret-key",
            "endpoint": "http://localhost:3000/storage",
            "bucket_name": "videos"
        }"#,
    )
    .expect("test storage config must be valid");

    Config {
        server: ServerConfig {
            storage_backend: StorageBackend::Memory,
            verify_uploaded_objects,
            api_token: Some(TEST_API_TOKEN.to_string()),
            ..ServerConfig::default()
        },
        storage,
    }
}

pub fn setup_test_server() -> TestServer {
    setup_test_server_with(test_config(true))
}

pub fn setup_test_server_with(config: Config) -> TestServer {
    let (_state, router) = setup::build_app(config).expect("Failed to build app");
    TestServer::new(router.into_make_service()).expect("Failed to create test server")
}

/// A signed URL split into its server path and `(expires, signature)` query values.
pub struct SignedUrl {
    pub path: String,
    pub expires: String,
    pub signature: String,
}

pub fn split_signed_url(url: &str) -> SignedUrl {
    let relative = url
        .strip_prefix(TEST_ORIGIN)
        .unwrap_or_else(|| panic!("unexpected origin in {url}"));
    let (path, query) = relative.split_once('?').expect("signed URL has a query");

    let mut expires = String::new();
    let mut signature = String::new();
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some(("expires", v)) => expires = v.to_string(),
            Some(("signature", v)) => signature = v.to_string(),
            _ => {}
        }
    }

    SignedUrl {
        path: path.to_string(),
        expires,
        signature,
    }
}

/// PUT `body` to a presigned URL through the API's storage route.
pub async fn upload(
    server: &TestServer,
    presigned_url: &str,
    content_type: &str,
    body: &'static [u8],
) -> TestResponse {
    let signed = split_signed_url(presigned_url);
    server
        .put(&signed.path)
        .add_query_param("expires", &signed.expires)
        .add_query_param("signature", &signed.signature)
        .content_type(content_type)
        .bytes(body.into())
        .await
}

pub async fn presign(server: &TestServer, request: Value) -> Value {
    let response = server.post("/api/courses/presign").json(&request).await;
    assert_eq!(response.status_code(), 200);
    response.json::<Value>()
}

/// POST a commit payload with the test API token.
pub async fn commit(server: &TestServer, payload: &Value) -> TestResponse {
    server
        .post("/api/courses")
        .add_header("Authorization", format!("Bearer {}", TEST_API_TOKEN))
        .json(payload)
        .await
}
