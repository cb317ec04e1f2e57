//! Configuration module
//!
//! Object-storage settings are strict: every required field must be present and
//! well formed, and unknown fields are rejected, so misconfiguration surfaces before
//! any credential is signed. Server settings follow the usual env-with-defaults style.

use std::env;
use std::fmt;

use serde::Deserialize;
use validator::Validate;

use crate::constants::{DEFAULT_STORAGE_REGION, STORAGE_ENV_PREFIX};
use crate::models::KeyScheme;
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 3000;
const MAX_VIDEO_SIZE_MB: usize = 500;

/// Configuration errors. Always fatal: nothing is signed or uploaded after one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn from_envy(err: envy::Error) -> Self {
        match err {
            envy::Error::MissingValue(field) => ConfigError::Missing(format!(
                "{}{}",
                STORAGE_ENV_PREFIX,
                field.to_uppercase()
            )),
            envy::Error::Custom(message) => ConfigError::Invalid(message),
        }
    }
}

/// Object-storage settings (S3-compatible endpoint, bucket and static credentials).
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[validate(length(min = 1, message = "access_key_id must not be empty"))]
    pub access_key_id: String,
    #[validate(length(min = 1, message = "secret_access_key must not be empty"))]
    pub secret_access_key: String,
    #[validate(url(message = "endpoint must be a valid URL"))]
    pub endpoint: String,
    #[validate(length(min = 1, message = "bucket_name must not be empty"))]
    pub bucket_name: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .finish()
    }
}

impl StorageConfig {
    /// Load from the process environment (`CLOUDFLARE_R2_*`), reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(env::vars())
    }

    /// Load from an explicit set of variables. Only `CLOUDFLARE_R2_*` entries are
    /// considered; any of them that is not a known field is an error.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: StorageConfig = envy::prefixed(STORAGE_ENV_PREFIX)
            .from_iter(vars)
            .map_err(ConfigError::from_envy)?;
        config.check()?;
        Ok(config)
    }

    /// Load from a JSON object with the same field names (lowercase, unprefixed).
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: StorageConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "endpoint must use http or https: {}",
                self.endpoint
            )));
        }

        if self.region.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::Invalid(
                "region must not be empty when set".to_string(),
            ));
        }

        Ok(())
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_STORAGE_REGION)
    }

    /// Endpoint without a trailing slash.
    pub fn endpoint_base(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

/// HTTP server settings
#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub storage_backend: StorageBackend,
    pub key_scheme: KeyScheme,
    pub verify_uploaded_objects: bool,
    pub max_video_size_bytes: usize,
    /// Bearer token required to commit courses. The server refuses to start without it.
    pub api_token: Option<String>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("cors_origins", &self.cors_origins)
            .field("storage_backend", &self.storage_backend)
            .field("key_scheme", &self.key_scheme)
            .field("verify_uploaded_objects", &self.verify_uploaded_objects)
            .field("max_video_size_bytes", &self.max_video_size_bytes)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            storage_backend: StorageBackend::S3,
            key_scheme: KeyScheme::default(),
            verify_uploaded_objects: true,
            max_video_size_bytes: MAX_VIDEO_SIZE_MB * 1024 * 1024,
            api_token: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number: {}", raw))?,
            Err(_) => defaults.port,
        };

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or(defaults.environment);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.storage_backend,
        };

        let key_scheme = match env::var("OBJECT_KEY_SCHEME") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.key_scheme,
        };

        let verify_uploaded_objects = env::var("VERIFY_UPLOADED_OBJECTS")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(defaults.verify_uploaded_objects);

        let max_video_size_bytes = match env::var("MAX_VIDEO_SIZE_MB") {
            Ok(raw) => {
                let mb: usize = raw.parse().map_err(|_| {
                    anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be a positive integer: {}", raw)
                })?;
                mb * 1024 * 1024
            }
            Err(_) => defaults.max_video_size_bytes,
        };

        let api_token = env::var("API_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            port,
            environment,
            cors_origins,
            storage_backend,
            key_scheme,
            verify_uploaded_objects,
            max_video_size_bytes,
            api_token,
        })
    }
}

/// Application configuration (API server).
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Load everything from the environment. Invalid storage settings abort startup.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let server = ServerConfig::from_env()?;
        let storage = StorageConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Object storage configuration error: {}", e))?;
        Ok(Self { server, storage })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(
            self.server.environment.to_lowercase().as_str(),
            "production" | "prod"
        )
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.server.storage_backend
    }

    pub fn key_scheme(&self) -> KeyScheme {
        self.server.key_scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete() -> Vec<(String, String)> {
        vars(&[
            ("CLOUDFLARE_R2_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("CLOUDFLARE_R2_SECRET_ACCESS_KEY", "secret"),
            ("CLOUDFLARE_R2_ENDPOINT", "https://account.r2.cloudflarestorage.com"),
            ("CLOUDFLARE_R2_BUCKET_NAME", "videos"),
            ("PATH", "/usr/bin"),
        ])
    }

    #[test]
    fn loads_complete_settings_and_ignores_unrelated_vars() {
        let config = StorageConfig::from_vars(complete()).unwrap();
        assert_eq!(config.bucket_name, "videos");
        assert_eq!(config.region(), "auto");
        assert_eq!(
            config.endpoint_base(),
            "https://account.r2.cloudflarestorage.com"
        );
    }

    #[test]
    fn missing_bucket_is_reported_by_name() {
        let settings: Vec<_> = complete()
            .into_iter()
            .filter(|(k, _)| k != "CLOUDFLARE_R2_BUCKET_NAME")
            .collect();
        let err = StorageConfig::from_vars(settings).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing("CLOUDFLARE_R2_BUCKET_NAME".to_string())
        );
    }

    #[test]
    fn unknown_prefixed_setting_is_rejected() {
        let mut settings = complete();
        settings.push(("CLOUDFLARE_R2_PUBLIC_DOMAIN".to_string(), "x".to_string()));
        let err = StorageConfig::from_vars(settings).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("public_domain")));
    }

    #[test]
    fn malformed_endpoint_is_rejected() {
        let settings: Vec<_> = complete()
            .into_iter()
            .map(|(k, v)| {
                if k == "CLOUDFLARE_R2_ENDPOINT" {
                    (k, "not a url".to_string())
                } else {
                    (k, v)
                }
            })
            .collect();
        assert!(matches!(
            StorageConfig::from_vars(settings),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn empty_values_are_rejected() {
        let settings: Vec<_> = complete()
            .into_iter()
            .map(|(k, v)| {
                if k == "CLOUDFLARE_R2_ACCESS_KEY_ID" {
                    (k, String::new())
                } else {
                    (k, v)
                }
            })
            .collect();
        assert!(StorageConfig::from_vars(settings).is_err());
    }

    #[test]
    fn json_settings_are_strict() {
        let ok = r#"{
            "access_key_id": "a",
            "secret_access_key": "b",
            "endpoint": "http://localhost:9000",
            "bucket_name": "videos",
            "region": "us-east-1"
        }"#;
        let config = StorageConfig::from_json(ok).unwrap();
        assert_eq!(config.region(), "us-east-1");

        let extra = r#"{
            "access_key_id": "a",
            "secret_access_key": "b",
            "endpoint": "http://localhost:9000",
            "bucket_name": "videos",
            "acl": "public-read"
        }"#;
        assert!(StorageConfig::from_json(extra).is_err());

        let missing = r#"{ "access_key_id": "a", "secret_access_key": "b", "endpoint": "http://localhost:9000" }"#;
        assert!(StorageConfig::from_json(missing).is_err());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = StorageConfig::from_vars(complete()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn server_debug_output_redacts_api_token() {
        let server = ServerConfig {
            api_token: Some("commit-token-123".to_string()),
            ..ServerConfig::default()
        };
        let rendered = format!("{:?}", server);
        assert!(!rendered.contains("commit-token-123"));
        assert!(rendered.contains("<redacted>"));
    }
}
