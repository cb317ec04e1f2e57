//! Constants shared across crates.

/// Lifetime of every presigned credential (15 minutes).
pub const PRESIGN_TTL_SECS: u64 = 15 * 60;

/// Content type used when a file does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Prefix of the environment variables holding object-storage settings.
pub const STORAGE_ENV_PREFIX: &str = "CLOUDFLARE_R2_";

/// Region used for S3-compatible providers that do not have regions (Cloudflare R2).
pub const DEFAULT_STORAGE_REGION: &str = "auto";
