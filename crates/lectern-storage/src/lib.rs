//! Lectern Storage Library
//!
//! This crate provides the storage abstraction and its implementations. Clients never
//! send video bytes through the application server: backends mint short-lived
//! presigned URLs and the client writes to the bucket directly.
//!
//! # Addressing
//!
//! Every backend addresses objects path-style: `{endpoint}/{bucket}/{urlencoded key}`
//! is both the public URL of an object and the base of its presigned URLs.
//!
//! Keys must be non-empty, must not start with `/` and must not contain `.` or `..`
//! path segments (see the `keys` module).

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use lectern_core::StorageBackend;
#[cfg(feature = "storage-memory")]
pub use memory::{MemoryStorage, SignedParams, StoredObject};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
