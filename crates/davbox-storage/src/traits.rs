//! Remote store abstraction trait
//!
//! This module defines the RemoteStore trait that all store backends must
//! implement.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use davbox_core::StoreBackend;

/// Remote store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Directory creation failed: {0}")]
    DirCreateFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid remote path: {0}")]
    InvalidPath(String),

    #[error("Store backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote store abstraction
///
/// Backends (WebDAV, local filesystem) implement this trait so the ingest
/// pipeline and the deletion flow never couple to a protocol.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create every missing level of `dir`, parents first, checking
    /// existence before each creation. Idempotent; an already-present
    /// chain is a success.
    async fn ensure_dir_chain(&self, dir: &str) -> StoreResult<()>;

    /// Upload the file at `local_path` to `remote_path`. An existing
    /// object at the path is overwritten.
    async fn upload(&self, local_path: &Path, remote_path: &str) -> StoreResult<()>;

    /// Check whether an object exists at `remote_path`.
    async fn exists(&self, remote_path: &str) -> StoreResult<bool>;

    /// Delete the object at `remote_path`. Deleting a missing object is a
    /// no-op success.
    async fn delete(&self, remote_path: &str) -> StoreResult<()>;

    /// Resolve `remote_path` to a URL a client can fetch directly.
    /// `Ok(None)` means the store yielded no usable link; transport
    /// failures during resolution are folded into `Ok(None)` and logged,
    /// matching the soft contract of the link endpoint.
    async fn resolve_public_url(&self, remote_path: &str) -> StoreResult<Option<String>>;

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;
}
