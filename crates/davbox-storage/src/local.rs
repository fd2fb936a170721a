//! Local filesystem store backend
//!
//! Development and test backend: objects live under a base directory and
//! "public" URLs are served by whatever static server fronts it. The
//! pipeline tests run against this backend to exercise the full ingest
//! flow without a WebDAV server.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::paths::validate_remote_path;
use crate::traits::{RemoteStore, StoreError, StoreResult};
use davbox_core::StoreBackend;

#[derive(Clone)]
pub struct LocalStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStore {
    /// Create a new LocalStore rooted at `base_path`, creating the
    /// directory if needed. `base_url` is the prefix resolved links get.
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StoreResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StoreError::ConfigError(format!(
                "Failed to create store directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore {
            base_path,
            base_url,
        })
    }

    fn object_path(&self, remote_path: &str) -> StoreResult<PathBuf> {
        validate_remote_path(remote_path)?;
        Ok(self.base_path.join(remote_path))
    }

    fn object_url(&self, remote_path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), remote_path)
    }
}

#[async_trait]
impl RemoteStore for LocalStore {
    async fn ensure_dir_chain(&self, dir: &str) -> StoreResult<()> {
        let path = self.object_path(dir)?;
        fs::create_dir_all(&path).await.map_err(|e| {
            StoreError::DirCreateFailed(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!(path = %path.display(), "Local store directory ready");
        Ok(())
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> StoreResult<()> {
        let path = self.object_path(remote_path)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let size = fs::copy(local_path, &path).await.map_err(|e| {
            StoreError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                local_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %remote_path,
            size_bytes = size,
            "Local store upload successful"
        );

        Ok(())
    }

    async fn exists(&self, remote_path: &str) -> StoreResult<bool> {
        let path = self.object_path(remote_path)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, remote_path: &str) -> StoreResult<()> {
        let path = self.object_path(remote_path)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StoreError::DeleteFailed(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %remote_path, "Local store delete successful");
        Ok(())
    }

    async fn resolve_public_url(&self, remote_path: &str) -> StoreResult<Option<String>> {
        if self.exists(remote_path).await? {
            Ok(Some(self.object_url(remote_path)))
        } else {
            Ok(None)
        }
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn store_in(dir: &Path) -> LocalStore {
        LocalStore::new(dir, "http://localhost:5678/store".to_string())
            .await
            .unwrap()
    }

    fn scratch_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[tokio::test]
    async fn upload_exists_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        let scratch = scratch_file(b"hello");

        store.ensure_dir_chain("2025/09/23").await.unwrap();
        store
            .upload(scratch.path(), "2025/09/23/hello.txt")
            .await
            .unwrap();

        assert!(store.exists("2025/09/23/hello.txt").await.unwrap());
        assert_eq!(
            fs::read(dir.path().join("2025/09/23/hello.txt"))
                .await
                .unwrap(),
            b"hello"
        );

        store.delete("2025/09/23/hello.txt").await.unwrap();
        assert!(!store.exists("2025/09/23/hello.txt").await.unwrap());
    }

    #[tokio::test]
    async fn deleting_twice_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        let scratch = scratch_file(b"x");

        store.upload(scratch.path(), "a.txt").await.unwrap();
        store.delete("a.txt").await.unwrap();
        store.delete("a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn upload_overwrites_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;

        let first = scratch_file(b"first");
        store.upload(first.path(), "dup.txt").await.unwrap();
        let second = scratch_file(b"second");
        store.upload(second.path(), "dup.txt").await.unwrap();

        assert_eq!(
            fs::read(dir.path().join("dup.txt")).await.unwrap(),
            b"second"
        );
    }

    #[tokio::test]
    async fn resolve_reports_missing_objects_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        let scratch = scratch_file(b"x");

        store.upload(scratch.path(), "2025/09/23/a.png").await.unwrap();
        assert_eq!(
            store.resolve_public_url("2025/09/23/a.png").await.unwrap(),
            Some("http://localhost:5678/store/2025/09/23/a.png".to_string())
        );
        assert_eq!(
            store.resolve_public_url("2025/09/23/b.png").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        let scratch = scratch_file(b"x");

        assert!(matches!(
            store.upload(scratch.path(), "../escape.txt").await,
            Err(StoreError::InvalidPath(_))
        ));
        assert!(matches!(
            store.exists("/absolute").await,
            Err(StoreError::InvalidPath(_))
        ));
    }
}
