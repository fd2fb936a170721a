//! WebDAV store backend
//!
//! Speaks WebDAV against an Alist-style server: MKCOL for directory
//! provisioning, PUT for uploads, PROPFIND for existence checks. Public
//! URL resolution goes through a plain authenticated GET that follows
//! redirects to wherever the server's driver actually hosts the object.

use async_trait::async_trait;
use reqwest_dav::{Auth, ClientBuilder, Depth};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::paths::validate_remote_path;
use crate::traits::{RemoteStore, StoreError, StoreResult};
use davbox_core::StoreBackend;

/// The WebDAV slice of `Config`, kept separate so the store can be
/// constructed in tests without a full application config.
#[derive(Debug, Clone)]
pub struct WebdavSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Timeout for WebDAV operations (uploads included).
    pub timeout: Duration,
    /// Timeout for public URL resolution.
    pub link_timeout: Duration,
    pub accept_invalid_certs: bool,
}

pub struct WebdavStore {
    client: reqwest_dav::Client,
    /// Separate client for link resolution: follows redirects and uses
    /// the shorter link timeout.
    http: reqwest::Client,
    host: String,
    username: String,
    password: String,
}

impl WebdavStore {
    pub fn new(settings: WebdavSettings) -> StoreResult<Self> {
        let agent = reqwest::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| {
                StoreError::ConfigError(format!("Failed to build WebDAV HTTP client: {}", e))
            })?;

        let client = ClientBuilder::new()
            .set_agent(agent)
            .set_host(settings.host.clone())
            .set_auth(Auth::Basic(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build()
            .map_err(|e| {
                StoreError::ConfigError(format!("Failed to build WebDAV client: {}", e))
            })?;

        let http = reqwest::Client::builder()
            .timeout(settings.link_timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| {
                StoreError::ConfigError(format!("Failed to build link HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            http,
            host: settings.host,
            username: settings.username,
            password: settings.password,
        })
    }

    fn dav_path(remote_path: &str) -> String {
        format!("/{}", remote_path.trim_start_matches('/'))
    }

    /// Whether a collection or object exists at `remote_path`.
    async fn probe(&self, remote_path: &str) -> StoreResult<bool> {
        match self
            .client
            .list(&Self::dav_path(remote_path), Depth::Number(0))
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if dav_status(&err) == Some(404) => Ok(false),
            Err(err) => Err(StoreError::BackendError(format!(
                "PROPFIND {} failed: {}",
                remote_path, err
            ))),
        }
    }
}

#[async_trait]
impl RemoteStore for WebdavStore {
    async fn ensure_dir_chain(&self, dir: &str) -> StoreResult<()> {
        validate_remote_path(dir)?;

        let mut current = String::new();
        for level in dir.split('/').filter(|s| !s.is_empty()) {
            if current.is_empty() {
                current = level.to_string();
            } else {
                current = format!("{}/{}", current, level);
            }

            if self.probe(&current).await? {
                tracing::debug!(path = %current, "Remote directory already exists");
                continue;
            }

            match self.client.mkcol(&Self::dav_path(&current)).await {
                Ok(()) => {
                    tracing::info!(path = %current, "Remote directory created");
                }
                // Lost a race against a concurrent batch creating the
                // same date directory.
                Err(err) if dav_status(&err) == Some(405) => {
                    tracing::debug!(path = %current, "Remote directory already exists");
                }
                Err(err) => {
                    return Err(StoreError::DirCreateFailed(format!(
                        "MKCOL {} failed: {}",
                        current, err
                    )));
                }
            }
        }

        Ok(())
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> StoreResult<()> {
        validate_remote_path(remote_path)?;

        let data = tokio::fs::read(local_path).await.map_err(|e| {
            StoreError::UploadFailed(format!(
                "Failed to read {}: {}",
                local_path.display(),
                e
            ))
        })?;
        let size = data.len();
        let start = Instant::now();

        self.client
            .put(&Self::dav_path(remote_path), data)
            .await
            .map_err(|e| {
                StoreError::UploadFailed(format!("PUT {} failed: {}", remote_path, e))
            })?;

        tracing::info!(
            path = %remote_path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "WebDAV upload successful"
        );

        Ok(())
    }

    async fn exists(&self, remote_path: &str) -> StoreResult<bool> {
        validate_remote_path(remote_path)?;
        self.probe(remote_path).await
    }

    async fn delete(&self, remote_path: &str) -> StoreResult<()> {
        validate_remote_path(remote_path)?;

        match self.client.delete(&Self::dav_path(remote_path)).await {
            Ok(()) => {
                tracing::info!(path = %remote_path, "WebDAV delete successful");
                Ok(())
            }
            Err(err) if dav_status(&err) == Some(404) => {
                tracing::debug!(path = %remote_path, "WebDAV object already gone");
                Ok(())
            }
            Err(err) => Err(StoreError::DeleteFailed(format!(
                "DELETE {} failed: {}",
                remote_path, err
            ))),
        }
    }

    async fn resolve_public_url(&self, remote_path: &str) -> StoreResult<Option<String>> {
        validate_remote_path(remote_path)?;

        let url = format!(
            "{}/{}",
            self.host.trim_end_matches('/'),
            remote_path.trim_start_matches('/')
        );

        let response = match self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(path = %remote_path, error = %err, "Link resolution failed");
                return Ok(None);
            }
        };

        let status = response.status();
        if status.is_success() || status.is_redirection() {
            let resolved = response.url().to_string();
            tracing::debug!(path = %remote_path, url = %resolved, "Link resolved");
            Ok(Some(resolved))
        } else {
            tracing::warn!(
                path = %remote_path,
                status = %status,
                "Link resolution returned unusable status"
            );
            Ok(None)
        }
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Webdav
    }
}

/// HTTP status behind a reqwest_dav error, when there is one.
fn dav_status(err: &reqwest_dav::types::Error) -> Option<u16> {
    use reqwest_dav::types::{DecodeError, Error as DavError};
    match err {
        DavError::Reqwest(e) => e.status().map(|s| s.as_u16()),
        DavError::Decode(DecodeError::StatusMismatched(e)) => Some(e.response_code),
        DavError::Decode(DecodeError::Server(e)) => Some(e.response_code),
        _ => None,
    }
}
