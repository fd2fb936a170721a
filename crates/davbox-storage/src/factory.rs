use std::sync::Arc;
use std::time::Duration;

use crate::local::LocalStore;
use crate::traits::{RemoteStore, StoreError, StoreResult};
use crate::webdav::{WebdavSettings, WebdavStore};
use davbox_core::{Config, StoreBackend};

/// Construct the store backend named by `config.store_backend`.
pub async fn create_store(config: &Config) -> StoreResult<Arc<dyn RemoteStore>> {
    match config.store_backend {
        StoreBackend::Webdav => {
            let host = config
                .webdav_host
                .clone()
                .ok_or_else(|| StoreError::ConfigError("WEBDAV_HOST not set".to_string()))?;
            let username = config
                .webdav_username
                .clone()
                .ok_or_else(|| StoreError::ConfigError("WEBDAV_USERNAME not set".to_string()))?;
            let password = config
                .webdav_password
                .clone()
                .ok_or_else(|| StoreError::ConfigError("WEBDAV_PASSWORD not set".to_string()))?;

            let settings = WebdavSettings {
                host,
                username,
                password,
                timeout: Duration::from_secs(config.remote_timeout_seconds),
                link_timeout: Duration::from_secs(config.link_timeout_seconds),
                accept_invalid_certs: config.webdav_accept_invalid_certs,
            };

            let store = WebdavStore::new(settings)?;
            tracing::info!(backend = %StoreBackend::Webdav, "Store backend initialized");
            Ok(Arc::new(store))
        }
        StoreBackend::Local => {
            let base_path = config
                .local_store_path
                .clone()
                .ok_or_else(|| StoreError::ConfigError("LOCAL_STORE_PATH not set".to_string()))?;
            let base_url = config
                .local_store_base_url
                .clone()
                .ok_or_else(|| {
                    StoreError::ConfigError("LOCAL_STORE_BASE_URL not set".to_string())
                })?;

            let store = LocalStore::new(base_path, base_url).await?;
            tracing::info!(backend = %StoreBackend::Local, "Store backend initialized");
            Ok(Arc::new(store))
        }
    }
}
