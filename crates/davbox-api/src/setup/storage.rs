//! Remote store setup

use anyhow::{Context, Result};
use davbox_core::Config;
use davbox_storage::{create_store, RemoteStore};
use std::sync::Arc;

/// Construct the store backend named by the configuration.
pub async fn setup_store(config: &Config) -> Result<Arc<dyn RemoteStore>> {
    tracing::info!(backend = %config.store_backend, "Initializing remote store...");

    let store = create_store(config)
        .await
        .context("Failed to initialize the remote store")?;

    tracing::info!(backend = %store.backend_type(), "Remote store initialized");

    Ok(store)
}
