//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from
//! main.rs for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::{AppState, DbState, MediaState};
use anyhow::{Context, Result};
use davbox_core::{CategoryRules, Config};
use davbox_db::FileRepository;
use davbox_processing::{IngestPipeline, IngestSettings};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_tracing(&config);

    tracing::info!("Configuration loaded and validated successfully");

    // Thumbnails are written below the public root; provision it before
    // the first upload needs it.
    tokio::fs::create_dir_all(config.thumbnail_dir())
        .await
        .context("Failed to create the thumbnail directory")?;

    // Setup database
    let pool = database::setup_database(&config).await?;

    // Setup remote store
    let store = storage::setup_store(&config).await?;

    let files = FileRepository::new(pool.clone());
    let pipeline = IngestPipeline::new(
        store.clone(),
        CategoryRules::from_config(&config),
        IngestSettings::from_config(&config),
    );

    let state = Arc::new(AppState {
        db: DbState { pool, files },
        media: MediaState { store, pipeline },
        is_production: config.is_production(),
        config,
    });

    // Setup routes
    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
