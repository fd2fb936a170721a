//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef` instead of the whole aggregate.

use davbox_core::Config;
use davbox_db::FileRepository;
use davbox_processing::IngestPipeline;
use davbox_storage::RemoteStore;
use sqlx::PgPool;
use std::sync::Arc;

// ----- Sub-state types -----

/// Database pool and repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub files: FileRepository,
}

/// Remote store handle and the upload pipeline built on it.
#[derive(Clone)]
pub struct MediaState {
    pub store: Arc<dyn RemoteStore>,
    pub pipeline: IngestPipeline,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub media: MediaState,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for MediaState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.media.clone()
    }
}

// Compile-time check that AppState stays Send + Sync (required by Axum).
#[allow(dead_code)]
fn _assert_app_state_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppState>();
}
