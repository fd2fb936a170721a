//! Route configuration and setup

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};

use davbox_core::Config;

use crate::api_doc::ApiDoc;
use crate::constants::{API_BASE, API_PREFIX, HTTP_CONCURRENCY_LIMIT};
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(config)?;

    let app = Router::new()
        .merge(api_routes())
        .merge(public_routes())
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        // The body cap applies uniformly; multipart uploads are the only
        // large bodies, so axum's per-extractor default limit is disabled
        // in favour of this one.
        .layer(RequestBodyLimitLayer::new(config.max_file_size_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Versioned API routes
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/files", API_PREFIX),
            post(handlers::upload::upload_files).get(handlers::list::list_files),
        )
        .route(
            &format!("{}/files/delete", API_PREFIX),
            post(handlers::delete::delete_files),
        )
        .route(
            &format!("{}/files/{{id}}", API_PREFIX),
            delete(handlers::delete::delete_file),
        )
        .route(
            &format!("{}/files/{{id}}/link", API_PREFIX),
            get(handlers::link::file_link),
        )
        .route(
            &format!("{}/session", API_PREFIX),
            post(handlers::session::login).delete(handlers::session::logout),
        )
}

/// Unversioned operational routes
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route(
            &format!("{}/openapi.json", API_BASE),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer> {
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow any origin");
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid CORS origin")?;
        CorsLayer::new().allow_origin(origins)
    };

    Ok(cors
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any))
}

#[derive(Serialize, ToSchema)]
pub(crate) struct HealthCheckResponse {
    status: &'static str,
    database: &'static str,
    storage: &'static str,
}

/// Run a dependency probe with a hard timeout so a wedged backend cannot
/// hang the health endpoint.
async fn run_check<F, T, E>(name: &str, fut: F) -> Result<T, String>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(Duration::from_secs(5), fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{name} check failed: {e}")),
        Err(_) => Err(format!("{name} check timed out")),
    }
}

/// Health check over the database and the remote store
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthCheckResponse),
        (status = 503, description = "A dependency is unavailable", body = HealthCheckResponse)
    )
)]
pub(crate) async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db = run_check("database", async {
        sqlx::query("SELECT 1").execute(&state.db.pool).await
    })
    .await;

    // Probing for a key that never exists exercises the backend round
    // trip without touching real objects.
    let store = run_check(
        "storage",
        state.media.store.exists("health-check-non-existent-key"),
    )
    .await;

    let database = match &db {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "unavailable"
        }
    };
    let storage = match &store {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            "unavailable"
        }
    };

    let healthy = db.is_ok() && store.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthCheckResponse {
            status: if healthy { "ok" } else { "unavailable" },
            database,
            storage,
        }),
    )
}
