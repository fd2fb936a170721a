use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use davbox_core::models::FileSummary;

use crate::auth;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FilePage {
    pub files: Vec<FileSummary>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// List stored files, newest first.
///
/// Entries carry an `owned` flag computed against the caller's identity
/// cookie; the owner token itself never appears in a response.
#[utoipa::path(
    get,
    path = "/api/v0/files",
    tag = "files",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of files", body = FilePage),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, jar, query),
    fields(page = query.page, per_page = query.per_page, operation = "list_files")
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Enforce bounds to prevent abuse
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, 100);
    let offset = (page - 1) * per_page;

    let caller = auth::resolve_caller(&jar, &state.config);
    let records = state.db.files.list(per_page, offset).await?;
    let total = state.db.files.count().await?;

    let files = records
        .into_iter()
        .map(|record| FileSummary::from_record(record, &caller))
        .collect();

    Ok(Json(FilePage {
        files,
        page,
        per_page,
        total,
    }))
}
