use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use uuid::Uuid;

use davbox_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Redirect to a direct URL for the stored object.
///
/// The store resolves the record's remote path to whatever URL it can
/// vouch for; no usable URL is a soft outcome of the store, surfaced here
/// as a retryable upstream error.
#[utoipa::path(
    get,
    path = "/api/v0/files/{id}/link",
    tag = "files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 302, description = "Redirect to the stored object"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 502, description = "No usable link for this file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_id = %id, operation = "file_link"))]
pub async fn file_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .db
        .files
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let url = state
        .media
        .store
        .resolve_public_url(&record.remote_path)
        .await?
        .ok_or_else(|| AppError::LinkUnavailable(record.remote_path.clone()))?;

    tracing::debug!(path = %record.remote_path, url = %url, "Resolved direct link");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}
