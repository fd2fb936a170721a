use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use davbox_core::AppError;

use crate::auth;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::lifecycle::{DeleteResult, DeleteStatus, FileLifecycleService};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteBatchRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteBatchResponse {
    pub results: Vec<DeleteResult>,
}

/// Delete a batch of files.
///
/// The ownership gate runs per id; denials and missing records are
/// reported in the body, not as an HTTP failure, so one bad id never
/// hides the rest.
#[utoipa::path(
    post,
    path = "/api/v0/files/delete",
    tag = "files",
    request_body = DeleteBatchRequest,
    responses(
        (status = 200, description = "Per-record deletion outcomes", body = DeleteBatchResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, jar, body),
    fields(count = body.ids.len(), operation = "delete_files")
)]
pub async fn delete_files(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<DeleteBatchRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let caller = auth::resolve_caller(&jar, &state.config);
    let results = FileLifecycleService::delete_batch(
        body.ids,
        &caller,
        &state.db.files,
        &state.media.store,
        std::path::Path::new(&state.config.public_root),
    )
    .await;
    Ok(Json(DeleteBatchResponse { results }))
}

/// Delete a single file.
///
/// Same gate as the batch endpoint, HTTP-coded: an already-absent record
/// still responds 200 since there is nothing left to delete.
#[utoipa::path(
    delete,
    path = "/api/v0/files/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "Deletion outcome", body = DeleteResult),
        (status = 401, description = "Caller does not own this file", body = ErrorResponse),
        (status = 500, description = "Deletion failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, jar), fields(file_id = %id, operation = "delete_file"))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let caller = auth::resolve_caller(&jar, &state.config);
    let result = FileLifecycleService::delete_file(
        id,
        &caller,
        &state.db.files,
        &state.media.store,
        std::path::Path::new(&state.config.public_root),
    )
    .await;

    match result.status {
        DeleteStatus::Deleted | DeleteStatus::Missing => Ok(Json(result)),
        DeleteStatus::Denied => {
            Err(AppError::Unauthorized("Not the uploader of this file".to_string()).into())
        }
        DeleteStatus::Failed => Err(AppError::Internal(
            result
                .detail
                .unwrap_or_else(|| "Deletion failed".to_string()),
        )
        .into()),
    }
}
