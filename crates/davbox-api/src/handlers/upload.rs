use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;

use davbox_core::{AppError, Caller};
use davbox_processing::FileSubmission;

use crate::auth::identity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::ingest::{RepositorySink, UploadReport};
use crate::state::AppState;

/// Read the multipart form into ordered per-file submissions.
///
/// `files`, `remarks` and `covers` are parallel repeated fields joined by
/// position. Surplus remarks or covers are dropped; missing ones leave the
/// submission without that entry. Unknown fields are skipped.
async fn collect_submissions(mut multipart: Multipart) -> Result<Vec<FileSubmission>, AppError> {
    let mut files: Vec<(String, Bytes)> = Vec::new();
    let mut remarks: Vec<String> = Vec::new();
    let mut covers: Vec<Bytes> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Could not read file part: {}", e))
                })?;
                files.push((filename, data));
            }
            Some("remarks") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Could not read remark: {}", e)))?;
                remarks.push(text);
            }
            Some("covers") => {
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Could not read cover part: {}", e))
                })?;
                covers.push(data);
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files submitted".to_string()));
    }

    let mut remarks = remarks.into_iter();
    let mut covers = covers.into_iter();
    let submissions = files
        .into_iter()
        .map(|(original_filename, data)| FileSubmission {
            original_filename,
            data,
            remark: remarks.next().filter(|r| !r.trim().is_empty()),
            cover: covers.next().filter(|c| !c.is_empty()),
        })
        .collect();
    Ok(submissions)
}

/// Upload a batch of files.
///
/// Every file gets its own entry in the report; a bad file never aborts
/// its siblings. The response refreshes the uploader identity cookie so
/// ownership survives across visits.
#[utoipa::path(
    post,
    path = "/api/v0/files",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-file upload report", body = UploadReport),
        (status = 400, description = "Malformed upload request", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 502, description = "Remote store unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, jar, multipart), fields(operation = "upload_files"))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let submissions = collect_submissions(multipart).await?;
    let (jar, owner_token) = identity::ensure_identity(jar);

    let sink = RepositorySink(state.db.files.clone());
    let report = state
        .media
        .pipeline
        .run(submissions, &owner_token, &sink)
        .await?;

    let caller = Caller::anonymous(Some(owner_token));
    Ok((jar, Json(UploadReport::from_batch(report, &caller))))
}
