//! File lifecycle operations: removal of the stored object, the cached
//! thumbnail, and the metadata row.
//!
//! Keeps handler logic thin; single and batch deletion share one path.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use davbox_core::{can_delete, Caller, DeleteDecision};
use davbox_db::FileRepository;
use davbox_storage::RemoteStore;

/// Per-id outcome of a deletion request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteResult {
    pub id: Uuid,
    pub status: DeleteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStatus {
    /// Metadata row removed; artifact removal was attempted first.
    Deleted,
    /// Record belongs to a different identity.
    Denied,
    /// No record with this id; nothing left to do.
    Missing,
    /// The metadata row could not be removed.
    Failed,
}

/// Service for file lifecycle operations (removing artifacts before the row).
pub struct FileLifecycleService;

impl FileLifecycleService {
    /// Delete one record together with its artifacts.
    ///
    /// Remote object and thumbnail removal are best-effort: a failure is
    /// logged and the flow continues, so an unreachable store cannot make
    /// records undeletable. The metadata delete always runs once the
    /// ownership gate allows.
    pub async fn delete_file(
        id: Uuid,
        caller: &Caller,
        files: &FileRepository,
        store: &Arc<dyn RemoteStore>,
        public_root: &Path,
    ) -> DeleteResult {
        let record = match files.get_by_id(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return DeleteResult {
                    id,
                    status: DeleteStatus::Missing,
                    detail: None,
                };
            }
            Err(e) => {
                tracing::error!(error = %e, file_id = %id, "Failed to fetch record for deletion");
                return DeleteResult {
                    id,
                    status: DeleteStatus::Failed,
                    detail: Some("Could not load the record".to_string()),
                };
            }
        };

        if can_delete(&record, caller) == DeleteDecision::NotOwner {
            return DeleteResult {
                id,
                status: DeleteStatus::Denied,
                detail: Some("Not the uploader of this file".to_string()),
            };
        }

        if let Err(e) = store.delete(&record.remote_path).await {
            tracing::error!(
                error = %e,
                path = %record.remote_path,
                "Failed to delete remote object"
            );
        }

        if let Some(rel) = &record.thumbnail_path {
            let thumb = public_root.join(rel);
            if let Err(e) = tokio::fs::remove_file(&thumb).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(error = %e, path = %thumb.display(), "Failed to delete thumbnail");
                }
            }
        }

        match files.delete_by_id(id).await {
            // Ok(false) means the row vanished concurrently; gone either way.
            Ok(_) => DeleteResult {
                id,
                status: DeleteStatus::Deleted,
                detail: None,
            },
            Err(e) => {
                tracing::error!(error = %e, file_id = %id, "Failed to delete record");
                DeleteResult {
                    id,
                    status: DeleteStatus::Failed,
                    detail: Some("Could not remove the record".to_string()),
                }
            }
        }
    }

    /// Delete a batch of records. Every id gets its own outcome; one
    /// failure never aborts the rest.
    pub async fn delete_batch(
        ids: Vec<Uuid>,
        caller: &Caller,
        files: &FileRepository,
        store: &Arc<dyn RemoteStore>,
        public_root: &Path,
    ) -> Vec<DeleteResult> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            results.push(Self::delete_file(id, caller, files, store, public_root).await);
        }
        results
    }
}
