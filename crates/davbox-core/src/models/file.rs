use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::category::FileCategory;
use crate::ownership::Caller;

/// Persisted file record. Created exactly once after the remote upload and
/// thumbnail steps, never updated, destroyed exactly once via deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    /// User-supplied name, unsanitized, display only.
    pub original_filename: String,
    pub category: FileCategory,
    /// Path of the original payload in the remote store. Unique; the
    /// authoritative reference to the stored object.
    pub remote_path: String,
    /// Path of the cached thumbnail relative to the public static root.
    /// Present for image/video when derivation succeeded.
    pub thumbnail_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub size_bytes: i64,
    /// Free text shown next to the file (archive passwords and the like).
    pub remark: Option<String>,
    /// Identity token of the uploader. Never empty, never exposed through
    /// the API; used exclusively by the deletion gate.
    pub owner_token: String,
}

/// API-facing view of a file record. Carries everything the record does
/// except the owner token, which is replaced by an `owned` flag computed
/// against the caller's own token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileSummary {
    pub id: Uuid,
    pub original_filename: String,
    pub category: FileCategory,
    pub remote_path: String,
    pub thumbnail_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub size_bytes: i64,
    pub remark: Option<String>,
    /// Whether the requesting client uploaded this file.
    pub owned: bool,
}

impl FileSummary {
    pub fn from_record(record: FileRecord, caller: &Caller) -> Self {
        let owned = caller.owns(&record);
        Self {
            id: record.id,
            original_filename: record.original_filename,
            category: record.category,
            remote_path: record.remote_path,
            thumbnail_path: record.thumbnail_path,
            created_at: record.created_at,
            size_bytes: record.size_bytes,
            remark: record.remark,
            owned,
        }
    }
}
