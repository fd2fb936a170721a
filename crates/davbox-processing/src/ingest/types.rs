//! Types for the ingest pipeline.

use async_trait::async_trait;
use bytes::Bytes;

use davbox_core::models::FileRecord;
use davbox_core::AppError;

/// One file from the upload form, already correlated with its optional
/// remark and cover by position.
#[derive(Clone, Debug, Default)]
pub struct FileSubmission {
    pub original_filename: String,
    pub data: Bytes,
    pub remark: Option<String>,
    pub cover: Option<Bytes>,
}

/// Result of a derivation step that is allowed to fail without failing
/// the file it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Derivation<T> {
    Ready(T),
    Degraded(String),
}

impl<T> Derivation<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Derivation::Ready(value) => Some(value),
            Derivation::Degraded(_) => None,
        }
    }
}

/// Per-file result of a batch ingest, in submission order.
#[derive(Clone, Debug)]
pub enum UploadOutcome {
    /// Uploaded and committed. `degraded` lists derivation steps that
    /// failed softly (cover, thumbnail).
    Stored {
        submitted_filename: String,
        record: FileRecord,
        degraded: Vec<String>,
    },
    /// Never entered processing (no name, disallowed extension).
    Rejected {
        submitted_filename: String,
        reason: String,
    },
    /// Entered processing but could not be stored.
    Failed {
        submitted_filename: String,
        reason: String,
    },
}

#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchReport {
    pub fn stored_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, UploadOutcome::Stored { .. }))
            .count()
    }
}

/// Commits file metadata once the object is in the remote store. A
/// failed commit means the caller must treat the upload as not having
/// happened; the pipeline cleans up the uploaded object in that case.
#[async_trait]
pub trait MetadataSink: Send + Sync {
    async fn commit(&self, record: &FileRecord) -> Result<FileRecord, AppError>;
}
