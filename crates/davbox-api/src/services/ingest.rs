//! Upload ingestion glue
//!
//! Bridges the ingest pipeline to the database (`MetadataSink` over the
//! files repository) and shapes per-file outcomes into the response body.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use davbox_core::models::{FileRecord, FileSummary};
use davbox_core::{AppError, Caller};
use davbox_db::FileRepository;
use davbox_processing::{BatchReport, MetadataSink, UploadOutcome};

/// `MetadataSink` over the files repository.
pub struct RepositorySink(pub FileRepository);

#[async_trait]
impl MetadataSink for RepositorySink {
    async fn commit(&self, record: &FileRecord) -> Result<FileRecord, AppError> {
        self.0.create(record).await
    }
}

/// One per-file entry of the upload response, in submission order.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadEntry {
    /// File stored; `warnings` lists derivations that were skipped.
    Stored {
        filename: String,
        file: FileSummary,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    /// File refused before any side effect took place.
    Rejected { filename: String, reason: String },
    /// File accepted but a required step failed; nothing was kept.
    Failed { filename: String, reason: String },
}

/// Response body of the upload endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadReport {
    pub stored: usize,
    pub results: Vec<UploadEntry>,
}

impl UploadReport {
    /// Shape the pipeline's outcomes for the caller. Records become API
    /// summaries so the owner token never leaves the server.
    pub fn from_batch(report: BatchReport, caller: &Caller) -> Self {
        let stored = report.stored_count();
        let results = report
            .outcomes
            .into_iter()
            .map(|outcome| match outcome {
                UploadOutcome::Stored {
                    submitted_filename,
                    record,
                    degraded,
                } => UploadEntry::Stored {
                    filename: submitted_filename,
                    file: FileSummary::from_record(record, caller),
                    warnings: degraded,
                },
                UploadOutcome::Rejected {
                    submitted_filename,
                    reason,
                } => UploadEntry::Rejected {
                    filename: submitted_filename,
                    reason,
                },
                UploadOutcome::Failed {
                    submitted_filename,
                    reason,
                } => UploadEntry::Failed {
                    filename: submitted_filename,
                    reason,
                },
            })
            .collect();
        Self { stored, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use davbox_core::FileCategory;
    use uuid::Uuid;

    fn stored_record(owner: &str) -> FileRecord {
        FileRecord {
            id: Uuid::new_v4(),
            original_filename: "photo.png".to_string(),
            category: FileCategory::Image,
            remote_path: "2025/09/23/photo.png".to_string(),
            thumbnail_path: Some("thumbnails/2025/09/23/photo.jpg".to_string()),
            created_at: Utc::now(),
            size_bytes: 2048,
            remark: None,
            owner_token: owner.to_string(),
        }
    }

    #[test]
    fn outcomes_keep_submission_order_and_tags() {
        let report = BatchReport {
            outcomes: vec![
                UploadOutcome::Stored {
                    submitted_filename: "photo.png".to_string(),
                    record: stored_record("abc"),
                    degraded: vec![],
                },
                UploadOutcome::Rejected {
                    submitted_filename: "tool.exe".to_string(),
                    reason: "File type not allowed: tool.exe".to_string(),
                },
                UploadOutcome::Failed {
                    submitted_filename: "clip.mp4".to_string(),
                    reason: "Upload failed: PUT timed out".to_string(),
                },
            ],
        };

        let body = UploadReport::from_batch(report, &Caller::anonymous(Some("abc".to_string())));
        assert_eq!(body.stored, 1);

        let json = serde_json::to_value(&body).unwrap();
        let results = json["results"].as_array().unwrap();
        assert_eq!(results[0]["status"], "stored");
        assert_eq!(results[0]["file"]["owned"], true);
        assert_eq!(results[1]["status"], "rejected");
        assert_eq!(results[1]["filename"], "tool.exe");
        assert_eq!(results[2]["status"], "failed");
    }

    #[test]
    fn empty_warnings_are_omitted_from_the_body() {
        let report = BatchReport {
            outcomes: vec![UploadOutcome::Stored {
                submitted_filename: "photo.png".to_string(),
                record: stored_record("abc"),
                degraded: vec![],
            }],
        };
        let body = UploadReport::from_batch(report, &Caller::anonymous(None));
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["results"][0].get("warnings").is_none());
        assert_eq!(json["results"][0]["file"]["owned"], false);
    }

    #[test]
    fn degraded_steps_surface_as_warnings() {
        let report = BatchReport {
            outcomes: vec![UploadOutcome::Stored {
                submitted_filename: "clip.mp4".to_string(),
                record: stored_record("abc"),
                degraded: vec!["cover: ffmpeg produced no frame".to_string()],
            }],
        };
        let body = UploadReport::from_batch(report, &Caller::anonymous(None));
        let json = serde_json::to_value(&body).unwrap();
        let warnings = json["results"][0]["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].as_str().unwrap().starts_with("cover:"));
    }

    #[test]
    fn the_owner_token_never_appears_in_the_body() {
        let report = BatchReport {
            outcomes: vec![UploadOutcome::Stored {
                submitted_filename: "photo.png".to_string(),
                record: stored_record("secret-token"),
                degraded: vec![],
            }],
        };
        let body = UploadReport::from_batch(
            report,
            &Caller::anonymous(Some("secret-token".to_string())),
        );
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("secret-token"));
    }
}
