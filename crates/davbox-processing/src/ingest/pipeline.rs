//! Ingest pipeline
//!
//! Sequences one upload batch: directory provisioning once per batch,
//! then per file sanitize, classify, derive, upload, commit. A file's
//! failure is reported in its own outcome and never aborts siblings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, Utc};
use uuid::Uuid;

use davbox_core::models::FileRecord;
use davbox_core::{sanitize_filename, AppError, CategoryRules, Config, FileCategory};
use davbox_storage::RemoteStore;

use crate::cover::derive_cover;
use crate::ingest::types::{
    BatchReport, Derivation, FileSubmission, MetadataSink, UploadOutcome,
};
use crate::thumbnail::{generate_thumbnail, StoredThumbnail};

/// Pipeline knobs lifted out of `Config` so tests can construct the
/// pipeline without a full application config.
#[derive(Clone, Debug)]
pub struct IngestSettings {
    pub thumbnail_root: PathBuf,
    pub thumbnail_max_px: u32,
    pub ffmpeg_path: String,
}

impl IngestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thumbnail_root: config.thumbnail_dir(),
            thumbnail_max_px: config.thumbnail_max_px,
            ffmpeg_path: config.ffmpeg_path.clone(),
        }
    }
}

#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn RemoteStore>,
    rules: CategoryRules,
    settings: IngestSettings,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn RemoteStore>, rules: CategoryRules, settings: IngestSettings) -> Self {
        Self {
            store,
            rules,
            settings,
        }
    }

    /// Process one upload batch for the client identified by `owner_token`.
    ///
    /// The date directory chain is provisioned exactly once, before any
    /// file; if that fails no file is processed. Everything after that is
    /// per-file and isolated.
    pub async fn run(
        &self,
        submissions: Vec<FileSubmission>,
        owner_token: &str,
        sink: &dyn MetadataSink,
    ) -> Result<BatchReport, AppError> {
        let date_dir = Local::now().format("%Y/%m/%d").to_string();
        self.store
            .ensure_dir_chain(&date_dir)
            .await
            .map_err(|e| AppError::RemoteStore(e.to_string()))?;

        let scratch = tempfile::tempdir()?;
        let mut report = BatchReport::default();

        for (index, submission) in submissions.into_iter().enumerate() {
            let file_dir = scratch.path().join(index.to_string());
            let outcome = self
                .process_one(submission, &date_dir, &file_dir, owner_token, sink)
                .await;
            match &outcome {
                UploadOutcome::Failed {
                    submitted_filename,
                    reason,
                } => {
                    tracing::error!(filename = %submitted_filename, reason = %reason, "Upload failed");
                }
                UploadOutcome::Rejected {
                    submitted_filename,
                    reason,
                } => {
                    tracing::info!(filename = %submitted_filename, reason = %reason, "Upload rejected");
                }
                UploadOutcome::Stored { record, .. } => {
                    tracing::info!(
                        path = %record.remote_path,
                        size_bytes = record.size_bytes,
                        category = %record.category,
                        "Upload stored"
                    );
                }
            }
            report.outcomes.push(outcome);
            // Scratch is bounded per file, not per batch.
            let _ = tokio::fs::remove_dir_all(&file_dir).await;
        }

        tracing::info!(
            total = report.outcomes.len(),
            stored = report.stored_count(),
            "Upload batch processed"
        );
        Ok(report)
    }

    async fn process_one(
        &self,
        submission: FileSubmission,
        date_dir: &str,
        file_dir: &Path,
        owner_token: &str,
        sink: &dyn MetadataSink,
    ) -> UploadOutcome {
        let submitted = submission.original_filename.clone();
        if submitted.trim().is_empty() {
            return UploadOutcome::Rejected {
                submitted_filename: submitted,
                reason: "File has no name".to_string(),
            };
        }

        let cleaned = sanitize_filename(&submitted);
        let category = match self.rules.classify(&cleaned) {
            Ok(category) => category,
            Err(e) => {
                return UploadOutcome::Rejected {
                    submitted_filename: submitted,
                    reason: e.to_string(),
                }
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(file_dir).await {
            return UploadOutcome::Failed {
                submitted_filename: submitted,
                reason: format!("Scratch directory unavailable: {}", e),
            };
        }
        let scratch_path = file_dir.join(&cleaned);
        if let Err(e) = tokio::fs::write(&scratch_path, &submission.data).await {
            return UploadOutcome::Failed {
                submitted_filename: submitted,
                reason: format!("Scratch write failed: {}", e),
            };
        }
        let size_bytes = submission.data.len() as i64;

        let mut degraded = Vec::new();
        let mut thumbnail: Option<StoredThumbnail> = None;
        if category.wants_thumbnail() {
            let still = match category {
                FileCategory::Image => Some(scratch_path.clone()),
                FileCategory::Video => {
                    match derive_cover(
                        &scratch_path,
                        submission.cover.as_deref(),
                        file_dir,
                        &self.settings.ffmpeg_path,
                    )
                    .await
                    {
                        Derivation::Ready(path) => Some(path),
                        Derivation::Degraded(reason) => {
                            tracing::warn!(filename = %cleaned, reason = %reason, "Cover derivation degraded");
                            degraded.push(format!("cover: {}", reason));
                            None
                        }
                    }
                }
                _ => None,
            };

            if let Some(still_path) = still {
                match generate_thumbnail(
                    &still_path,
                    &cleaned,
                    date_dir,
                    &self.settings.thumbnail_root,
                    self.settings.thumbnail_max_px,
                ) {
                    Derivation::Ready(stored) => thumbnail = Some(stored),
                    Derivation::Degraded(reason) => {
                        tracing::warn!(filename = %cleaned, reason = %reason, "Thumbnail derivation degraded");
                        degraded.push(format!("thumbnail: {}", reason));
                    }
                }
            }
        }

        let remote_path = format!("{}/{}", date_dir, cleaned);
        if let Err(e) = self.store.upload(&scratch_path, &remote_path).await {
            self.discard_thumbnail(thumbnail.as_ref()).await;
            return UploadOutcome::Failed {
                submitted_filename: submitted,
                reason: format!("Upload failed: {}", e),
            };
        }

        let record = FileRecord {
            id: Uuid::new_v4(),
            original_filename: submitted.clone(),
            category,
            remote_path: remote_path.clone(),
            thumbnail_path: thumbnail.as_ref().map(|t| t.relative_path.clone()),
            created_at: Utc::now(),
            size_bytes,
            remark: submission.remark.clone().filter(|r| !r.trim().is_empty()),
            owner_token: owner_token.to_string(),
        };

        match sink.commit(&record).await {
            Ok(stored) => UploadOutcome::Stored {
                submitted_filename: submitted,
                record: stored,
                degraded,
            },
            Err(e) => {
                // The object is already uploaded; an uncommitted one must
                // not survive.
                if let Err(cleanup) = self.store.delete(&remote_path).await {
                    tracing::error!(
                        path = %remote_path,
                        error = %cleanup,
                        "Uploaded object could not be removed after failed commit"
                    );
                }
                self.discard_thumbnail(thumbnail.as_ref()).await;
                UploadOutcome::Failed {
                    submitted_filename: submitted,
                    reason: format!("Metadata commit failed: {}", e),
                }
            }
        }
    }

    async fn discard_thumbnail(&self, thumbnail: Option<&StoredThumbnail>) {
        if let Some(thumbnail) = thumbnail {
            if let Err(e) = tokio::fs::remove_file(&thumbnail.absolute_path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %thumbnail.absolute_path.display(),
                        error = %e,
                        "Thumbnail cleanup failed"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use davbox_storage::LocalStore;
    use std::io::Cursor;
    use std::sync::Mutex;

    struct MemorySink {
        records: Mutex<Vec<FileRecord>>,
        refuse_filename: Option<String>,
    }

    impl MemorySink {
        fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                refuse_filename: None,
            }
        }

        fn refusing(filename: &str) -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                refuse_filename: Some(filename.to_string()),
            }
        }

        fn stored(&self) -> Vec<FileRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetadataSink for MemorySink {
        async fn commit(&self, record: &FileRecord) -> Result<FileRecord, AppError> {
            if self.refuse_filename.as_deref() == Some(record.original_filename.as_str()) {
                return Err(AppError::Internal("commit refused".to_string()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(record.clone())
        }
    }

    fn default_rules() -> CategoryRules {
        let to_owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let image = ["png", "jpg", "jpeg", "gif"];
        let video = ["mp4", "mov", "avi"];
        let archive = ["zip", "7z", "rar", "tar", "gz"];
        let allowed = image
            .iter()
            .chain(video.iter())
            .chain(archive.iter())
            .map(|s| s.to_string())
            .collect();
        CategoryRules::new(allowed, to_owned(&image), to_owned(&video), to_owned(&archive))
    }

    fn png_bytes(width: u32, height: u32) -> Bytes {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([50, 90, 30, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        Bytes::from(buf)
    }

    fn submission(name: &str, data: Bytes) -> FileSubmission {
        FileSubmission {
            original_filename: name.to_string(),
            data,
            remark: None,
            cover: None,
        }
    }

    struct Fixture {
        pipeline: IngestPipeline,
        _store_dir: tempfile::TempDir,
        public_dir: tempfile::TempDir,
        store: Arc<LocalStore>,
    }

    async fn fixture() -> Fixture {
        let store_dir = tempfile::tempdir().unwrap();
        let public_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            LocalStore::new(store_dir.path(), "http://localhost:5678/store".to_string())
                .await
                .unwrap(),
        );
        let settings = IngestSettings {
            thumbnail_root: public_dir.path().join("thumbnails"),
            thumbnail_max_px: 200,
            ffmpeg_path: "/nonexistent/ffmpeg".to_string(),
        };
        let pipeline = IngestPipeline::new(store.clone(), default_rules(), settings);
        Fixture {
            pipeline,
            _store_dir: store_dir,
            public_dir,
            store,
        }
    }

    fn date_dir_today() -> String {
        Local::now().format("%Y/%m/%d").to_string()
    }

    #[tokio::test]
    async fn a_rejected_file_does_not_abort_its_siblings() {
        let fx = fixture().await;
        let sink = MemorySink::new();

        let report = fx
            .pipeline
            .run(
                vec![
                    submission("first.png", png_bytes(400, 300)),
                    submission("malware.exe", Bytes::from_static(b"nope")),
                    submission("second.png", png_bytes(300, 400)),
                ],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert!(matches!(report.outcomes[0], UploadOutcome::Stored { .. }));
        assert!(matches!(report.outcomes[1], UploadOutcome::Rejected { .. }));
        assert!(matches!(report.outcomes[2], UploadOutcome::Stored { .. }));
        assert_eq!(report.stored_count(), 2);
        assert_eq!(sink.stored().len(), 2);

        let date_dir = date_dir_today();
        assert!(fx
            .store
            .exists(&format!("{}/first.png", date_dir))
            .await
            .unwrap());
        assert!(fx
            .store
            .exists(&format!("{}/second.png", date_dir))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn stored_images_get_thumbnails_below_the_public_root() {
        let fx = fixture().await;
        let sink = MemorySink::new();

        let report = fx
            .pipeline
            .run(
                vec![submission("photo.png", png_bytes(800, 600))],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        let record = match &report.outcomes[0] {
            UploadOutcome::Stored { record, .. } => record.clone(),
            other => panic!("expected stored outcome, got {:?}", other),
        };
        let thumbnail_path = record.thumbnail_path.unwrap();
        assert_eq!(
            thumbnail_path,
            format!("thumbnails/{}/photo.jpg", date_dir_today())
        );
        // Relative to the public root, and present on disk.
        assert!(fx
            .public_dir
            .path()
            .join(&thumbnail_path)
            .exists());
    }

    #[tokio::test]
    async fn empty_filenames_are_rejected() {
        let fx = fixture().await;
        let sink = MemorySink::new();

        let report = fx
            .pipeline
            .run(
                vec![submission("", png_bytes(10, 10))],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        assert!(matches!(report.outcomes[0], UploadOutcome::Rejected { .. }));
        assert!(sink.stored().is_empty());
    }

    #[tokio::test]
    async fn archives_are_stored_without_thumbnails() {
        let fx = fixture().await;
        let sink = MemorySink::new();

        let report = fx
            .pipeline
            .run(
                vec![FileSubmission {
                    original_filename: "backup.zip".to_string(),
                    data: Bytes::from_static(b"PK\x03\x04..."),
                    remark: Some("password: hunter2".to_string()),
                    cover: None,
                }],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        let record = match &report.outcomes[0] {
            UploadOutcome::Stored { record, .. } => record.clone(),
            other => panic!("expected stored outcome, got {:?}", other),
        };
        assert_eq!(record.category, FileCategory::Archive);
        assert_eq!(record.thumbnail_path, None);
        assert_eq!(record.remark.as_deref(), Some("password: hunter2"));
        assert_eq!(record.owner_token, "owner-token");
    }

    #[tokio::test]
    async fn a_user_cover_stands_in_for_frame_extraction() {
        // ffmpeg is pointed at a nonexistent binary, so a thumbnail can
        // only come from the user cover path.
        let fx = fixture().await;
        let sink = MemorySink::new();

        let report = fx
            .pipeline
            .run(
                vec![FileSubmission {
                    original_filename: "clip.mp4".to_string(),
                    data: Bytes::from_static(b"not really a video"),
                    remark: None,
                    cover: Some(png_bytes(640, 480)),
                }],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        let record = match &report.outcomes[0] {
            UploadOutcome::Stored { record, .. } => record.clone(),
            other => panic!("expected stored outcome, got {:?}", other),
        };
        assert_eq!(
            record.thumbnail_path.as_deref(),
            Some(format!("thumbnails/{}/clip.jpg", date_dir_today()).as_str())
        );
    }

    #[tokio::test]
    async fn a_video_without_cover_degrades_but_still_stores() {
        let fx = fixture().await;
        let sink = MemorySink::new();

        let report = fx
            .pipeline
            .run(
                vec![submission("clip.mp4", Bytes::from_static(b"not a video"))],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        match &report.outcomes[0] {
            UploadOutcome::Stored {
                record, degraded, ..
            } => {
                assert_eq!(record.thumbnail_path, None);
                assert!(degraded.iter().any(|d| d.starts_with("cover:")));
            }
            other => panic!("expected stored outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn a_failed_commit_removes_the_uploaded_object_and_thumbnail() {
        let fx = fixture().await;
        let sink = MemorySink::refusing("doomed.png");

        let report = fx
            .pipeline
            .run(
                vec![submission("doomed.png", png_bytes(500, 500))],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        assert!(matches!(report.outcomes[0], UploadOutcome::Failed { .. }));
        assert!(sink.stored().is_empty());

        let date_dir = date_dir_today();
        assert!(!fx
            .store
            .exists(&format!("{}/doomed.png", date_dir))
            .await
            .unwrap());
        assert!(!fx
            .public_dir
            .path()
            .join(format!("thumbnails/{}/doomed.jpg", date_dir))
            .exists());
    }

    #[tokio::test]
    async fn filenames_are_sanitized_before_building_the_remote_path() {
        let fx = fixture().await;
        let sink = MemorySink::new();

        let report = fx
            .pipeline
            .run(
                vec![submission("../../escape?.png", png_bytes(20, 20))],
                "owner-token",
                &sink,
            )
            .await
            .unwrap();

        let record = match &report.outcomes[0] {
            UploadOutcome::Stored { record, .. } => record.clone(),
            other => panic!("expected stored outcome, got {:?}", other),
        };
        // Raw name is kept for display, the remote path gets the cleaned one.
        assert_eq!(record.original_filename, "../../escape?.png");
        assert_eq!(
            record.remote_path,
            format!("{}/.._.._escape_.png", date_dir_today())
        );
        assert!(fx.store.exists(&record.remote_path).await.unwrap());
    }
}
