use davbox_core::models::FileRecord;
use davbox_core::AppError;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

/// File metadata repository
///
/// Rows in `files` describe uploaded objects; the object bytes themselves
/// live in the remote store under `remote_path`. Deleting a row does not
/// touch the store, callers sequence that themselves.
#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a record. Re-uploading to an already-referenced remote path
    /// supersedes the existing record in place: the row keeps its id, all
    /// other columns take the new upload's values. The store object at
    /// that path was just overwritten, so one row keeps matching one
    /// object.
    #[tracing::instrument(skip(self, record), fields(db.table = "files", db.operation = "insert", db.record_id = %record.id))]
    pub async fn create(&self, record: &FileRecord) -> Result<FileRecord, AppError> {
        let row: FileRecord = sqlx::query_as::<Postgres, FileRecord>(
            r#"
            INSERT INTO files (
                id, original_filename, category, remote_path, thumbnail_path,
                created_at, size_bytes, remark, owner_token
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (remote_path) DO UPDATE SET
                original_filename = EXCLUDED.original_filename,
                category = EXCLUDED.category,
                thumbnail_path = EXCLUDED.thumbnail_path,
                created_at = EXCLUDED.created_at,
                size_bytes = EXCLUDED.size_bytes,
                remark = EXCLUDED.remark,
                owner_token = EXCLUDED.owner_token
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.original_filename)
        .bind(record.category)
        .bind(&record.remote_path)
        .bind(&record.thumbnail_path)
        .bind(record.created_at)
        .bind(record.size_bytes)
        .bind(&record.remark)
        .bind(&record.owner_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select", db.record_id = %id))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, FileRecord>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Newest first. Pagination math (page to offset) is the caller's.
    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "select"))]
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<FileRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, FileRecord>(
            "SELECT * FROM files ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "count"))]
    pub async fn count(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*)::BIGINT as count FROM files")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let rows_affected = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}
