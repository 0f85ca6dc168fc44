//! File repository trait and PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mycloud_core::error::AppError;
use mycloud_core::result::AppResult;
use mycloud_entity::file::{CreateFile, File};

use super::map_db_error;

/// Catalog operations on file records.
///
/// Implementations must reject a second file with the same
/// `(owner_id, folder_id, original_name)` and a second file with the same
/// `public_link` with an `ErrorKind::Conflict` error, atomically with the
/// write that would have violated them.
#[async_trait]
pub trait FileRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a file by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>>;

    /// Find the file currently published under a public link token.
    async fn find_by_public_link(&self, token: Uuid) -> AppResult<Option<File>>;

    /// Find a file by name within an owner's folder scope.
    async fn find_by_name(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>>;

    /// List the files of one folder scope, ordered by name.
    async fn list_in_folder(&self, owner_id: Uuid, folder_id: Option<Uuid>)
    -> AppResult<Vec<File>>;

    /// List all files of an owner, ordered by name.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>>;

    /// Insert a new file record stamped with `upload_date = now`.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Change the name of a file.
    async fn rename(&self, id: Uuid, new_name: &str) -> AppResult<File>;

    /// Replace the comment of a file.
    async fn update_comment(&self, id: Uuid, comment: &str) -> AppResult<File>;

    /// Set or clear the public link token of a file.
    async fn set_public_link(&self, id: Uuid, token: Option<Uuid>) -> AppResult<File>;

    /// Record a download at `at`. The stored value never moves backwards.
    async fn record_download(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<File>;

    /// Delete a file record. Returns `true` if a record was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// PostgreSQL-backed file repository.
#[derive(Debug, Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn missing(id: Uuid) -> AppError {
        AppError::not_found(format!("File {id} not found"))
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find file", e))
    }

    async fn find_by_public_link(&self, token: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE public_link = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find file by public link", e))
    }

    async fn find_by_name(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND original_name = $3",
        )
        .bind(owner_id)
        .bind(folder_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find file by name", e))
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
             ORDER BY original_name ASC",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list files", e))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 ORDER BY original_name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list files by owner", e))
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (id, original_name, storage_path, owner_id, folder_id, size, \
             upload_date, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.id)
        .bind(&data.original_name)
        .bind(&data.storage_path)
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(data.size)
        .bind(Utc::now())
        .bind(&data.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create file", e))
    }

    async fn rename(&self, id: Uuid, new_name: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET original_name = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to rename file", e))?
        .ok_or_else(|| Self::missing(id))
    }

    async fn update_comment(&self, id: Uuid, comment: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>("UPDATE files SET comment = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(comment)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to update comment", e))?
            .ok_or_else(|| Self::missing(id))
    }

    async fn set_public_link(&self, id: Uuid, token: Option<Uuid>) -> AppResult<File> {
        sqlx::query_as::<_, File>("UPDATE files SET public_link = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to set public link", e))?
            .ok_or_else(|| Self::missing(id))
    }

    async fn record_download(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET last_download_date = GREATEST(COALESCE(last_download_date, $2), $2) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to record download", e))?
        .ok_or_else(|| Self::missing(id))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
