//! Folder repository trait and PostgreSQL implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use mycloud_core::error::{AppError, ErrorKind};
use mycloud_core::result::AppResult;
use mycloud_entity::folder::{CreateFolder, Folder};

use super::map_db_error;

/// Catalog operations on folder records.
///
/// Deleting a folder that still has files or subfolders fails with
/// `ErrorKind::Conflict`; cascading is the caller's job.
#[async_trait]
pub trait FolderRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// List the direct children of `parent_id` (root folders for `None`),
    /// ordered by name.
    async fn list_children(&self, owner_id: Uuid, parent_id: Option<Uuid>)
    -> AppResult<Vec<Folder>>;

    /// List every folder of an owner, ordered by name.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>>;

    /// The chain from the root folder down to (and including) `id`.
    async fn find_ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>>;

    /// Insert a new folder.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Delete an empty folder. Returns `true` if a record was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// PostgreSQL-backed folder repository.
#[derive(Debug, Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find folder", e))
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list folders", e))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE owner_id = $1 ORDER BY name ASC")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list folders by owner", e))
    }

    async fn find_ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>> {
        let chain = sqlx::query_as::<_, Folder>(
            "WITH RECURSIVE ancestors AS ( \
                SELECT f.*, 0 AS lvl FROM folders f WHERE f.id = $1 \
                UNION ALL \
                SELECT p.*, a.lvl + 1 FROM folders p INNER JOIN ancestors a ON p.id = a.parent_id \
             ) SELECT id, name, owner_id, parent_id, created_at FROM ancestors ORDER BY lvl DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to find ancestors", e))?;

        if chain.is_empty() {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }
        Ok(chain)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, name, owner_id, parent_id, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.owner_id)
        .bind(data.parent_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create folder", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let still_referenced = matches!(
                    &e,
                    sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation()
                );
                if still_referenced {
                    AppError::with_source(ErrorKind::Conflict, "Folder is not empty", e)
                } else {
                    map_db_error("Failed to delete folder", e)
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}
