//! File upload: validate, persist content, then create the record.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use mycloud_core::error::AppError;
use mycloud_core::traits::storage::StorageProvider;
use mycloud_database::FileRepository;
use mycloud_entity::file::{CreateFile, File};

use crate::context::Actor;
use crate::validation::{FIELD_FILE, UploadValidator, conflict_as_duplicate};

/// Upload parameters (single request with the full file body).
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Target folder ID, `None` for the owner's root scope.
    pub folder_id: Option<Uuid>,
    /// Original file name, including extension.
    pub file_name: String,
    /// Optional comment.
    pub comment: Option<String>,
    /// File content bytes.
    pub data: Bytes,
}

/// Handles file uploads.
#[derive(Clone)]
pub struct UploadService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// Content storage.
    storage: Arc<dyn StorageProvider>,
    /// Upload validation chain.
    validator: UploadValidator,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService").finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        file_repo: Arc<dyn FileRepository>,
        storage: Arc<dyn StorageProvider>,
        validator: UploadValidator,
    ) -> Self {
        Self {
            file_repo,
            storage,
            validator,
        }
    }

    /// Uploads a file for `actor`.
    ///
    /// Content is written only after every validation step has passed. If
    /// the record cannot be created the content is deleted again before
    /// the error is returned.
    pub async fn upload(&self, actor: &Actor, params: UploadParams) -> Result<File, AppError> {
        let validated = self
            .validator
            .validate_upload(actor, &params.file_name, params.data.len(), params.folder_id)
            .await?;

        let file_id = Uuid::new_v4();
        let storage_path = storage_path_for(actor.user_id, file_id, &validated.extension);
        let size = params.data.len() as i64;

        self.storage.write(&storage_path, params.data).await?;

        let record = CreateFile {
            id: file_id,
            original_name: params.file_name,
            storage_path,
            owner_id: actor.user_id,
            folder_id: params.folder_id,
            size,
            comment: params.comment,
        };

        let file = match self.file_repo.create(&record).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&record.storage_path).await {
                    warn!(
                        path = %record.storage_path,
                        error = %cleanup,
                        "Failed to remove content after record insert failed"
                    );
                }
                return Err(conflict_as_duplicate(FIELD_FILE, e));
            }
        };

        info!(
            user_id = %actor.user_id,
            file_id = %file.id,
            name = %file.original_name,
            size = file.size,
            "Upload completed"
        );

        Ok(file)
    }
}

/// Storage handle of a file's content: `users/<owner>/<file id>.<ext>`.
pub fn storage_path_for(owner_id: Uuid, file_id: Uuid, extension: &str) -> String {
    format!("users/{owner_id}/{file_id}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_layout() {
        let owner = Uuid::nil();
        let id = Uuid::from_u128(1);
        assert_eq!(
            storage_path_for(owner, id, "txt"),
            "users/00000000-0000-0000-0000-000000000000/00000000-0000-0000-0000-000000000001.txt"
        );
    }
}
