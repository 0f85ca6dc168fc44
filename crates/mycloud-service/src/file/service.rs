//! Core file operations: listing, lookup, rename, comment and delete.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use mycloud_core::error::{AppError, ErrorKind};
use mycloud_core::traits::storage::StorageProvider;
use mycloud_database::{FileRepository, FolderRepository};
use mycloud_entity::file::{File, FileSummary};

use crate::access::{AccessGate, Operation};
use crate::context::Actor;
use crate::folder::tree::path_of;
use crate::validation::{FIELD_NEW_NAME, UploadValidator, conflict_as_duplicate};

/// Directory that holds content while its record is being deleted.
const TRASH_DIR: &str = ".trash";

/// Handles file CRUD with owner checks.
#[derive(Clone)]
pub struct FileService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// Folder repository (for path lookups).
    folder_repo: Arc<dyn FolderRepository>,
    /// Content storage.
    storage: Arc<dyn StorageProvider>,
    /// Rename validation.
    validator: UploadValidator,
    gate: AccessGate,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService").finish()
    }
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        file_repo: Arc<dyn FileRepository>,
        folder_repo: Arc<dyn FolderRepository>,
        storage: Arc<dyn StorageProvider>,
        validator: UploadValidator,
    ) -> Self {
        Self {
            file_repo,
            folder_repo,
            storage,
            validator,
            gate: AccessGate::new(),
        }
    }

    /// Lists the actor's files in one folder scope (`None` for root),
    /// ordered by name.
    pub async fn list_files(
        &self,
        actor: &Actor,
        folder_id: Option<Uuid>,
    ) -> Result<Vec<FileSummary>, AppError> {
        self.validator.check_folder(actor, folder_id).await?;

        let folder_path = path_of(self.folder_repo.as_ref(), folder_id).await?;
        let base_url = &self.validator.config().public_base_url;

        let files = self
            .file_repo
            .list_in_folder(actor.user_id, folder_id)
            .await?;

        Ok(files
            .iter()
            .map(|file| FileSummary::from_file(file, &folder_path, base_url))
            .collect())
    }

    /// Gets a file by ID.
    pub async fn get_file(&self, actor: &Actor, file_id: Uuid) -> Result<File, AppError> {
        let file = self.find(file_id).await?;
        self.gate.require(actor, file.owner_id, Operation::Read)?;
        Ok(file)
    }

    /// Renames a file. Only the name changes; content stays where it is.
    pub async fn rename_file(
        &self,
        actor: &Actor,
        file_id: Uuid,
        new_name: &str,
    ) -> Result<File, AppError> {
        let file = self.find(file_id).await?;
        self.gate.require(actor, file.owner_id, Operation::Modify)?;

        self.validator
            .validate_rename(file.owner_id, file.folder_id, file.id, new_name)
            .await?;

        let renamed = self
            .file_repo
            .rename(file.id, new_name)
            .await
            .map_err(|e| conflict_as_duplicate(FIELD_NEW_NAME, e))?;

        info!(
            user_id = %actor.user_id,
            file_id = %file.id,
            old_name = %file.original_name,
            new_name = %renamed.original_name,
            "File renamed"
        );

        Ok(renamed)
    }

    /// Replaces the comment of a file. An empty comment is allowed.
    pub async fn update_comment(
        &self,
        actor: &Actor,
        file_id: Uuid,
        comment: &str,
    ) -> Result<File, AppError> {
        let file = self.find(file_id).await?;
        self.gate.require(actor, file.owner_id, Operation::Modify)?;

        let updated = self.file_repo.update_comment(file.id, comment).await?;

        info!(user_id = %actor.user_id, file_id = %file.id, "File comment updated");
        Ok(updated)
    }

    /// Deletes a file's content and record.
    pub async fn delete_file(&self, actor: &Actor, file_id: Uuid) -> Result<(), AppError> {
        let file = self.find(file_id).await?;
        self.gate.require(actor, file.owner_id, Operation::Delete)?;

        self.remove(&file).await?;

        info!(
            user_id = %actor.user_id,
            file_id = %file.id,
            name = %file.original_name,
            "File deleted"
        );
        Ok(())
    }

    /// Removes content and record of an already authorized file.
    ///
    /// Content is parked in the trash first. If the record delete fails it
    /// is moved back, so neither an orphaned record nor orphaned content
    /// survives a failure.
    pub(crate) async fn remove(&self, file: &File) -> Result<(), AppError> {
        let trash_path = format!("{TRASH_DIR}/{}", file.storage_path);

        let parked = match self.storage.rename(&file.storage_path, &trash_path).await {
            Ok(()) => true,
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(
                    file_id = %file.id,
                    path = %file.storage_path,
                    "Content already missing, deleting record only"
                );
                false
            }
            Err(e) => return Err(e),
        };

        match self.file_repo.delete(file.id).await {
            Ok(true) => {}
            Ok(false) => {
                self.discard(parked, &trash_path).await;
                return Err(AppError::not_found("File not found"));
            }
            Err(e) => {
                if parked {
                    if let Err(restore) =
                        self.storage.rename(&trash_path, &file.storage_path).await
                    {
                        warn!(
                            file_id = %file.id,
                            error = %restore,
                            "Failed to restore content after record delete failed"
                        );
                    }
                }
                return Err(e);
            }
        }

        self.discard(parked, &trash_path).await;
        Ok(())
    }

    async fn discard(&self, parked: bool, trash_path: &str) {
        if !parked {
            return;
        }
        if let Err(e) = self.storage.delete(trash_path).await {
            warn!(path = %trash_path, error = %e, "Failed to empty trash");
        }
    }

    async fn find(&self, file_id: Uuid) -> Result<File, AppError> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }
}
