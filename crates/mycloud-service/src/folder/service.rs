//! Folder CRUD operations with owner checks.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use mycloud_core::error::{AppError, ValidationReason};
use mycloud_database::{FileRepository, FolderRepository};
use mycloud_entity::folder::{CreateFolder, Folder, FolderWithFiles};

use crate::access::{AccessGate, FOLDER_DENIED, Operation};
use crate::context::Actor;
use crate::file::FileService;

use super::tree::{ChildrenIndex, path_of};

/// What a cascading folder delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedCounts {
    /// Folders removed, including the target.
    pub folders: usize,
    /// Files removed.
    pub files: usize,
}

/// Manages folder CRUD operations.
#[derive(Clone)]
pub struct FolderService {
    /// Folder repository.
    folder_repo: Arc<dyn FolderRepository>,
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// File service, used to delete contained files.
    files: FileService,
    /// Base URL for listing links.
    public_base_url: String,
    gate: AccessGate,
}

impl std::fmt::Debug for FolderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderService").finish()
    }
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        file_repo: Arc<dyn FileRepository>,
        files: FileService,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            folder_repo,
            file_repo,
            files,
            public_base_url: public_base_url.into(),
            gate: AccessGate::new(),
        }
    }

    /// Creates a new folder, at the root or under a parent the actor owns.
    pub async fn create_folder(
        &self,
        actor: &Actor,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_field(
                "name",
                ValidationReason::EmptyName,
                "Folder name cannot be empty",
            ));
        }

        if let Some(parent_id) = parent_id {
            let parent = self
                .folder_repo
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::permission_denied(FOLDER_DENIED))?;
            self.gate
                .require_folder(actor, parent.owner_id, Operation::Upload)?;
        }

        let folder = self
            .folder_repo
            .create(&CreateFolder {
                name: name.to_string(),
                owner_id: actor.user_id,
                parent_id,
            })
            .await?;

        info!(
            user_id = %actor.user_id,
            folder_id = %folder.id,
            name = %folder.name,
            "Folder created"
        );

        Ok(folder)
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, actor: &Actor, folder_id: Uuid) -> Result<Folder, AppError> {
        self.owned(actor, folder_id, Operation::Read).await
    }

    /// Lists the direct children of `parent_id`, or the actor's root
    /// folders for `None`.
    pub async fn list_folders(
        &self,
        actor: &Actor,
        parent_id: Option<Uuid>,
    ) -> Result<Vec<Folder>, AppError> {
        if let Some(parent_id) = parent_id {
            self.owned(actor, parent_id, Operation::Read).await?;
        }
        self.folder_repo
            .list_children(actor.user_id, parent_id)
            .await
    }

    /// Absolute path of a folder, e.g. `/Docs/Reports`.
    pub async fn folder_path(&self, actor: &Actor, folder_id: Uuid) -> Result<String, AppError> {
        self.owned(actor, folder_id, Operation::Read).await?;
        path_of(self.folder_repo.as_ref(), Some(folder_id)).await
    }

    /// Builds the tree of a folder with its files and subfolders.
    pub async fn folder_tree(
        &self,
        actor: &Actor,
        folder_id: Uuid,
    ) -> Result<FolderWithFiles, AppError> {
        let folder = self.owned(actor, folder_id, Operation::Read).await?;
        let path = path_of(self.folder_repo.as_ref(), Some(folder_id)).await?;

        let folders = self.folder_repo.list_by_owner(actor.user_id).await?;
        let files = self.file_repo.list_by_owner(actor.user_id).await?;
        let index = ChildrenIndex::new(&folders, &files);

        Ok(index.build(&folder, &path, &self.public_base_url))
    }

    /// Builds the trees of all of the actor's root folders.
    pub async fn owner_tree(&self, actor: &Actor) -> Result<Vec<FolderWithFiles>, AppError> {
        let folders = self.folder_repo.list_by_owner(actor.user_id).await?;
        let files = self.file_repo.list_by_owner(actor.user_id).await?;
        let index = ChildrenIndex::new(&folders, &files);

        Ok(index
            .child_folders(None)
            .iter()
            .map(|root| index.build(root, &format!("/{}", root.name), &self.public_base_url))
            .collect())
    }

    /// Deletes a folder together with every file and subfolder in it.
    ///
    /// Files go first, each through the same delete as a single file
    /// delete; folders follow bottom-up. A failure stops the cascade and
    /// leaves everything not yet removed intact.
    pub async fn delete_folder(
        &self,
        actor: &Actor,
        folder_id: Uuid,
    ) -> Result<DeletedCounts, AppError> {
        self.owned(actor, folder_id, Operation::Delete).await?;

        let folders = self.folder_repo.list_by_owner(actor.user_id).await?;
        let files = self.file_repo.list_by_owner(actor.user_id).await?;
        let index = ChildrenIndex::new(&folders, &files);

        let mut counts = DeletedCounts::default();
        for id in index.post_order(folder_id) {
            for file in index.files_in(Some(id)) {
                self.files.remove(file).await?;
                counts.files += 1;
            }
            if self.folder_repo.delete(id).await? {
                counts.folders += 1;
            }
        }

        info!(
            user_id = %actor.user_id,
            folder_id = %folder_id,
            folders = counts.folders,
            files = counts.files,
            "Folder deleted"
        );

        Ok(counts)
    }

    async fn owned(
        &self,
        actor: &Actor,
        folder_id: Uuid,
        operation: Operation,
    ) -> Result<Folder, AppError> {
        let folder = self
            .folder_repo
            .find_by_id(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        self.gate
            .require_folder(actor, folder.owner_id, operation)?;
        Ok(folder)
    }
}
