//! In-memory catalog for tests and single-process tooling.
//!
//! Enforces the same constraints as the PostgreSQL schema: one name per
//! `(owner, folder)` scope, globally unique public links, and folder
//! references that must point at existing folders.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use mycloud_core::error::AppError;
use mycloud_core::result::AppResult;
use mycloud_entity::file::{CreateFile, File};
use mycloud_entity::folder::{CreateFolder, Folder};

use crate::repositories::{FileRepository, FolderRepository};

/// Key of the per-scope name index.
type NameKey = (Uuid, Option<Uuid>, String);

#[derive(Debug, Default)]
struct CatalogState {
    files: HashMap<Uuid, File>,
    folders: HashMap<Uuid, Folder>,
    /// `(owner, folder, name)` -> file id.
    names: HashMap<NameKey, Uuid>,
    /// public link token -> file id.
    links: HashMap<Uuid, Uuid>,
}

impl CatalogState {
    fn file_mut(&mut self, id: Uuid) -> AppResult<&mut File> {
        self.files
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// A referenced folder must exist and share the referencing row's owner.
    fn check_folder_ref(&self, folder_id: Option<Uuid>, owner_id: Uuid) -> AppResult<()> {
        match folder_id.map(|id| self.folders.get(&id)) {
            Some(None) => Err(AppError::not_found("Referenced folder not found")),
            Some(Some(folder)) if folder.owner_id != owner_id => {
                Err(AppError::not_found("Referenced folder not found"))
            }
            _ => Ok(()),
        }
    }
}

fn duplicate_name() -> AppError {
    AppError::conflict("A file with this name already exists in this folder")
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| key(item));
    items
}

/// Catalog kept entirely in process memory.
///
/// Every mutation runs under one write guard, so constraint checks and
/// the write they protect are atomic with respect to concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of file records currently stored.
    pub async fn file_count(&self) -> usize {
        self.state.read().await.files.len()
    }

    /// Number of folder records currently stored.
    pub async fn folder_count(&self) -> usize {
        self.state.read().await.folders.len()
    }
}

#[async_trait]
impl FileRepository for MemoryCatalog {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.state.read().await.files.get(&id).cloned())
    }

    async fn find_by_public_link(&self, token: Uuid) -> AppResult<Option<File>> {
        let state = self.state.read().await;
        Ok(state
            .links
            .get(&token)
            .and_then(|id| state.files.get(id))
            .cloned())
    }

    async fn find_by_name(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>> {
        let state = self.state.read().await;
        Ok(state
            .names
            .get(&(owner_id, folder_id, name.to_string()))
            .and_then(|id| state.files.get(id))
            .cloned())
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        let files = state
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && f.folder_id == folder_id)
            .cloned()
            .collect();
        Ok(sorted_by(files, |f: &File| f.original_name.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        let files = state
            .files
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(sorted_by(files, |f: &File| f.original_name.clone()))
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let mut state = self.state.write().await;

        state.check_folder_ref(data.folder_id, data.owner_id)?;
        if state.files.contains_key(&data.id) {
            return Err(AppError::conflict(format!("File {} already exists", data.id)));
        }
        let key = (data.owner_id, data.folder_id, data.original_name.clone());
        if state.names.contains_key(&key) {
            return Err(duplicate_name());
        }

        let file = File {
            id: data.id,
            original_name: data.original_name.clone(),
            storage_path: data.storage_path.clone(),
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            size: data.size,
            upload_date: Utc::now(),
            last_download_date: None,
            comment: data.comment.clone(),
            public_link: None,
        };

        state.names.insert(key, file.id);
        state.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn rename(&self, id: Uuid, new_name: &str) -> AppResult<File> {
        let mut state = self.state.write().await;

        let (owner_id, folder_id, old_name) = {
            let file = state.file_mut(id)?;
            (file.owner_id, file.folder_id, file.original_name.clone())
        };
        if old_name == new_name {
            return state.file_mut(id).map(|f| f.clone());
        }

        let new_key = (owner_id, folder_id, new_name.to_string());
        if state.names.contains_key(&new_key) {
            return Err(duplicate_name());
        }

        state.names.remove(&(owner_id, folder_id, old_name));
        state.names.insert(new_key, id);
        let file = state.file_mut(id)?;
        file.original_name = new_name.to_string();
        Ok(file.clone())
    }

    async fn update_comment(&self, id: Uuid, comment: &str) -> AppResult<File> {
        let mut state = self.state.write().await;
        let file = state.file_mut(id)?;
        file.comment = Some(comment.to_string());
        Ok(file.clone())
    }

    async fn set_public_link(&self, id: Uuid, token: Option<Uuid>) -> AppResult<File> {
        let mut state = self.state.write().await;

        let previous = state.file_mut(id)?.public_link;
        if let Some(token) = token {
            if state.links.get(&token).is_some_and(|holder| *holder != id) {
                return Err(AppError::conflict("Public link is already in use"));
            }
        }

        if let Some(previous) = previous {
            state.links.remove(&previous);
        }
        if let Some(token) = token {
            state.links.insert(token, id);
        }

        let file = state.file_mut(id)?;
        file.public_link = token;
        Ok(file.clone())
    }

    async fn record_download(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<File> {
        let mut state = self.state.write().await;
        let file = state.file_mut(id)?;
        file.last_download_date = Some(match file.last_download_date {
            Some(previous) if previous > at => previous,
            _ => at,
        });
        Ok(file.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(file) = state.files.remove(&id) else {
            return Ok(false);
        };
        state
            .names
            .remove(&(file.owner_id, file.folder_id, file.original_name));
        if let Some(token) = file.public_link {
            state.links.remove(&token);
        }
        Ok(true)
    }
}

#[async_trait]
impl FolderRepository for MemoryCatalog {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let folders = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.parent_id == parent_id)
            .cloned()
            .collect();
        Ok(sorted_by(folders, |f: &Folder| f.name.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let folders = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(sorted_by(folders, |f: &Folder| f.name.clone()))
    }

    async fn find_ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let folder = state
                .folders
                .get(&current)
                .ok_or_else(|| AppError::not_found(format!("Folder {current} not found")))?;
            if chain.len() > state.folders.len() {
                return Err(AppError::internal("Folder hierarchy contains a cycle"));
            }
            cursor = folder.parent_id;
            chain.push(folder.clone());
        }
        chain.reverse();
        Ok(chain)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;
        state.check_folder_ref(data.parent_id, data.owner_id)?;

        let folder = Folder {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            owner_id: data.owner_id,
            parent_id: data.parent_id,
            created_at: Utc::now(),
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.folders.contains_key(&id) {
            return Ok(false);
        }
        let referenced = state.files.values().any(|f| f.folder_id == Some(id))
            || state.folders.values().any(|f| f.parent_id == Some(id));
        if referenced {
            return Err(AppError::conflict("Folder is not empty"));
        }
        state.folders.remove(&id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use mycloud_core::error::ErrorKind;

    use super::*;

    fn new_file(owner_id: Uuid, folder_id: Option<Uuid>, name: &str) -> CreateFile {
        let id = Uuid::new_v4();
        CreateFile {
            id,
            original_name: name.to_string(),
            storage_path: format!("users/{owner_id}/{id}.txt"),
            owner_id,
            folder_id,
            size: 4,
            comment: None,
        }
    }

    async fn folder(catalog: &MemoryCatalog, owner_id: Uuid, parent_id: Option<Uuid>) -> Folder {
        FolderRepository::create(
            catalog,
            &CreateFolder {
                name: "Docs".into(),
                owner_id,
                parent_id,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_name_unique_per_scope() {
        let catalog = MemoryCatalog::new();
        let owner = Uuid::new_v4();
        let docs = folder(&catalog, owner, None).await;

        FileRepository::create(&catalog, &new_file(owner, Some(docs.id), "a.txt"))
            .await
            .unwrap();
        let err = FileRepository::create(&catalog, &new_file(owner, Some(docs.id), "a.txt"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));

        // Other scopes are independent.
        FileRepository::create(&catalog, &new_file(owner, None, "a.txt"))
            .await
            .unwrap();
        FileRepository::create(&catalog, &new_file(Uuid::new_v4(), None, "a.txt"))
            .await
            .unwrap();
        assert_eq!(catalog.file_count().await, 3);
    }

    #[tokio::test]
    async fn test_rename_updates_name_index() {
        let catalog = MemoryCatalog::new();
        let owner = Uuid::new_v4();
        let a = FileRepository::create(&catalog, &new_file(owner, None, "a.txt"))
            .await
            .unwrap();
        FileRepository::create(&catalog, &new_file(owner, None, "b.txt"))
            .await
            .unwrap();

        let err = catalog.rename(a.id, "b.txt").await.unwrap_err();
        assert!(err.is(ErrorKind::Conflict));

        let renamed = catalog.rename(a.id, "c.txt").await.unwrap();
        assert_eq!(renamed.original_name, "c.txt");
        assert!(catalog.find_by_name(owner, None, "a.txt").await.unwrap().is_none());
        assert!(catalog.find_by_name(owner, None, "c.txt").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_public_link_reissue_drops_old_token() {
        let catalog = MemoryCatalog::new();
        let owner = Uuid::new_v4();
        let file = FileRepository::create(&catalog, &new_file(owner, None, "a.txt"))
            .await
            .unwrap();

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        catalog.set_public_link(file.id, Some(first)).await.unwrap();
        catalog.set_public_link(file.id, Some(second)).await.unwrap();

        assert!(catalog.find_by_public_link(first).await.unwrap().is_none());
        assert_eq!(
            catalog.find_by_public_link(second).await.unwrap().map(|f| f.id),
            Some(file.id)
        );

        let other = FileRepository::create(&catalog, &new_file(owner, None, "b.txt"))
            .await
            .unwrap();
        let err = catalog
            .set_public_link(other.id, Some(second))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_record_download_never_moves_backwards() {
        let catalog = MemoryCatalog::new();
        let file = FileRepository::create(&catalog, &new_file(Uuid::new_v4(), None, "a.txt"))
            .await
            .unwrap();

        let later = Utc::now();
        let earlier = later - chrono::Duration::minutes(5);
        catalog.record_download(file.id, later).await.unwrap();
        let file = catalog.record_download(file.id, earlier).await.unwrap();
        assert_eq!(file.last_download_date, Some(later));
    }

    #[tokio::test]
    async fn test_folder_references_and_delete_restrict() {
        let catalog = MemoryCatalog::new();
        let owner = Uuid::new_v4();

        let err = FileRepository::create(&catalog, &new_file(owner, Some(Uuid::new_v4()), "a.txt"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        let parent = folder(&catalog, owner, None).await;
        let child = folder(&catalog, owner, Some(parent.id)).await;

        let err = FolderRepository::delete(&catalog, parent.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));

        assert!(FolderRepository::delete(&catalog, child.id).await.unwrap());
        assert!(FolderRepository::delete(&catalog, parent.id).await.unwrap());
        assert_eq!(catalog.folder_count().await, 0);
    }

    #[tokio::test]
    async fn test_folder_references_stay_within_owner() {
        let catalog = MemoryCatalog::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let docs = folder(&catalog, owner, None).await;

        let err = FileRepository::create(&catalog, &new_file(stranger, Some(docs.id), "a.txt"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        let err = FolderRepository::create(
            &catalog,
            &CreateFolder {
                name: "Inside".into(),
                owner_id: stranger,
                parent_id: Some(docs.id),
            },
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorKind::NotFound));

        assert_eq!(catalog.file_count().await, 0);
        assert_eq!(catalog.folder_count().await, 1);
    }

    #[tokio::test]
    async fn test_find_ancestors_root_first() {
        let catalog = MemoryCatalog::new();
        let owner = Uuid::new_v4();
        let a = folder(&catalog, owner, None).await;
        let b = folder(&catalog, owner, Some(a.id)).await;
        let c = folder(&catalog, owner, Some(b.id)).await;

        let chain = catalog.find_ancestors(c.id).await.unwrap();
        let ids: Vec<_> = chain.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }
}
