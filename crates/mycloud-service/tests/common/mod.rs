#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use mycloud_core::config::StorageConfig;
use mycloud_core::error::AppError;
use mycloud_core::result::AppResult;
use mycloud_core::traits::storage::StorageProvider;
use mycloud_database::{FileRepository, FolderRepository, MemoryCatalog};
use mycloud_entity::file::{CreateFile, File};
use mycloud_service::{
    Actor, DownloadService, FileService, FolderService, PublicLinkService, UploadParams,
    UploadService, UploadValidator,
};
use mycloud_storage::LocalStorageProvider;

/// File repository that delegates to a [`MemoryCatalog`] and can be told
/// to fail individual operations.
#[derive(Debug, Default)]
pub struct FlakyFiles {
    pub inner: MemoryCatalog,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Make `find_by_name` miss, simulating a concurrent writer that
    /// slipped past the existence check.
    pub hide_names: AtomicBool,
}

impl FlakyFiles {
    pub fn new(inner: MemoryCatalog) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }
}

#[async_trait]
impl FileRepository for FlakyFiles {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        FileRepository::find_by_id(&self.inner, id).await
    }

    async fn find_by_public_link(&self, token: Uuid) -> AppResult<Option<File>> {
        self.inner.find_by_public_link(token).await
    }

    async fn find_by_name(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>> {
        if self.hide_names.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_by_name(owner_id, folder_id, name).await
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        self.inner.list_in_folder(owner_id, folder_id).await
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        FileRepository::list_by_owner(&self.inner, owner_id).await
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::database("insert failed"));
        }
        FileRepository::create(&self.inner, data).await
    }

    async fn rename(&self, id: Uuid, new_name: &str) -> AppResult<File> {
        self.inner.rename(id, new_name).await
    }

    async fn update_comment(&self, id: Uuid, comment: &str) -> AppResult<File> {
        self.inner.update_comment(id, comment).await
    }

    async fn set_public_link(&self, id: Uuid, token: Option<Uuid>) -> AppResult<File> {
        self.inner.set_public_link(id, token).await
    }

    async fn record_download(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<File> {
        self.inner.record_download(id, at).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::database("delete failed"));
        }
        FileRepository::delete(&self.inner, id).await
    }
}

/// Local storage that can be told to fail writes.
#[derive(Debug)]
pub struct FlakyStorage {
    pub inner: LocalStorageProvider,
    pub fail_write: AtomicBool,
}

impl FlakyStorage {
    pub fn new(inner: LocalStorageProvider) -> Self {
        Self {
            inner,
            fail_write: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        self.inner.root()
    }
}

#[async_trait]
impl StorageProvider for FlakyStorage {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(path).await
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(AppError::storage("disk full"));
        }
        self.inner.write(path, data).await
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.inner.delete(path).await
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        self.inner.rename(from, to).await
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        self.inner.exists(path).await
    }
}

/// All services wired against an in-memory catalog and a temp-dir store.
pub struct Harness {
    pub dir: TempDir,
    pub catalog: MemoryCatalog,
    pub flaky: Arc<FlakyFiles>,
    pub storage: Arc<FlakyStorage>,
    pub uploads: UploadService,
    pub files: FileService,
    pub downloads: DownloadService,
    pub links: PublicLinkService,
    pub folders: FolderService,
}

pub fn test_config() -> StorageConfig {
    StorageConfig {
        allowed_extensions: vec!["txt".into(), "pdf".into(), "jpg".into()],
        max_upload_size_bytes: 1024,
        public_base_url: "http://testserver/api".into(),
        ..StorageConfig::default()
    }
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let catalog = MemoryCatalog::new();
        let flaky = Arc::new(FlakyFiles::new(catalog.clone()));
        let storage = Arc::new(FlakyStorage::new(
            LocalStorageProvider::new(dir.path()).await.unwrap(),
        ));

        let file_repo: Arc<dyn FileRepository> = flaky.clone();
        let folder_repo: Arc<dyn FolderRepository> = Arc::new(catalog.clone());
        let config = test_config();

        let validator = UploadValidator::new(file_repo.clone(), folder_repo.clone(), config.clone());
        let uploads = UploadService::new(file_repo.clone(), storage.clone(), validator.clone());
        let files = FileService::new(
            file_repo.clone(),
            folder_repo.clone(),
            storage.clone(),
            validator,
        );
        let downloads = DownloadService::new(file_repo.clone(), storage.clone());
        let links = PublicLinkService::new(file_repo.clone(), downloads.clone());
        let folders = FolderService::new(
            folder_repo,
            file_repo,
            files.clone(),
            config.public_base_url,
        );

        Self {
            dir,
            catalog,
            flaky,
            storage,
            uploads,
            files,
            downloads,
            links,
            folders,
        }
    }

    pub async fn upload(
        &self,
        actor: &Actor,
        folder_id: Option<Uuid>,
        name: &str,
        content: &str,
    ) -> Result<File, AppError> {
        self.uploads
            .upload(
                actor,
                UploadParams {
                    folder_id,
                    file_name: name.to_string(),
                    comment: None,
                    data: Bytes::copy_from_slice(content.as_bytes()),
                },
            )
            .await
    }

    /// Every regular file under the storage root, trash included.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        walk(self.dir.path(), &mut out);
        out
    }
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
        } else {
            out.push(path);
        }
    }
}

pub fn actor() -> Actor {
    Actor::new(Uuid::new_v4())
}
