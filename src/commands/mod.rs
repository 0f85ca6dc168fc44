//! CLI command definitions and dispatch.

pub mod file;
pub mod folder;
pub mod link;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use mycloud_core::config::AppConfig;
use mycloud_core::error::AppError;
use mycloud_core::traits::storage::StorageProvider;
use mycloud_database::{DatabasePool, FileRepository, FolderRepository};
use mycloud_service::{
    DownloadService, FileService, FolderService, PublicLinkService, UploadService,
    UploadValidator,
};
use mycloud_storage::LocalStorageProvider;

use crate::output::OutputFormat;

/// MyCloud: personal cloud storage
#[derive(Debug, Parser)]
#[command(name = "mycloud", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply catalog migrations
    Migrate,
    /// Folder management
    Folder(folder::FolderArgs),
    /// File management
    File(file::FileArgs),
    /// Public links
    Link(link::LinkArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Folder(args) => {
                let services = Services::connect(&config).await?;
                folder::execute(args, &services, self.format).await
            }
            Commands::File(args) => {
                let services = Services::connect(&config).await?;
                file::execute(args, &services, self.format).await
            }
            Commands::Link(args) => {
                let services = Services::connect(&config).await?;
                link::execute(args, &services, self.format).await
            }
        }
    }
}

/// Every service, wired against PostgreSQL and the local content store.
#[derive(Debug)]
pub struct Services {
    pub uploads: UploadService,
    pub files: FileService,
    pub downloads: DownloadService,
    pub folders: FolderService,
    pub links: PublicLinkService,
}

impl Services {
    /// Connect to the catalog and the storage root from `config`.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let pool = DatabasePool::connect(&config.database).await?;
        let storage = LocalStorageProvider::new(&config.storage.root_path).await?;
        info!(root = %storage.root().display(), "Local storage ready");

        let file_repo: Arc<dyn FileRepository> = pool.file_repository();
        let folder_repo: Arc<dyn FolderRepository> = pool.folder_repository();
        let storage: Arc<dyn StorageProvider> = Arc::new(storage);

        let validator = UploadValidator::new(
            Arc::clone(&file_repo),
            Arc::clone(&folder_repo),
            config.storage.clone(),
        );
        let uploads = UploadService::new(
            Arc::clone(&file_repo),
            Arc::clone(&storage),
            validator.clone(),
        );
        let files = FileService::new(
            Arc::clone(&file_repo),
            Arc::clone(&folder_repo),
            Arc::clone(&storage),
            validator,
        );
        let downloads = DownloadService::new(Arc::clone(&file_repo), Arc::clone(&storage));
        let links = PublicLinkService::new(Arc::clone(&file_repo), downloads.clone());
        let folders = FolderService::new(
            folder_repo,
            file_repo,
            files.clone(),
            config.storage.public_base_url.clone(),
        );

        Ok(Self {
            uploads,
            files,
            downloads,
            folders,
            links,
        })
    }
}

/// The acting user given with `--user`.
pub fn require_actor(user: Option<uuid::Uuid>) -> Result<mycloud_service::Actor, AppError> {
    user.map(mycloud_service::Actor::new)
        .ok_or_else(|| AppError::validation("This command requires --user <uuid>").on_field("user"))
}
