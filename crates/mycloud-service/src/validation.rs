//! Ordered validation chain for uploads and renames.
//!
//! Each check either passes or returns the first failure; nothing is
//! written to storage or the catalog while the chain runs.

use std::sync::Arc;

use uuid::Uuid;

use mycloud_core::config::StorageConfig;
use mycloud_core::error::{AppError, ValidationReason};
use mycloud_core::result::AppResult;
use mycloud_database::{FileRepository, FolderRepository};
use mycloud_entity::file::extension_of;
use mycloud_entity::folder::Folder;

use crate::access::{AccessGate, FOLDER_DENIED, Operation};
use crate::context::Actor;

/// Maximum length of a file name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Field name used for upload errors.
pub const FIELD_FILE: &str = "file";
/// Field name used for rename errors.
pub const FIELD_NEW_NAME: &str = "new_name";

/// What an upload looks like once the chain has accepted it.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    /// Lowercased extension, used for the storage handle.
    pub extension: String,
    /// The target folder, if any.
    pub folder: Option<Folder>,
}

/// Runs the upload and rename checks against config and catalog state.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    file_repo: Arc<dyn FileRepository>,
    folder_repo: Arc<dyn FolderRepository>,
    gate: AccessGate,
    config: StorageConfig,
}

impl UploadValidator {
    /// Creates a validator.
    pub fn new(
        file_repo: Arc<dyn FileRepository>,
        folder_repo: Arc<dyn FolderRepository>,
        config: StorageConfig,
    ) -> Self {
        Self {
            file_repo,
            folder_repo,
            gate: AccessGate::new(),
            config,
        }
    }

    /// Storage configuration in use.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Full upload chain: name, size, extension, folder ownership,
    /// uniqueness.
    pub async fn validate_upload(
        &self,
        actor: &Actor,
        file_name: &str,
        size: usize,
        folder_id: Option<Uuid>,
    ) -> AppResult<ValidatedUpload> {
        check_name(FIELD_FILE, file_name)?;
        self.check_size(size)?;
        let extension = self.check_extension(FIELD_FILE, file_name)?;
        let folder = self.check_folder(actor, folder_id).await?;
        self.check_unique(FIELD_FILE, actor.user_id, folder_id, file_name, None)
            .await?;

        Ok(ValidatedUpload { extension, folder })
    }

    /// Rename chain for an already authorized file: name, extension,
    /// uniqueness among siblings excluding the file itself.
    pub async fn validate_rename(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        file_id: Uuid,
        new_name: &str,
    ) -> AppResult<()> {
        check_name(FIELD_NEW_NAME, new_name)?;
        self.check_extension(FIELD_NEW_NAME, new_name)?;
        self.check_unique(FIELD_NEW_NAME, owner_id, folder_id, new_name, Some(file_id))
            .await
    }

    /// Reject content larger than the configured maximum.
    pub fn check_size(&self, size: usize) -> AppResult<()> {
        let max = self.config.max_upload_size_bytes;
        if size as u64 > max {
            return Err(AppError::invalid_field(
                FIELD_FILE,
                ValidationReason::TooLarge,
                format!("File exceeds maximum upload size of {max} bytes"),
            ));
        }
        Ok(())
    }

    /// Check the suffix after the last `.` against the allow-list and
    /// return it lowercased.
    pub fn check_extension(&self, field: &str, name: &str) -> AppResult<String> {
        match extension_of(name) {
            Some(ext) if self.config.is_extension_allowed(ext) => Ok(ext.to_lowercase()),
            Some(ext) => Err(AppError::invalid_field(
                field,
                ValidationReason::InvalidExtension,
                format!("Invalid file extension: .{ext}"),
            )),
            None => Err(AppError::invalid_field(
                field,
                ValidationReason::InvalidExtension,
                "File has no extension",
            )),
        }
    }

    /// The target folder must exist and belong to the actor.
    ///
    /// A missing folder is reported the same way as a foreign one so that
    /// folder ids of other users cannot be probed.
    pub async fn check_folder(
        &self,
        actor: &Actor,
        folder_id: Option<Uuid>,
    ) -> AppResult<Option<Folder>> {
        let Some(folder_id) = folder_id else {
            return Ok(None);
        };
        match self.folder_repo.find_by_id(folder_id).await? {
            Some(folder) => {
                self.gate
                    .require_folder(actor, folder.owner_id, Operation::Upload)?;
                Ok(Some(folder))
            }
            None => Err(AppError::permission_denied(FOLDER_DENIED)),
        }
    }

    /// No other file of the owner in the same folder may carry `name`.
    pub async fn check_unique(
        &self,
        field: &str,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        let existing = self.file_repo.find_by_name(owner_id, folder_id, name).await?;
        match existing {
            Some(file) if Some(file.id) != exclude => Err(duplicate_name(field)),
            _ => Ok(()),
        }
    }
}

/// Reject empty, overlong and path-like names.
///
/// A name is a single path component: it may not contain `/`, `\` or
/// control characters (NUL included), and may not be `.` or `..`.
pub fn check_name(field: &str, name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid_field(
            field,
            ValidationReason::EmptyName,
            "File name cannot be empty",
        ));
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(AppError::invalid_field(
            field,
            ValidationReason::InvalidName,
            "File name cannot contain path separators or control characters",
        ));
    }
    if name == "." || name == ".." {
        return Err(AppError::invalid_field(
            field,
            ValidationReason::InvalidName,
            format!("File name cannot be '{name}'"),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_field(
            field,
            ValidationReason::NameTooLong,
            format!("File name cannot exceed {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// The error reported for a name collision on `field`.
pub fn duplicate_name(field: &str) -> AppError {
    AppError::invalid_field(
        field,
        ValidationReason::DuplicateName,
        "A file with this name already exists in this folder",
    )
}

/// Re-tag a catalog uniqueness conflict as a duplicate name on `field`.
///
/// Covers the race where two writers pass the existence check and the
/// unique index rejects the second insert.
pub fn conflict_as_duplicate(field: &str, err: AppError) -> AppError {
    if err.is(mycloud_core::error::ErrorKind::Conflict) {
        duplicate_name(field)
    } else {
        err
    }
}
