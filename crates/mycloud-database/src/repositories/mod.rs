//! Catalog repository traits and their PostgreSQL implementations.

pub mod file;
pub mod folder;

pub use file::{FileRepository, PgFileRepository};
pub use folder::{FolderRepository, PgFolderRepository};

use mycloud_core::error::{AppError, ErrorKind};

/// Unique index on `(owner_id, folder scope, original_name)`.
pub(crate) const FILE_NAME_INDEX: &str = "files_owner_folder_name_key";
/// Unique index on `public_link`.
pub(crate) const FILE_LINK_INDEX: &str = "files_public_link_key";

/// Map a sqlx error to an [`AppError`], turning unique and foreign key
/// violations into `Conflict` and `NotFound`.
pub(crate) fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    let classified = match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            let message = match db_err.constraint() {
                Some(FILE_NAME_INDEX) => "A file with this name already exists in this folder",
                Some(FILE_LINK_INDEX) => "Public link is already in use",
                _ => "Unique constraint violated",
            };
            Some((ErrorKind::Conflict, message))
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Some((ErrorKind::NotFound, "Referenced folder not found"))
        }
        _ => None,
    };

    match classified {
        Some((kind, message)) => AppError::with_source(kind, message, err),
        None => AppError::with_source(ErrorKind::Database, context.to_string(), err),
    }
}
