//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file stored in MyCloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The name the file was uploaded under (including extension).
    pub original_name: String,
    /// Handle of the content inside the storage provider.
    pub storage_path: String,
    /// The file owner.
    pub owner_id: Uuid,
    /// The containing folder, `None` for unfoldered files.
    pub folder_id: Option<Uuid>,
    /// Content size in bytes.
    pub size: i64,
    /// When the file was uploaded.
    pub upload_date: DateTime<Utc>,
    /// When the file was last downloaded, by its owner or via public link.
    pub last_download_date: Option<DateTime<Utc>>,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Public link token, unique across all files.
    pub public_link: Option<Uuid>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.original_name).map(|ext| ext.to_lowercase())
    }

    /// Whether the file can currently be fetched through a public link.
    pub fn is_public(&self) -> bool {
        self.public_link.is_some()
    }

    /// Whether the file lives in the given folder scope.
    pub fn is_in(&self, folder_id: Option<Uuid>) -> bool {
        self.folder_id == folder_id
    }
}

/// Return the suffix after the last `.` of a file name.
///
/// `"notes.txt"` gives `Some("txt")`, `"archive.tar.gz"` gives `Some("gz")`,
/// `"README"` gives `None` and `"trailing."` gives `Some("")`.
pub fn extension_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|pos| &name[pos + 1..])
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Pre-allocated file identifier (also used in the storage path).
    pub id: Uuid,
    /// The uploaded file name.
    pub original_name: String,
    /// Handle of the already written content.
    pub storage_path: String,
    /// The file owner.
    pub owner_id: Uuid,
    /// The target folder.
    pub folder_id: Option<Uuid>,
    /// Content size in bytes.
    pub size: i64,
    /// Initial comment.
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("test.txt"), Some("txt"));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of("trailing."), Some(""));
    }

    #[test]
    fn test_file_extension_is_lowercase() {
        let file = File {
            id: Uuid::new_v4(),
            original_name: "Report.PDF".into(),
            storage_path: "users/x/y.pdf".into(),
            owner_id: Uuid::new_v4(),
            folder_id: None,
            size: 3,
            upload_date: Utc::now(),
            last_download_date: None,
            comment: None,
            public_link: None,
        };
        assert_eq!(file.extension().as_deref(), Some("pdf"));
        assert!(!file.is_public());
        assert!(file.is_in(None));
    }
}
