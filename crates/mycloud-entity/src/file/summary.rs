//! File listing read model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::File;

/// A file as presented in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    /// File ID.
    pub id: Uuid,
    /// File name.
    pub original_name: String,
    /// Size in bytes.
    pub size: i64,
    /// Upload timestamp.
    pub upload_date: DateTime<Utc>,
    /// Last download timestamp.
    pub last_download_date: Option<DateTime<Utc>>,
    /// Comment.
    pub comment: Option<String>,
    /// Folder path plus file name, e.g. `/Docs/Reports/q1.pdf`.
    pub full_path: String,
    /// Owner download URL.
    pub file_url: String,
    /// Public link token, if published.
    pub public_link: Option<Uuid>,
}

impl FileSummary {
    /// Build a summary from a file, the path of its folder (`""` for the
    /// root scope) and the public base URL of the deployment.
    pub fn from_file(file: &File, folder_path: &str, base_url: &str) -> Self {
        Self {
            id: file.id,
            original_name: file.original_name.clone(),
            size: file.size,
            upload_date: file.upload_date,
            last_download_date: file.last_download_date,
            comment: file.comment.clone(),
            full_path: format!("{}/{}", folder_path.trim_end_matches('/'), file.original_name),
            file_url: format!("{}/files/{}/download", base_url.trim_end_matches('/'), file.id),
            public_link: file.public_link,
        }
    }
}
