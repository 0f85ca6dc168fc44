//! File download: owner downloads and the shared result type.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use mycloud_core::error::AppError;
use mycloud_core::traits::storage::StorageProvider;
use mycloud_database::FileRepository;
use mycloud_entity::file::File;

use crate::access::{AccessGate, Operation};
use crate::context::Actor;

/// Result containing file metadata and content bytes for a download.
#[derive(Debug)]
pub struct DownloadResult {
    /// File metadata, with `last_download_date` already stamped.
    pub file: File,
    /// File content bytes.
    pub data: Bytes,
    /// MIME type for Content-Type header.
    pub content_type: String,
    /// Suggested filename.
    pub filename: String,
    /// Ready-made Content-Disposition header value.
    pub content_disposition: String,
}

/// Handles owner downloads.
#[derive(Clone)]
pub struct DownloadService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// Content storage.
    storage: Arc<dyn StorageProvider>,
    gate: AccessGate,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(file_repo: Arc<dyn FileRepository>, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            file_repo,
            storage,
            gate: AccessGate::new(),
        }
    }

    /// Downloads a file owned by `actor`.
    pub async fn download(&self, actor: &Actor, file_id: Uuid) -> Result<DownloadResult, AppError> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        self.gate.require(actor, file.owner_id, Operation::Download)?;

        let result = self.deliver(file).await?;
        info!(user_id = %actor.user_id, file_id = %file_id, "File downloaded");
        Ok(result)
    }

    /// Reads the content of an already authorized file and stamps the
    /// download time.
    pub(crate) async fn deliver(&self, file: File) -> Result<DownloadResult, AppError> {
        let data = self.storage.read_bytes(&file.storage_path).await?;
        let file = self.file_repo.record_download(file.id, Utc::now()).await?;

        Ok(DownloadResult {
            content_type: content_type_for(&file.original_name).to_string(),
            content_disposition: content_disposition(&file.original_name),
            filename: file.original_name.clone(),
            file,
            data,
        })
    }
}

/// `attachment; filename="<percent-encoded name>"`.
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"",
        urlencoding::encode(filename)
    )
}

/// Guess a MIME type from the file extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = mycloud_entity::file::extension_of(filename)
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "rtf" => "application/rtf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "zip" => "application/zip",
        "rar" => "application/vnd.rar",
        "7z" => "application/x-7z-compressed",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_percent_encodes() {
        assert_eq!(
            content_disposition("test.txt"),
            "attachment; filename=\"test.txt\""
        );
        assert_eq!(
            content_disposition("my report.pdf"),
            "attachment; filename=\"my%20report.pdf\""
        );
        assert_eq!(
            content_disposition("отчёт.txt"),
            "attachment; filename=\"%D0%BE%D1%82%D1%87%D1%91%D1%82.txt\""
        );
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.TXT"), "text/plain");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("blob.bin"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
