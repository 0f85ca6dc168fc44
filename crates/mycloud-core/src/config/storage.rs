//! File storage and upload policy configuration.

use serde::{Deserialize, Serialize};

/// Storage configuration: where content lives and what may be uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the local content store.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum upload size in bytes (default 100 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Extensions (without the leading dot) accepted on upload and rename.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Base URL used to build `file_url` values in listings.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl StorageConfig {
    /// Check an extension against the allow-list, ignoring ASCII case.
    pub fn is_extension_allowed(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
            allowed_extensions: default_allowed_extensions(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_root_path() -> String {
    "./data/media".to_string()
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MB
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "txt", "md", "rtf", "csv", "json", "xml", "pdf", "doc", "docx", "odt", "xls", "xlsx",
        "ods", "ppt", "pptx", "odp", "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "mp3",
        "wav", "ogg", "mp4", "avi", "mkv", "mov", "zip", "rar", "7z", "tar", "gz",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

fn default_public_base_url() -> String {
    "http://localhost:8000/api".to_string()
}
