//! File management CLI commands.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use mycloud_core::error::{AppError, ErrorKind};
use mycloud_entity::file::{File, FileSummary};
use mycloud_service::{DownloadResult, UploadParams};

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// Acting user ID
    #[arg(short, long, global = true)]
    pub user: Option<Uuid>,

    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Upload a local file
    Upload {
        /// Local path to read
        path: PathBuf,
        /// Target folder ID (omit for root)
        #[arg(long)]
        folder: Option<Uuid>,
        /// Name to store the file under (defaults to the local file name)
        #[arg(short, long)]
        name: Option<String>,
        /// Comment
        #[arg(long)]
        comment: Option<String>,
    },
    /// List files in a folder (omit for root)
    List {
        /// Folder ID
        #[arg(long)]
        folder: Option<Uuid>,
    },
    /// Rename a file
    Rename {
        /// File ID
        #[arg(long)]
        id: Uuid,
        /// New name, including extension
        new_name: String,
    },
    /// Replace the comment of a file
    Comment {
        /// File ID
        #[arg(long)]
        id: Uuid,
        /// New comment (may be empty)
        comment: String,
    },
    /// Delete a file
    Delete {
        /// File ID
        #[arg(long)]
        id: Uuid,
    },
    /// Download a file to a local path
    Download {
        /// File ID
        #[arg(long)]
        id: Uuid,
        /// Output path (defaults to the stored file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// File display row
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct FileRow {
    /// File ID
    id: String,
    /// Name
    name: String,
    /// Size in bytes
    size: i64,
    /// Uploaded at
    uploaded: String,
    /// Last downloaded at
    last_download: String,
    /// Comment
    comment: String,
    /// Public link
    public_link: String,
}

impl From<&File> for FileRow {
    fn from(f: &File) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.original_name.clone(),
            size: f.size,
            uploaded: f.upload_date.format("%Y-%m-%d %H:%M").to_string(),
            last_download: f
                .last_download_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            comment: f.comment.clone().unwrap_or_default(),
            public_link: f.public_link.map(|t| t.to_string()).unwrap_or_default(),
        }
    }
}

/// Listing row
#[derive(Debug, Serialize, Tabled)]
struct SummaryRow {
    /// File ID
    id: String,
    /// Full path
    path: String,
    /// Size in bytes
    size: i64,
    /// Uploaded at
    uploaded: String,
    /// Comment
    comment: String,
    /// Download URL
    url: String,
}

impl From<&FileSummary> for SummaryRow {
    fn from(s: &FileSummary) -> Self {
        Self {
            id: s.id.to_string(),
            path: s.full_path.clone(),
            size: s.size,
            uploaded: s.upload_date.format("%Y-%m-%d %H:%M").to_string(),
            comment: s.comment.clone().unwrap_or_default(),
            url: s.file_url.clone(),
        }
    }
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let actor = super::require_actor(args.user)?;

    match &args.command {
        FileCommand::Upload {
            path,
            folder,
            name,
            comment,
        } => {
            let file_name = match name {
                Some(name) => name.clone(),
                None => local_file_name(path)?,
            };
            let data = tokio::fs::read(path).await?;

            let file = services
                .uploads
                .upload(
                    &actor,
                    UploadParams {
                        folder_id: *folder,
                        file_name,
                        comment: comment.clone(),
                        data: Bytes::from(data),
                    },
                )
                .await?;
            output::print_item(&FileRow::from(&file), format);
        }
        FileCommand::List { folder } => {
            let files = services.files.list_files(&actor, *folder).await?;
            match format {
                OutputFormat::Json => output::print_json(&files),
                OutputFormat::Table => {
                    let rows: Vec<SummaryRow> = files.iter().map(SummaryRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        FileCommand::Rename { id, new_name } => {
            let file = services.files.rename_file(&actor, *id, new_name).await?;
            output::print_item(&FileRow::from(&file), format);
        }
        FileCommand::Comment { id, comment } => {
            let file = services.files.update_comment(&actor, *id, comment).await?;
            output::print_item(&FileRow::from(&file), format);
        }
        FileCommand::Delete { id } => {
            services.files.delete_file(&actor, *id).await?;
            output::print_success(&format!("File {id} deleted"));
        }
        FileCommand::Download { id, output: target } => {
            let result = services.downloads.download(&actor, *id).await?;
            save_download(&result, target.as_deref()).await?;
        }
    }

    Ok(())
}

/// Write a download to `target`, or to the stored file name in the
/// current directory.
pub(crate) async fn save_download(
    result: &DownloadResult,
    target: Option<&Path>,
) -> Result<(), AppError> {
    let target = match target {
        Some(target) => target.to_path_buf(),
        None => default_target(&result.filename)?,
    };
    tokio::fs::write(&target, &result.data).await?;

    output::print_success(&format!(
        "Saved {} ({} bytes) to {}",
        result.filename,
        result.data.len(),
        target.display()
    ));
    output::print_kv("Content-Type", &result.content_type);
    output::print_kv("Content-Disposition", &result.content_disposition);
    Ok(())
}

/// Only the last component of a stored name is ever used as a local path.
fn default_target(filename: &str) -> Result<PathBuf, AppError> {
    Path::new(filename)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| {
            AppError::validation(format!("Cannot save '{filename}' without --output"))
                .on_field("output")
        })
}

fn local_file_name(path: &Path) -> Result<String, AppError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::Validation,
                format!("Cannot derive a file name from {}", path.display()),
            )
            .on_field("file")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_target_keeps_last_component() {
        assert_eq!(default_target("report.pdf").unwrap(), PathBuf::from("report.pdf"));
        assert_eq!(
            default_target("../../evil.txt").unwrap(),
            PathBuf::from("evil.txt")
        );
        assert_eq!(default_target("/etc/passwd").unwrap(), PathBuf::from("passwd"));

        let err = default_target("..").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("output"));
    }
}
