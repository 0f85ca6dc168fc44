//! Folder tree with contained files, for hierarchical display.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::file::FileSummary;

/// A folder together with its files and, recursively, its subfolders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderWithFiles {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Full path from the owner's root, e.g. `/Docs/Reports`.
    pub path: String,
    /// Parent folder ID.
    pub parent_id: Option<Uuid>,
    /// Files directly in this folder.
    pub files: Vec<FileSummary>,
    /// Child folders.
    pub children: Vec<FolderWithFiles>,
}

impl FolderWithFiles {
    /// Number of files in this folder and all descendants.
    pub fn total_files(&self) -> usize {
        self.files.len()
            + self
                .children
                .iter()
                .map(FolderWithFiles::total_files)
                .sum::<usize>()
    }

    /// Number of descendant folders (excluding this one).
    pub fn total_folders(&self) -> usize {
        self.children.len()
            + self
                .children
                .iter()
                .map(FolderWithFiles::total_folders)
                .sum::<usize>()
    }
}
