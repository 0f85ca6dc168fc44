//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use mycloud_core::error::AppError;
use mycloud_entity::folder::{Folder, FolderWithFiles};
use mycloud_service::Actor;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Acting user ID
    #[arg(short, long, global = true)]
    pub user: Option<Uuid>,

    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a new folder
    Create {
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<Uuid>,
    },
    /// List root folders, or the children of a folder
    List {
        /// Parent folder ID
        #[arg(short, long)]
        parent: Option<Uuid>,
    },
    /// Show a folder tree with its files
    Tree {
        /// Folder ID (omit for every root folder)
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Delete a folder with all its files and subfolders
    Delete {
        /// Folder ID
        #[arg(long)]
        id: Uuid,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent folder ID
    parent_id: String,
    /// Created at
    created_at: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent_id: f.parent_id.map(|p| p.to_string()).unwrap_or_default(),
            created_at: f.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let actor = super::require_actor(args.user)?;

    match &args.command {
        FolderCommand::Create { name, parent } => {
            let folder = services.folders.create_folder(&actor, name, *parent).await?;
            output::print_success(&format!("Folder '{}' created (id: {})", folder.name, folder.id));
        }
        FolderCommand::List { parent } => {
            let folders = services.folders.list_folders(&actor, *parent).await?;
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Tree { id } => {
            let trees = match id {
                Some(id) => vec![services.folders.folder_tree(&actor, *id).await?],
                None => services.folders.owner_tree(&actor).await?,
            };
            match format {
                OutputFormat::Json => output::print_json(&trees),
                OutputFormat::Table => print_tree(&actor, &trees),
            }
        }
        FolderCommand::Delete { id } => {
            let counts = services.folders.delete_folder(&actor, *id).await?;
            output::print_success(&format!(
                "Deleted {} folder(s) and {} file(s)",
                counts.folders, counts.files
            ));
        }
    }

    Ok(())
}

fn print_tree(actor: &Actor, trees: &[FolderWithFiles]) {
    println!("/ (user {})", actor.user_id);
    for tree in trees {
        print_node(tree, 1);
    }
}

fn print_node(node: &FolderWithFiles, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}├── {}/", node.name);
    for file in &node.files {
        println!("{indent}  │ {} ({} bytes)", file.original_name, file.size);
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
