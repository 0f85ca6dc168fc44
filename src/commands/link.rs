//! Public link CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use uuid::Uuid;

use mycloud_core::error::AppError;

use super::Services;
use super::file::{FileRow, save_download};
use crate::output::{self, OutputFormat};

/// Arguments for link commands
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Acting user ID (not needed for `fetch`)
    #[arg(short, long, global = true)]
    pub user: Option<Uuid>,

    /// Link subcommand
    #[command(subcommand)]
    pub command: LinkCommand,
}

/// Link subcommands
#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Issue a new public link, replacing any previous one
    Issue {
        /// File ID
        #[arg(long)]
        id: Uuid,
    },
    /// Revoke the public link of a file
    Revoke {
        /// File ID
        #[arg(long)]
        id: Uuid,
    },
    /// Download a file by its public link token
    Fetch {
        /// Public link token
        token: Uuid,
        /// Output path (defaults to the stored file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Execute link commands
pub async fn execute(
    args: &LinkArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        LinkCommand::Issue { id } => {
            let actor = super::require_actor(args.user)?;
            let file = services.links.issue(&actor, *id).await?;
            output::print_item(&FileRow::from(&file), format);
        }
        LinkCommand::Revoke { id } => {
            let actor = super::require_actor(args.user)?;
            services.links.revoke(&actor, *id).await?;
            output::print_success(&format!("Public link of file {id} revoked"));
        }
        LinkCommand::Fetch { token, output: target } => {
            let result = services.links.download_by_link(*token).await?;
            save_download(&result, target.as_deref()).await?;
        }
    }

    Ok(())
}
