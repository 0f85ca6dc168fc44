//! Public link issuance, revocation and token downloads.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use mycloud_core::error::{AppError, ErrorKind};
use mycloud_database::FileRepository;
use mycloud_entity::file::File;

use crate::access::{AccessGate, Operation};
use crate::context::Actor;
use crate::file::download::{DownloadResult, DownloadService};

/// How many fresh tokens to try when the unique index reports a clash.
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// Publishes files through unguessable link tokens.
#[derive(Clone)]
pub struct PublicLinkService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// Delivers content for token downloads.
    downloads: DownloadService,
    gate: AccessGate,
}

impl std::fmt::Debug for PublicLinkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicLinkService").finish()
    }
}

impl PublicLinkService {
    /// Creates a new public link service.
    pub fn new(file_repo: Arc<dyn FileRepository>, downloads: DownloadService) -> Self {
        Self {
            file_repo,
            downloads,
            gate: AccessGate::new(),
        }
    }

    /// Issues a fresh public link for a file, replacing any previous one.
    pub async fn issue(&self, actor: &Actor, file_id: Uuid) -> Result<File, AppError> {
        let file = self.owned(actor, file_id).await?;

        let mut attempt = 1;
        let updated = loop {
            match self
                .file_repo
                .set_public_link(file.id, Some(Uuid::new_v4()))
                .await
            {
                Ok(updated) => break updated,
                Err(e) if e.is(ErrorKind::Conflict) && attempt < MAX_TOKEN_ATTEMPTS => {
                    warn!(file_id = %file.id, attempt, "Public link token collided, regenerating");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(user_id = %actor.user_id, file_id = %file.id, "Public link issued");
        Ok(updated)
    }

    /// Clears the public link of a file.
    pub async fn revoke(&self, actor: &Actor, file_id: Uuid) -> Result<File, AppError> {
        let file = self.owned(actor, file_id).await?;
        let updated = self.file_repo.set_public_link(file.id, None).await?;

        info!(user_id = %actor.user_id, file_id = %file.id, "Public link revoked");
        Ok(updated)
    }

    /// Downloads a file by its public link token. No actor is involved:
    /// the token is the credential.
    pub async fn download_by_link(&self, token: Uuid) -> Result<DownloadResult, AppError> {
        let file = self
            .file_repo
            .find_by_public_link(token)
            .await?
            .ok_or_else(|| AppError::not_found("Public link not found").on_field("public_link"))?;

        let result = self.downloads.deliver(file).await?;
        info!(file_id = %result.file.id, "File downloaded via public link");
        Ok(result)
    }

    async fn owned(&self, actor: &Actor, file_id: Uuid) -> Result<File, AppError> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        self.gate.require(actor, file.owner_id, Operation::ManageLink)?;
        Ok(file)
    }
}
