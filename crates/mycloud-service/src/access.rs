//! Owner-only authorization predicate shared by every service.

use std::fmt;

use uuid::Uuid;

use mycloud_core::error::AppError;

use crate::context::Actor;

/// Reported when an actor touches a folder it does not own.
pub const FOLDER_DENIED: &str = "You do not have access to this folder";

/// Operations guarded by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Look at a file or folder and its listing.
    Read,
    /// Place a new file into a folder.
    Upload,
    /// Rename a file or change its comment.
    Modify,
    /// Remove a file or folder.
    Delete,
    /// Fetch the content of a file.
    Download,
    /// Issue or revoke a public link.
    ManageLink,
}

impl Operation {
    /// Message reported when the operation is denied.
    pub fn denied_message(&self) -> &'static str {
        match self {
            Self::Read | Self::Download => "You do not have access to this file",
            Self::Upload => FOLDER_DENIED,
            Self::Modify | Self::ManageLink => "You cannot modify this file",
            Self::Delete => "You cannot delete this file",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Upload => write!(f, "upload"),
            Self::Modify => write!(f, "modify"),
            Self::Delete => write!(f, "delete"),
            Self::Download => write!(f, "download"),
            Self::ManageLink => write!(f, "manage_link"),
        }
    }
}

/// Decides whether an actor may perform an operation on a resource.
///
/// Every operation is owner-only. Public link downloads never pass
/// through the gate: possession of the token is the credential.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate;

impl AccessGate {
    /// Creates a new gate.
    pub fn new() -> Self {
        Self
    }

    /// Returns whether `actor` may perform `operation` on a resource owned
    /// by `owner_id`.
    pub fn can_access(&self, actor: &Actor, owner_id: Uuid, _operation: Operation) -> bool {
        actor.is(owner_id)
    }

    /// Folder variant of [`require`](Self::require): any denied operation
    /// on a folder reports [`FOLDER_DENIED`].
    pub fn require_folder(
        &self,
        actor: &Actor,
        owner_id: Uuid,
        operation: Operation,
    ) -> Result<(), AppError> {
        if self.can_access(actor, owner_id, operation) {
            Ok(())
        } else {
            Err(AppError::permission_denied(FOLDER_DENIED))
        }
    }

    /// Like [`can_access`](Self::can_access), but fails with a
    /// permission-denied error carrying the operation's message.
    pub fn require(
        &self,
        actor: &Actor,
        owner_id: Uuid,
        operation: Operation,
    ) -> Result<(), AppError> {
        if self.can_access(actor, owner_id, operation) {
            Ok(())
        } else {
            Err(AppError::permission_denied(operation.denied_message()))
        }
    }
}
