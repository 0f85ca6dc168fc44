//! # mycloud-service
//!
//! Business logic service layer for MyCloud. Services orchestrate the
//! catalog repositories and the storage provider to implement uploads,
//! file mutations, folders and public links.
//!
//! Services follow constructor injection: every collaborator is passed in
//! as an `Arc` at construction time, and every operation takes the acting
//! user explicitly as an [`Actor`].

pub mod access;
pub mod context;
pub mod file;
pub mod folder;
pub mod share;
pub mod validation;

pub use access::{AccessGate, Operation};
pub use context::Actor;
pub use file::{DownloadResult, DownloadService, FileService, UploadParams, UploadService};
pub use folder::{DeletedCounts, FolderService};
pub use share::PublicLinkService;
pub use validation::UploadValidator;
