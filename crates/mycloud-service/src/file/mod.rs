//! File services: upload, download and CRUD.

pub mod download;
pub mod service;
pub mod upload;

pub use download::{DownloadResult, DownloadService};
pub use service::FileService;
pub use upload::{UploadParams, UploadService};
