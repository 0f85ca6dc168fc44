//! # mycloud-database
//!
//! The file and folder catalog. Repository traits are implemented twice:
//! by PostgreSQL repositories for deployments, and by an in-memory
//! catalog enforcing the same constraints for tests and local tooling.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryCatalog;
pub use repositories::{FileRepository, FolderRepository, PgFileRepository, PgFolderRepository};
