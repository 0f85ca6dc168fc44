//! # mycloud-entity
//!
//! Domain entity models for MyCloud. `File` and `Folder` mirror rows of
//! the metadata catalog and derive `sqlx::FromRow`; the remaining types
//! are read models built from them for listings.

pub mod file;
pub mod folder;
