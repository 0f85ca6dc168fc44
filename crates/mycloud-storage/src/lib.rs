//! # mycloud-storage
//!
//! Content storage provider implementations for MyCloud.

pub mod providers;

pub use providers::LocalStorageProvider;
