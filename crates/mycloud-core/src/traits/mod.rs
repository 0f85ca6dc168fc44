//! Core traits defined in `mycloud-core` and implemented by other crates.

pub mod storage;

pub use storage::StorageProvider;
