//! File domain entities.

pub mod model;
pub mod summary;

pub use model::{CreateFile, File, extension_of};
pub use summary::FileSummary;
