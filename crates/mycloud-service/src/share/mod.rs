//! Public links.

pub mod link;

pub use link::PublicLinkService;
