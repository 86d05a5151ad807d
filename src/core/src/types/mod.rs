//! Shared types for the hieracl crates

pub mod identity;
pub mod ids;

pub use identity::{Resource, Role};
pub use ids::Ids;
