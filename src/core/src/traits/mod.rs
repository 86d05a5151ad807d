//! Shared traits for the hieracl crates

pub mod identity;

pub use identity::Identity;
