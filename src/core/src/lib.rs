//! # Hieracl Core
//!
//! Shared identity types, argument types and error handling for the hieracl
//! access-control engine. Kept separate so hosts can depend on the identity
//! types without the engine itself.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{AclError, EntityKind, Result};
pub use traits::Identity;
pub use types::{Ids, Resource, Role};
