//! # hieracl
//!
//! In-memory hierarchical access control.
//!
//! ## Features
//!
//! - **Role hierarchy** with multiple parents per role, searched breadth-first
//! - **Resource hierarchy** with write-time rule propagation to descendants
//! - **Allow/deny rules** keyed by resource, role and privilege, each axis
//!   accepting a wildcard
//! - **Explainable decisions** reporting the rule that decided a request
//! - **Assertions** to make a rule conditional on the request
//!
//! ## Example
//!
//! ```rust
//! use hieracl::{Acl, Ids};
//!
//! fn main() -> Result<(), hieracl::AclError> {
//!     let mut acl = Acl::new();
//!
//!     acl.add_role("guest", Ids::Unspecified)?;
//!     acl.add_role("member", "guest")?;
//!     acl.add_resource("blog", Ids::Unspecified)?;
//!     acl.add_resource("post", "blog")?;
//!
//!     acl.deny("guest", "blog", "view")?;
//!     acl.allow("member", "blog", "view")?;
//!
//!     assert!(!acl.is_allowed(Some("guest"), Some("post"), Some("view"))?);
//!     assert!(acl.is_allowed(Some("member"), Some("post"), Some("view"))?);
//!
//!     Ok(())
//! }
//! ```

pub mod acl;
pub mod config;
pub mod metrics;
pub mod mutator;
pub mod registry;
pub mod resolver;
pub mod rules;

// Re-export commonly used types
pub use acl::Acl;
pub use config::AclConfig;
pub use hieracl_core::{AclError, EntityKind, Identity, Ids, Resource, Result, Role};
pub use metrics::{AclMetrics, MetricsCollector};
pub use mutator::{RuleOperation, RuleTargets};
pub use registry::{Registry, RegistryEntry};
pub use resolver::{Decision, RuleCoordinate};
pub use rules::{assertion, Assertion, AssertionContext, ResourceKey, RoleKey, Rule, RuleStore, RuleType};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
