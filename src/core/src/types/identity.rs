//! Role and resource identities

use crate::error::EntityKind;
use crate::traits::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity that can be granted or denied privileges
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier (e.g., "guest", "editor")
    id: String,
}

impl Role {
    /// Create a new role
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Identity for Role {
    const KIND: EntityKind = EntityKind::Role;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_id(id: String) -> Self {
        Self { id }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl From<&str> for Role {
    fn from(id: &str) -> Self {
        Self::from_id(id.to_string())
    }
}

impl From<String> for Role {
    fn from(id: String) -> Self {
        Self::from_id(id)
    }
}

/// Identity representing a protected object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier (e.g., "blog", "blog.post")
    id: String,
}

impl Resource {
    /// Create a new resource
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Identity for Resource {
    const KIND: EntityKind = EntityKind::Resource;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_id(id: String) -> Self {
        Self { id }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl From<&str> for Resource {
    fn from(id: &str) -> Self {
        Self::from_id(id.to_string())
    }
}

impl From<String> for Resource {
    fn from(id: String) -> Self {
        Self::from_id(id)
    }
}
