//! Error types shared by the hieracl crates
//!
//! Every fallible operation of the access-control engine reports one of three
//! kinds: the call had the wrong shape, the entity is already registered, or a
//! referenced entity does not exist.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AclError>;

/// Which hierarchy an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Entry of the role registry
    Role,
    /// Entry of the resource registry
    Resource,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Role => write!(f, "Role"),
            EntityKind::Resource => write!(f, "Resource"),
        }
    }
}

/// Access-control error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    /// Argument has the wrong shape or carries an unsupported token
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Identifier is already registered
    #[error("{kind} '{id}' already exists in the registry")]
    AlreadyExists { kind: EntityKind, id: String },

    /// Identifier is not registered
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },
}

impl AclError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        AclError::InvalidArgument(msg.into())
    }

    /// Create an already exists error
    pub fn already_exists<S: Into<String>>(kind: EntityKind, id: S) -> Self {
        AclError::AlreadyExists {
            kind,
            id: id.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(kind: EntityKind, id: S) -> Self {
        AclError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Check if error is an invalid argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, AclError::InvalidArgument(_))
    }

    /// Check if error is an already exists error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, AclError::AlreadyExists { .. })
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AclError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let err = AclError::invalid_argument("parent list");
        assert!(err.is_invalid_argument());

        let err = AclError::already_exists(EntityKind::Role, "guest");
        assert!(err.is_already_exists());
        assert!(!err.is_not_found());

        let err = AclError::not_found(EntityKind::Resource, "blog");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = AclError::already_exists(EntityKind::Role, "guest");
        assert_eq!(err.to_string(), "Role 'guest' already exists in the registry");

        let err = AclError::not_found(EntityKind::Resource, "blog");
        assert_eq!(err.to_string(), "Resource 'blog' not found");

        let err = AclError::invalid_argument("unsupported rule type 'MAYBE'");
        assert_eq!(
            err.to_string(),
            "Invalid argument: unsupported rule type 'MAYBE'"
        );
    }
}
