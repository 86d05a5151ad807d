//! Identity capability shared by roles and resources

use crate::error::EntityKind;
use std::fmt;

/// Anything exposing a stable, unique string identifier.
///
/// Roles and resources are two independent implementors. A registry is
/// generic over one implementor, so a role id can never be looked up in the
/// resource hierarchy by accident.
pub trait Identity: Clone + fmt::Debug {
    /// Registry this identity lives in, used for error reporting
    const KIND: EntityKind;

    /// Stable identifier
    fn id(&self) -> &str;

    /// Build the default identity for a raw identifier
    fn from_id(id: String) -> Self;
}
