//! Identifier arguments for bulk operations
//!
//! Registration and rule operations accept nothing, a single id, or a list of
//! ids. Some operations treat those shapes differently: a resource accepts only
//! a single parent, and an omitted resource target means "every registered
//! resource" while an explicitly empty list means "the wildcard only".

use crate::types::{Resource, Role};
use crate::traits::Identity;
use std::slice;

/// Zero, one or many identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Ids {
    /// Argument omitted
    #[default]
    Unspecified,
    /// A single identifier
    One(String),
    /// A list of identifiers, possibly empty
    Many(Vec<String>),
}

impl Ids {
    /// Explicitly empty list
    pub fn empty() -> Self {
        Ids::Many(Vec::new())
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Ids::Unspecified)
    }

    /// True when no identifier is carried, whether omitted or empty
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True when the argument was given as a list, regardless of its length
    pub fn is_list(&self) -> bool {
        matches!(self, Ids::Many(_))
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            Ids::Unspecified => &[],
            Ids::One(id) => slice::from_ref(id),
            Ids::Many(ids) => ids,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.as_slice().iter().map(String::as_str)
    }
}

impl From<&str> for Ids {
    fn from(id: &str) -> Self {
        Ids::One(id.to_string())
    }
}

impl From<String> for Ids {
    fn from(id: String) -> Self {
        Ids::One(id)
    }
}

impl From<&String> for Ids {
    fn from(id: &String) -> Self {
        Ids::One(id.clone())
    }
}

impl From<&Role> for Ids {
    fn from(role: &Role) -> Self {
        Ids::One(role.id().to_string())
    }
}

impl From<&Resource> for Ids {
    fn from(resource: &Resource) -> Self {
        Ids::One(resource.id().to_string())
    }
}

impl From<Vec<String>> for Ids {
    fn from(ids: Vec<String>) -> Self {
        Ids::Many(ids)
    }
}

impl From<Vec<&str>> for Ids {
    fn from(ids: Vec<&str>) -> Self {
        Ids::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Ids {
    fn from(ids: &[&str]) -> Self {
        Ids::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Ids {
    fn from(ids: [&str; N]) -> Self {
        Ids::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl<T: Into<Ids>> From<Option<T>> for Ids {
    fn from(ids: Option<T>) -> Self {
        ids.map_or(Ids::Unspecified, Into::into)
    }
}
