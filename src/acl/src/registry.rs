//! Hierarchy registry for roles and resources
//!
//! Each registry is an arena keyed by identifier. Parent and child links are
//! stored as identifier sets on both ends, so removing an entry is a matter of
//! pruning ids from its neighbours.

use hieracl_core::{AclError, Identity, Ids, Result};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// One registered entity together with its links
#[derive(Debug, Clone)]
pub struct RegistryEntry<T> {
    identity: T,
    parents: IndexSet<String>,
    children: IndexSet<String>,
}

impl<T> RegistryEntry<T> {
    fn new(identity: T, parents: IndexSet<String>) -> Self {
        Self {
            identity,
            parents,
            children: IndexSet::new(),
        }
    }

    pub fn identity(&self) -> &T {
        &self.identity
    }

    /// Parent ids in the order they were declared
    pub fn parents(&self) -> &IndexSet<String> {
        &self.parents
    }

    /// Child ids in registration order
    pub fn children(&self) -> &IndexSet<String> {
        &self.children
    }
}

/// Registry of one kind of identity
///
/// # Example
///
/// ```
/// use hieracl::registry::Registry;
/// use hieracl_core::{Identity, Ids, Role};
///
/// let mut roles: Registry<Role> = Registry::new();
/// roles.add(Role::new("guest"), &Ids::Unspecified).unwrap();
/// roles.add(Role::new("member"), &Ids::from("guest")).unwrap();
///
/// let parents: Vec<&str> = roles.parents("member").unwrap().map(|r| r.id()).collect();
/// assert_eq!(parents, vec!["guest"]);
/// ```
#[derive(Debug, Clone)]
pub struct Registry<T: Identity> {
    entries: IndexMap<String, RegistryEntry<T>>,
}

impl<T: Identity> Registry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Register an entity below the given parents
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the id is taken
    /// - `NotFound` if any parent is not registered; nothing is modified then
    pub fn add(&mut self, entity: T, parents: &Ids) -> Result<()> {
        let id = entity.id().to_string();

        if self.has(&id) {
            return Err(AclError::already_exists(T::KIND, id));
        }

        let mut parent_ids = IndexSet::with_capacity(parents.len());
        for parent in parents.iter() {
            if !self.has(parent) {
                return Err(AclError::not_found(T::KIND, parent));
            }
            parent_ids.insert(parent.to_string());
        }

        for parent in &parent_ids {
            if let Some(entry) = self.entries.get_mut(parent) {
                entry.children.insert(id.clone());
            }
        }

        debug!("{} '{}' registered with {} parent(s)", T::KIND, id, parent_ids.len());
        self.entries.insert(id, RegistryEntry::new(entity, parent_ids));

        Ok(())
    }

    /// Look up a registered identity
    pub fn get(&self, id: &str) -> Result<&T> {
        self.get_entry(id).map(RegistryEntry::identity)
    }

    /// Look up the full entry including its links
    pub fn get_entry(&self, id: &str) -> Result<&RegistryEntry<T>> {
        self.entries
            .get(id)
            .ok_or_else(|| AclError::not_found(T::KIND, id))
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Unregister an entity and detach it from its neighbours
    ///
    /// Descendants stay registered; they only lose this parent.
    pub fn remove(&mut self, id: &str) -> Result<T> {
        let entry = self
            .entries
            .shift_remove(id)
            .ok_or_else(|| AclError::not_found(T::KIND, id))?;

        for child in &entry.children {
            if let Some(child_entry) = self.entries.get_mut(child) {
                child_entry.parents.shift_remove(id);
            }
        }

        for parent in &entry.parents {
            if let Some(parent_entry) = self.entries.get_mut(parent) {
                parent_entry.children.shift_remove(id);
            }
        }

        debug!("{} '{}' unregistered", T::KIND, id);
        Ok(entry.identity)
    }

    /// Parent identities in declaration order
    pub fn parents(&self, id: &str) -> Result<impl Iterator<Item = &T> + '_> {
        let entry = self.get_entry(id)?;
        Ok(entry
            .parents
            .iter()
            .filter_map(move |parent| self.entries.get(parent))
            .map(RegistryEntry::identity))
    }

    /// Direct child identities in registration order
    pub fn children(&self, id: &str) -> Result<impl Iterator<Item = &T> + '_> {
        let entry = self.get_entry(id)?;
        Ok(entry
            .children
            .iter()
            .filter_map(move |child| self.entries.get(child))
            .map(RegistryEntry::identity))
    }

    /// Every transitive child id, depth-first
    pub fn descendants(&self, id: &str) -> Result<Vec<String>> {
        let entry = self.get_entry(id)?;

        let mut found: IndexSet<String> = IndexSet::new();
        let mut stack: Vec<&str> = entry.children.iter().rev().map(String::as_str).collect();

        while let Some(current) = stack.pop() {
            if !found.insert(current.to_string()) {
                continue;
            }
            if let Some(child_entry) = self.entries.get(current) {
                stack.extend(child_entry.children.iter().rev().map(String::as_str));
            }
        }

        Ok(found.into_iter().collect())
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Registered entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry<T>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Identity> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
