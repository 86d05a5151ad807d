//! Rule mutation: target resolution and bulk writes
//!
//! `allow`, `deny`, `remove_allow` and `remove_deny` all accept roles,
//! resources and privileges as zero, one or many ids. They are normalized into
//! a [`RuleTargets`] set before the store is touched, so an unknown id fails
//! the whole call and leaves the store as it was.

use crate::registry::Registry;
use crate::rules::{Assertion, Rule, RuleStore, RuleType};
use hieracl_core::{AclError, Ids, Resource, Result, Role};
use indexmap::IndexSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Whether a rule call writes or deletes entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleOperation {
    /// Write (or overwrite) the targeted entries
    Add,
    /// Delete the targeted entries that carry the given verdict
    Remove,
}

impl fmt::Display for RuleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOperation::Add => write!(f, "ADD"),
            RuleOperation::Remove => write!(f, "REMOVE"),
        }
    }
}

impl FromStr for RuleOperation {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADD" => Ok(RuleOperation::Add),
            "REMOVE" => Ok(RuleOperation::Remove),
            _ => Err(AclError::invalid_argument(format!(
                "unsupported operation '{}', must be either ADD or REMOVE",
                s
            ))),
        }
    }
}

/// Fully resolved coordinates of a bulk rule call
///
/// Resources are already expanded into their current descendants. `None` in
/// the resource or role list stands for the matching wildcard; an empty
/// privilege list targets the all-privileges slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTargets {
    resources: IndexSet<Option<String>>,
    roles: IndexSet<Option<String>>,
    privileges: IndexSet<String>,
}

impl RuleTargets {
    /// Resolve call arguments against both registries
    ///
    /// Omitted (or empty) roles target the all-roles wildcard.
    ///
    /// Resource selection:
    /// - omitted: every registered resource plus the wildcard (the wildcard
    ///   alone when nothing is registered)
    /// - explicit empty list: the wildcard only
    /// - ids: those resources
    ///
    /// # Errors
    ///
    /// `NotFound` for any unknown role or resource.
    pub fn resolve(
        roles: &Registry<Role>,
        resources: &Registry<Resource>,
        role_ids: &Ids,
        resource_ids: &Ids,
        privileges: &Ids,
    ) -> Result<Self> {
        let mut role_targets = IndexSet::with_capacity(role_ids.len().max(1));
        for id in role_ids.iter() {
            roles.get(id)?;
            role_targets.insert(Some(id.to_string()));
        }
        if role_targets.is_empty() {
            role_targets.insert(None);
        }

        let requested: Vec<Option<&str>> = if resource_ids.is_unspecified() {
            resources.ids().map(Some).chain(std::iter::once(None)).collect()
        } else if resource_ids.is_empty() {
            vec![None]
        } else {
            resource_ids.iter().map(Some).collect()
        };

        let mut resource_targets = IndexSet::with_capacity(requested.len());
        for target in requested {
            let Some(id) = target else {
                resource_targets.insert(None);
                continue;
            };

            resources.get(id)?;
            resource_targets.insert(Some(id.to_string()));
            for descendant in resources.descendants(id)? {
                resource_targets.insert(Some(descendant));
            }
        }

        Ok(Self {
            resources: resource_targets,
            roles: role_targets,
            privileges: privileges.iter().map(str::to_string).collect(),
        })
    }

    /// Targeted resources, `None` for the wildcard
    pub fn resources(&self) -> impl Iterator<Item = Option<&str>> {
        self.resources.iter().map(Option::as_deref)
    }

    /// Targeted roles, `None` for the wildcard
    pub fn roles(&self) -> impl Iterator<Item = Option<&str>> {
        self.roles.iter().map(Option::as_deref)
    }

    /// Named privileges, empty for the all-privileges slot
    pub fn privileges(&self) -> impl Iterator<Item = &str> {
        self.privileges.iter().map(String::as_str)
    }

    /// Number of (resource, role, privilege) coordinates covered
    pub fn len(&self) -> usize {
        self.resources.len() * self.roles.len() * self.privileges.len().max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn privilege_slots(&self) -> Vec<Option<&str>> {
        if self.privileges.is_empty() {
            vec![None]
        } else {
            self.privileges().map(Some).collect()
        }
    }
}

/// Apply an operation to every targeted coordinate
///
/// Returns the number of entries written or deleted.
pub fn apply(
    store: &mut RuleStore,
    operation: RuleOperation,
    kind: RuleType,
    targets: &RuleTargets,
    assertion: Option<Arc<dyn Assertion>>,
) -> usize {
    let slots = targets.privilege_slots();
    let mut affected = 0;

    for resource in targets.resources() {
        for role in targets.roles() {
            for privilege in &slots {
                match operation {
                    RuleOperation::Add => {
                        let rule = match &assertion {
                            Some(assertion) => Rule::with_assertion(kind, Arc::clone(assertion)),
                            None => Rule::new(kind),
                        };
                        store.set(resource, role, *privilege, rule);
                        affected += 1;
                    }
                    RuleOperation::Remove => {
                        if store.remove(resource, role, *privilege, kind) {
                            affected += 1;
                        }
                    }
                }
            }
        }
    }

    debug!(
        "{} {} applied to {} of {} coordinate(s)",
        operation,
        kind,
        affected,
        targets.len()
    );

    affected
}

#[cfg(test)]
mod tests {
    use super::*;
    use hieracl_core::Identity;

    fn registries() -> (Registry<Role>, Registry<Resource>) {
        let mut roles = Registry::new();
        roles.add(Role::new("guest"), &Ids::Unspecified).unwrap();
        roles.add(Role::new("member"), &Ids::from("guest")).unwrap();

        let mut resources = Registry::new();
        resources.add(Resource::new("blog"), &Ids::Unspecified).unwrap();
        resources.add(Resource::new("post"), &Ids::from("blog")).unwrap();
        resources.add(Resource::new("wiki"), &Ids::Unspecified).unwrap();

        (roles, resources)
    }

    #[test]
    fn test_operation_parsing() {
        assert_eq!("add".parse::<RuleOperation>().unwrap(), RuleOperation::Add);
        assert_eq!("REMOVE".parse::<RuleOperation>().unwrap(), RuleOperation::Remove);
        assert!("DENY".parse::<RuleOperation>().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_resource_expansion() {
        let (roles, resources) = registries();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from("guest"),
            &Ids::from("blog"),
            &Ids::from("view"),
        )
        .unwrap();

        let found: Vec<_> = targets.resources().collect();
        assert_eq!(found, vec![Some("blog"), Some("post")]);
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_omitted_resources_target_everything() {
        let (roles, resources) = registries();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from("guest"),
            &Ids::Unspecified,
            &Ids::Unspecified,
        )
        .unwrap();

        let found: Vec<_> = targets.resources().collect();
        assert_eq!(found, vec![Some("blog"), Some("post"), Some("wiki"), None]);
    }

    #[test]
    fn test_omitted_resources_without_registrations() {
        let (roles, _) = registries();
        let resources = Registry::new();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from("guest"),
            &Ids::Unspecified,
            &Ids::Unspecified,
        )
        .unwrap();

        assert_eq!(targets.resources().collect::<Vec<_>>(), vec![None]);
    }

    #[test]
    fn test_empty_resource_list_is_wildcard_only() {
        let (roles, resources) = registries();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from("guest"),
            &Ids::empty(),
            &Ids::Unspecified,
        )
        .unwrap();

        assert_eq!(targets.resources().collect::<Vec<_>>(), vec![None]);
    }

    #[test]
    fn test_omitted_roles_target_wildcard() {
        let (roles, resources) = registries();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::Unspecified,
            &Ids::from("wiki"),
            &Ids::from("view"),
        )
        .unwrap();

        assert_eq!(targets.roles().collect::<Vec<_>>(), vec![None]);
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_root_coordinate_reachable() {
        let (roles, resources) = registries();
        let mut store = RuleStore::default();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::Unspecified,
            &Ids::empty(),
            &Ids::Unspecified,
        )
        .unwrap();

        apply(&mut store, RuleOperation::Add, RuleType::Allow, &targets, None);
        assert_eq!(store.root().kind(), RuleType::Allow);
        assert_eq!(store.len(), 1);

        apply(&mut store, RuleOperation::Remove, RuleType::Allow, &targets, None);
        assert_eq!(store.root().kind(), RuleType::Deny);
    }

    #[test]
    fn test_unknown_ids() {
        let (roles, resources) = registries();

        let err = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from(["guest", "ghost"]),
            &Ids::from("blog"),
            &Ids::Unspecified,
        )
        .unwrap_err();
        assert!(err.is_not_found());

        let err = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from("guest"),
            &Ids::from("forum"),
            &Ids::Unspecified,
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_apply_add_and_remove() {
        let (roles, resources) = registries();
        let mut store = RuleStore::default();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from("member"),
            &Ids::from("blog"),
            &Ids::from(["view", "edit"]),
        )
        .unwrap();

        let written = apply(&mut store, RuleOperation::Add, RuleType::Allow, &targets, None);
        assert_eq!(written, 4);
        assert_eq!(store.len(), 5);

        let removed = apply(&mut store, RuleOperation::Remove, RuleType::Deny, &targets, None);
        assert_eq!(removed, 0);

        let removed = apply(&mut store, RuleOperation::Remove, RuleType::Allow, &targets, None);
        assert_eq!(removed, 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_apply_with_assertion() {
        let (roles, resources) = registries();
        let mut store = RuleStore::default();
        let targets = RuleTargets::resolve(
            &roles,
            &resources,
            &Ids::from("guest"),
            &Ids::from("wiki"),
            &Ids::Unspecified,
        )
        .unwrap();

        let check = crate::rules::assertion(|ctx| ctx.role.is_some_and(|r| r.id() == "guest"));
        apply(&mut store, RuleOperation::Add, RuleType::Allow, &targets, Some(check));

        let rule = store.all_privileges_rule(Some("wiki"), Some("guest")).unwrap();
        assert!(rule.has_assertion());
    }
}
