//! Rule definitions and the rule store
//!
//! Rules live at a (resource, role, privilege) coordinate. Each axis admits a
//! wildcard: "all resources", "all roles" and "all privileges". The coordinate
//! where all three are wildcards holds the root rule, which is the last word of
//! every resolution and is never removed.

use hieracl_core::{AclError, Resource, Result, Role};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Verdict carried by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleType {
    /// Permit the action
    Allow,
    /// Refuse the action
    Deny,
}

impl RuleType {
    pub fn is_allow(self) -> bool {
        self == RuleType::Allow
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::Allow => write!(f, "ALLOW"),
            RuleType::Deny => write!(f, "DENY"),
        }
    }
}

impl FromStr for RuleType {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(RuleType::Allow),
            "DENY" => Ok(RuleType::Deny),
            _ => Err(AclError::invalid_argument(format!(
                "unsupported rule type '{}', must be either ALLOW or DENY",
                s
            ))),
        }
    }
}

/// Request seen by an assertion
#[derive(Debug, Clone, Copy)]
pub struct AssertionContext<'a> {
    /// Requested role, `None` for the wildcard
    pub role: Option<&'a Role>,
    /// Requested resource, `None` for the wildcard
    pub resource: Option<&'a Resource>,
    /// Requested privilege, `None` when any privilege is checked
    pub privilege: Option<&'a str>,
}

/// Run-time condition attached to a rule
///
/// A rule carrying an assertion only applies when the assertion holds for the
/// request being resolved; otherwise the rule is skipped as if absent.
pub trait Assertion: Send + Sync {
    fn assert(&self, context: &AssertionContext<'_>) -> bool;
}

impl<F> Assertion for F
where
    F: Fn(&AssertionContext<'_>) -> bool + Send + Sync,
{
    fn assert(&self, context: &AssertionContext<'_>) -> bool {
        self(context)
    }
}

/// Wrap a closure as a shareable assertion
pub fn assertion<F>(f: F) -> Arc<dyn Assertion>
where
    F: Fn(&AssertionContext<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Allow/deny verdict with an optional assertion
#[derive(Clone)]
pub struct Rule {
    kind: RuleType,
    assertion: Option<Arc<dyn Assertion>>,
}

impl Rule {
    pub fn new(kind: RuleType) -> Self {
        Self {
            kind,
            assertion: None,
        }
    }

    pub fn with_assertion(kind: RuleType, assertion: Arc<dyn Assertion>) -> Self {
        Self {
            kind,
            assertion: Some(assertion),
        }
    }

    pub fn allow() -> Self {
        Self::new(RuleType::Allow)
    }

    pub fn deny() -> Self {
        Self::new(RuleType::Deny)
    }

    pub fn kind(&self) -> RuleType {
        self.kind
    }

    pub fn has_assertion(&self) -> bool {
        self.assertion.is_some()
    }

    /// Verdict of this rule for a request, `None` when its assertion fails
    pub fn applies(&self, context: &AssertionContext<'_>) -> Option<RuleType> {
        match &self.assertion {
            Some(assertion) if !assertion.assert(context) => None,
            _ => Some(self.kind),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("assertion", &self.assertion.is_some())
            .finish()
    }
}

/// Rules of one role at one resource
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    all_privileges: Option<Rule>,
    by_privilege: IndexMap<String, Rule>,
}

impl RuleSet {
    /// Rule for every privilege
    pub fn all_privileges(&self) -> Option<&Rule> {
        self.all_privileges.as_ref()
    }

    /// Rule for exactly one privilege
    pub fn privilege(&self, privilege: &str) -> Option<&Rule> {
        self.by_privilege.get(privilege)
    }

    /// Privilege-specific rules in write order
    pub fn privileges(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.by_privilege.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.all_privileges.is_none() && self.by_privilege.is_empty()
    }

    fn len(&self) -> usize {
        usize::from(self.all_privileges.is_some()) + self.by_privilege.len()
    }
}

/// Resource axis of a rule coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKey {
    /// Every resource
    All,
    /// One registered resource
    Id(String),
}

impl ResourceKey {
    pub fn id(&self) -> Option<&str> {
        match self {
            ResourceKey::All => None,
            ResourceKey::Id(id) => Some(id.as_str()),
        }
    }
}

impl From<Option<&str>> for ResourceKey {
    fn from(id: Option<&str>) -> Self {
        id.map_or(ResourceKey::All, |id| ResourceKey::Id(id.to_string()))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::All => write!(f, "*"),
            ResourceKey::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Role axis of a rule coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKey {
    /// Every role
    All,
    /// One registered role
    Id(String),
}

impl RoleKey {
    pub fn id(&self) -> Option<&str> {
        match self {
            RoleKey::All => None,
            RoleKey::Id(id) => Some(id.as_str()),
        }
    }
}

impl From<Option<&str>> for RoleKey {
    fn from(id: Option<&str>) -> Self {
        id.map_or(RoleKey::All, |id| RoleKey::Id(id.to_string()))
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKey::All => write!(f, "*"),
            RoleKey::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Role buckets of one resource
#[derive(Debug, Clone, Default)]
struct ResourceRules {
    all_roles: RuleSet,
    by_role: HashMap<String, RuleSet>,
}

impl ResourceRules {
    fn rule_set(&self, role: Option<&str>) -> Option<&RuleSet> {
        match role {
            None => Some(&self.all_roles),
            Some(id) => self.by_role.get(id),
        }
    }

    fn rule_set_mut(&mut self, role: Option<&str>) -> &mut RuleSet {
        match role {
            None => &mut self.all_roles,
            Some(id) => self.by_role.entry(id.to_string()).or_default(),
        }
    }

    fn len(&self) -> usize {
        self.all_roles.len() + self.by_role.values().map(RuleSet::len).sum::<usize>()
    }

    fn is_empty(&self) -> bool {
        self.all_roles.is_empty() && self.by_role.is_empty()
    }
}

/// Nested rule storage: resource → role → privilege
///
/// The root rule is held apart from the maps. Reads of the root coordinate see
/// it as the wildcard-privilege rule of the all-resources/all-roles set, writes
/// overwrite it, and removals reset it instead of deleting it.
#[derive(Debug, Clone)]
pub struct RuleStore {
    root: Rule,
    all_resources: ResourceRules,
    by_resource: HashMap<String, ResourceRules>,
}

impl RuleStore {
    /// Create a store seeded with the root rule
    pub fn new(default_rule: RuleType) -> Self {
        Self {
            root: Rule::new(default_rule),
            all_resources: ResourceRules::default(),
            by_resource: HashMap::new(),
        }
    }

    /// The rule every resolution falls back to
    pub fn root(&self) -> &Rule {
        &self.root
    }

    /// Rules of one role (or the role wildcard) at one resource (or the
    /// resource wildcard), without the root rule
    pub fn rule_set(&self, resource: Option<&str>, role: Option<&str>) -> Option<&RuleSet> {
        match resource {
            None => self.all_resources.rule_set(role),
            Some(id) => self.by_resource.get(id)?.rule_set(role),
        }
    }

    /// Wildcard-privilege rule at a coordinate, including the root rule
    pub fn all_privileges_rule(&self, resource: Option<&str>, role: Option<&str>) -> Option<&Rule> {
        if resource.is_none() && role.is_none() {
            return Some(&self.root);
        }
        self.rule_set(resource, role)?.all_privileges()
    }

    /// Privilege-specific rule at a coordinate
    pub fn privilege_rule(
        &self,
        resource: Option<&str>,
        role: Option<&str>,
        privilege: &str,
    ) -> Option<&Rule> {
        self.rule_set(resource, role)?.privilege(privilege)
    }

    /// Store a rule, replacing whatever sat at the coordinate
    pub fn set(
        &mut self,
        resource: Option<&str>,
        role: Option<&str>,
        privilege: Option<&str>,
        rule: Rule,
    ) {
        if resource.is_none() && role.is_none() && privilege.is_none() {
            self.root = rule;
            return;
        }

        let set = self.resource_rules_mut(resource).rule_set_mut(role);
        match privilege {
            None => set.all_privileges = Some(rule),
            Some(privilege) => {
                set.by_privilege.insert(privilege.to_string(), rule);
            }
        }
    }

    /// Delete the rule at a coordinate if it carries the given verdict
    ///
    /// Returns whether anything changed. The root rule is reset to `Deny`
    /// rather than deleted.
    pub fn remove(
        &mut self,
        resource: Option<&str>,
        role: Option<&str>,
        privilege: Option<&str>,
        kind: RuleType,
    ) -> bool {
        if resource.is_none() && role.is_none() && privilege.is_none() {
            if self.root.kind() != kind {
                return false;
            }
            self.root = Rule::deny();
            return true;
        }

        let resource_rules = match resource {
            None => &mut self.all_resources,
            Some(id) => match self.by_resource.get_mut(id) {
                Some(rules) => rules,
                None => return false,
            },
        };
        let set = match role {
            None => &mut resource_rules.all_roles,
            Some(id) => match resource_rules.by_role.get_mut(id) {
                Some(set) => set,
                None => return false,
            },
        };

        let removed = match privilege {
            None => {
                let matches = set
                    .all_privileges
                    .as_ref()
                    .is_some_and(|rule| rule.kind() == kind);
                if matches {
                    set.all_privileges = None;
                }
                matches
            }
            Some(privilege) => {
                let matches = set
                    .by_privilege
                    .get(privilege)
                    .is_some_and(|rule| rule.kind() == kind);
                if matches {
                    set.by_privilege.shift_remove(privilege);
                }
                matches
            }
        };

        if removed && set.is_empty() {
            if let Some(id) = role {
                resource_rules.by_role.remove(id);
            }
        }

        if removed && resource_rules.is_empty() {
            if let Some(id) = resource {
                self.by_resource.remove(id);
            }
        }

        removed
    }

    /// Drop every rule of a role, at the resource wildcard and at every resource
    pub fn purge_role(&mut self, role: &str) -> usize {
        let mut purged = self
            .all_resources
            .by_role
            .remove(role)
            .map_or(0, |set| set.len());

        for rules in self.by_resource.values_mut() {
            purged += rules.by_role.remove(role).map_or(0, |set| set.len());
        }
        self.by_resource.retain(|_, rules| !rules.is_empty());

        purged
    }

    /// Drop every rule attached to a resource
    pub fn purge_resource(&mut self, resource: &str) -> usize {
        self.by_resource
            .remove(resource)
            .map_or(0, |rules| rules.len())
    }

    /// Number of stored rules, the root rule included
    pub fn len(&self) -> usize {
        1 + self.all_resources.len()
            + self.by_resource.values().map(ResourceRules::len).sum::<usize>()
    }

    pub fn has_resource_rules(&self, resource: &str) -> bool {
        self.by_resource.contains_key(resource)
    }

    fn resource_rules_mut(&mut self, resource: Option<&str>) -> &mut ResourceRules {
        match resource {
            None => &mut self.all_resources,
            Some(id) => self.by_resource.entry(id.to_string()).or_default(),
        }
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(RuleType::Deny)
    }
}
