//! Decision resolution over the role and resource hierarchies
//!
//! # Algorithm
//!
//! Two resource levels are searched: the requested resource, then the
//! all-resources wildcard. At each level:
//!
//! 1. Breadth-first over the requested role and its ancestors, the first role
//!    with an applicable rule at this resource decides
//! 2. Otherwise the all-roles bucket at this resource decides if it can
//!
//! At the all-resources level the root rule always decides.
//!
//! Resource inheritance happens when rules are written: a rule on a resource
//! is copied into every descendant registered at that time. Resolution never
//! reads a parent resource's rules, so a resource registered later does not
//! inherit them, whatever else is written for it afterwards.
//!
//! A role-level check looks at the exact privilege, then at the role's
//! all-privileges rule. When no privilege is requested, any explicit
//! per-privilege deny of the role wins over its all-privileges rule.

use crate::registry::Registry;
use crate::rules::{AssertionContext, ResourceKey, RoleKey, RuleStore, RuleType};
use hieracl_core::{Identity, Resource, Role};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::debug;

/// Location of the rule that produced a decision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleCoordinate {
    pub resource: ResourceKey,
    pub role: RoleKey,
    /// `None` for the all-privileges slot
    pub privilege: Option<String>,
}

impl RuleCoordinate {
    fn new(resource: Option<&str>, role: Option<&str>, privilege: Option<&str>) -> Self {
        Self {
            resource: ResourceKey::from(resource),
            role: RoleKey::from(role),
            privilege: privilege.map(str::to_string),
        }
    }

    /// Coordinate of the root rule
    pub fn root() -> Self {
        Self::new(None, None, None)
    }

    pub fn is_root(&self) -> bool {
        self.resource == ResourceKey::All && self.role == RoleKey::All && self.privilege.is_none()
    }
}

impl fmt::Display for RuleCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resource={} role={} privilege={}",
            self.resource,
            self.role,
            self.privilege.as_deref().unwrap_or("*")
        )
    }
}

/// Outcome of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the request is allowed
    pub allowed: bool,

    /// Verdict of the deciding rule
    pub kind: RuleType,

    /// Where the deciding rule is stored
    pub coordinate: RuleCoordinate,
}

impl Decision {
    fn new(kind: RuleType, coordinate: RuleCoordinate) -> Self {
        Self {
            allowed: kind.is_allow(),
            kind,
            coordinate,
        }
    }

    /// True when no rule matched and the root rule decided
    pub fn is_default(&self) -> bool {
        self.coordinate.is_root()
    }
}

/// Read-only view over the role registry and rule store used to answer requests
pub struct Resolver<'a> {
    roles: &'a Registry<Role>,
    rules: &'a RuleStore,
}

impl<'a> Resolver<'a> {
    pub fn new(roles: &'a Registry<Role>, rules: &'a RuleStore) -> Self {
        Self { roles, rules }
    }

    /// Resolve a request whose role and resource are already looked up
    ///
    /// `None` role or resource stands for the wildcard; `None` privilege asks
    /// whether the role holds every privilege on the resource.
    pub fn resolve(
        &self,
        role: Option<&Role>,
        resource: Option<&Resource>,
        privilege: Option<&str>,
    ) -> Decision {
        let context = AssertionContext {
            role,
            resource,
            privilege,
        };

        let levels = resource
            .map(|resource| Some(resource.id()))
            .into_iter()
            .chain([None]);

        for level in levels {
            if let Some(role) = role {
                if let Some(decision) = self.search_roles(role.id(), level, &context) {
                    return decision;
                }
            }

            if let Some(decision) = self.visit(level, None, &context) {
                return decision;
            }
        }

        // Only reachable when the root rule carries an assertion that failed
        Decision::new(self.rules.root().kind(), RuleCoordinate::root())
    }

    /// Breadth-first search over a role and its ancestors at one resource level
    fn search_roles<'q>(
        &'q self,
        role: &'q str,
        resource: Option<&str>,
        context: &AssertionContext<'_>,
    ) -> Option<Decision> {
        let mut visited: HashSet<&'q str> = HashSet::new();
        let mut queue: VecDeque<&'q str> = VecDeque::from([role]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }

            if let Some(decision) = self.visit(resource, Some(current), context) {
                debug!(
                    "Role search at {:?} decided by '{}' after {} role(s)",
                    resource,
                    current,
                    visited.len()
                );
                return Some(decision);
            }

            if let Ok(entry) = self.roles.get_entry(current) {
                queue.extend(
                    entry
                        .parents()
                        .iter()
                        .map(String::as_str)
                        .filter(|parent| !visited.contains(parent)),
                );
            }
        }

        None
    }

    /// Check the rules of one role (or the role wildcard) at one resource level
    fn visit(
        &self,
        resource: Option<&str>,
        role: Option<&str>,
        context: &AssertionContext<'_>,
    ) -> Option<Decision> {
        match context.privilege {
            None => {
                if let Some(set) = self.rules.rule_set(resource, role) {
                    for (privilege, rule) in set.privileges() {
                        if rule.applies(context) == Some(RuleType::Deny) {
                            return Some(Decision::new(
                                RuleType::Deny,
                                RuleCoordinate::new(resource, role, Some(privilege)),
                            ));
                        }
                    }
                }
            }
            Some(privilege) => {
                let kind = self
                    .rules
                    .privilege_rule(resource, role, privilege)
                    .and_then(|rule| rule.applies(context));
                if let Some(kind) = kind {
                    return Some(Decision::new(
                        kind,
                        RuleCoordinate::new(resource, role, Some(privilege)),
                    ));
                }
            }
        }

        self.rules
            .all_privileges_rule(resource, role)
            .and_then(|rule| rule.applies(context))
            .map(|kind| Decision::new(kind, RuleCoordinate::new(resource, role, None)))
    }
}
