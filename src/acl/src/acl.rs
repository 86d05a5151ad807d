//! Access-control engine
//!
//! Owns the role and resource registries, the rule store and the optional
//! metrics collector. Every public operation goes through [`Acl`].
//!
//! # Architecture
//!
//! ```text
//! allow/deny ──→ RuleTargets ──→ mutator::apply ──→ RuleStore
//!                    ↑                                  ↓
//!     Registry<Role> + Registry<Resource>    Registry<Role> ──→ Resolver ──→ Decision
//!                                                                              ↓
//!                                                                         [Metrics]
//! ```

use crate::config::AclConfig;
use crate::metrics::{AclMetrics, MetricsCollector};
use crate::mutator::{self, RuleOperation, RuleTargets};
use crate::registry::Registry;
use crate::resolver::{Decision, Resolver};
use crate::rules::{Assertion, Rule, RuleStore, RuleType};
use hieracl_core::{AclError, Ids, Resource, Result, Role};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hierarchical access-control list
pub struct Acl {
    /// Role hierarchy (multiple parents per role)
    roles: Registry<Role>,

    /// Resource hierarchy (at most one parent per resource)
    resources: Registry<Resource>,

    /// Rules keyed by resource, role and privilege
    rules: RuleStore,

    /// Decision and mutation counters
    metrics: Option<MetricsCollector>,

    config: AclConfig,
}

impl Acl {
    /// Create an engine with the default configuration (root rule `Deny`)
    pub fn new() -> Self {
        Self::with_config(AclConfig::default())
    }

    pub fn with_config(config: AclConfig) -> Self {
        let metrics = if config.enable_metrics {
            Some(MetricsCollector::new())
        } else {
            None
        };

        info!(
            "Acl initialized with default_rule={}, metrics={}",
            config.default_rule, config.enable_metrics
        );

        Self {
            roles: Registry::new(),
            resources: Registry::new(),
            rules: RuleStore::new(config.default_rule),
            metrics,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Register a role below zero or more parent roles
    ///
    /// # Errors
    ///
    /// `AlreadyExists` for a duplicate id, `NotFound` for an unknown parent.
    pub fn add_role(&mut self, role: impl Into<Role>, parents: impl Into<Ids>) -> Result<()> {
        let role = role.into();
        let parents = parents.into();
        let id = role.to_string();

        self.roles.add(role, &parents).inspect_err(|e| {
            warn!("Rejected role '{}': {}", id, e);
        })?;

        info!("Added role '{}' with parents {:?}", id, parents.as_slice());
        Ok(())
    }

    pub fn get_role(&self, id: &str) -> Result<&Role> {
        self.roles.get(id)
    }

    pub fn has_role(&self, id: &str) -> bool {
        self.roles.has(id)
    }

    /// Unregister a role and drop every rule keyed by it
    ///
    /// Rules of its parents and children are left alone; the children only
    /// lose it as a parent.
    pub fn remove_role(&mut self, id: &str) -> Result<Role> {
        let role = self.roles.remove(id)?;
        let purged = self.rules.purge_role(id);

        if let Some(metrics) = &self.metrics {
            metrics.record_removed(purged);
        }

        info!("Removed role '{}' and {} rule(s)", id, purged);
        Ok(role)
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Register a resource below at most one parent resource
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the parent is given as a list, even a
    ///   single-element one
    /// - `AlreadyExists` for a duplicate id, `NotFound` for an unknown parent
    pub fn add_resource(
        &mut self,
        resource: impl Into<Resource>,
        parent: impl Into<Ids>,
    ) -> Result<()> {
        let resource = resource.into();
        let parent = parent.into();
        let id = resource.to_string();

        if parent.is_list() {
            warn!("Rejected resource '{}': parent given as a list", id);
            return Err(AclError::invalid_argument(format!(
                "resource '{}' accepts a single parent, not a list",
                id
            )));
        }

        self.resources.add(resource, &parent).inspect_err(|e| {
            warn!("Rejected resource '{}': {}", id, e);
        })?;

        info!("Added resource '{}' with parent {:?}", id, parent.as_slice());
        Ok(())
    }

    pub fn get_resource(&self, id: &str) -> Result<&Resource> {
        self.resources.get(id)
    }

    pub fn has_resource(&self, id: &str) -> bool {
        self.resources.has(id)
    }

    /// Unregister a resource together with all of its descendants
    ///
    /// Descendants are removed depth-first, each with its rule bucket, before
    /// the resource itself.
    pub fn remove_resource(&mut self, id: &str) -> Result<Resource> {
        let mut removed = 0;
        let resource = self.remove_resource_tree(id, &mut removed)?;

        if let Some(metrics) = &self.metrics {
            metrics.record_removed(removed);
        }

        info!("Removed resource '{}' and {} rule(s)", id, removed);
        Ok(resource)
    }

    fn remove_resource_tree(&mut self, id: &str, removed: &mut usize) -> Result<Resource> {
        let children: Vec<String> = self.resources.get_entry(id)?.children().iter().cloned().collect();

        for child in children {
            if self.resources.has(&child) {
                self.remove_resource_tree(&child, removed)?;
                debug!("Removed descendant resource '{}' of '{}'", child, id);
            }
        }

        *removed += self.rules.purge_resource(id);
        self.resources.remove(id)
    }

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------

    /// Allow roles the privileges on resources and their current descendants
    ///
    /// Omitted resources mean every registered resource plus the wildcard;
    /// omitted privileges mean every privilege. Returns the number of entries
    /// written.
    pub fn allow(
        &mut self,
        roles: impl Into<Ids>,
        resources: impl Into<Ids>,
        privileges: impl Into<Ids>,
    ) -> Result<usize> {
        self.set_rule(RuleOperation::Add, RuleType::Allow, roles, resources, privileges, None)
    }

    /// Deny roles the privileges on resources and their current descendants
    pub fn deny(
        &mut self,
        roles: impl Into<Ids>,
        resources: impl Into<Ids>,
        privileges: impl Into<Ids>,
    ) -> Result<usize> {
        self.set_rule(RuleOperation::Add, RuleType::Deny, roles, resources, privileges, None)
    }

    /// Delete matching allow entries; deny entries are kept
    pub fn remove_allow(
        &mut self,
        roles: impl Into<Ids>,
        resources: impl Into<Ids>,
        privileges: impl Into<Ids>,
    ) -> Result<usize> {
        self.set_rule(RuleOperation::Remove, RuleType::Allow, roles, resources, privileges, None)
    }

    /// Delete matching deny entries; allow entries are kept
    pub fn remove_deny(
        &mut self,
        roles: impl Into<Ids>,
        resources: impl Into<Ids>,
        privileges: impl Into<Ids>,
    ) -> Result<usize> {
        self.set_rule(RuleOperation::Remove, RuleType::Deny, roles, resources, privileges, None)
    }

    /// Like [`Acl::allow`], but the rules only apply while the assertion holds
    pub fn allow_if(
        &mut self,
        roles: impl Into<Ids>,
        resources: impl Into<Ids>,
        privileges: impl Into<Ids>,
        assertion: Arc<dyn Assertion>,
    ) -> Result<usize> {
        self.set_rule(
            RuleOperation::Add,
            RuleType::Allow,
            roles,
            resources,
            privileges,
            Some(assertion),
        )
    }

    /// Like [`Acl::deny`], but the rules only apply while the assertion holds
    pub fn deny_if(
        &mut self,
        roles: impl Into<Ids>,
        resources: impl Into<Ids>,
        privileges: impl Into<Ids>,
        assertion: Arc<dyn Assertion>,
    ) -> Result<usize> {
        self.set_rule(
            RuleOperation::Add,
            RuleType::Deny,
            roles,
            resources,
            privileges,
            Some(assertion),
        )
    }

    /// Add or remove rules for every targeted coordinate
    ///
    /// All roles and resources are resolved before the store is touched, so a
    /// failing call changes nothing. The assertion is ignored on removal.
    ///
    /// # Errors
    ///
    /// `NotFound` for any unknown role or resource.
    pub fn set_rule(
        &mut self,
        operation: RuleOperation,
        kind: RuleType,
        roles: impl Into<Ids>,
        resources: impl Into<Ids>,
        privileges: impl Into<Ids>,
        assertion: Option<Arc<dyn Assertion>>,
    ) -> Result<usize> {
        let targets = RuleTargets::resolve(
            &self.roles,
            &self.resources,
            &roles.into(),
            &resources.into(),
            &privileges.into(),
        )
        .inspect_err(|e| {
            warn!("Rejected {} {}: {}", operation, kind, e);
        })?;

        let affected = mutator::apply(&mut self.rules, operation, kind, &targets, assertion);

        if let Some(metrics) = &self.metrics {
            match operation {
                RuleOperation::Add => metrics.record_written(affected),
                RuleOperation::Remove => metrics.record_removed(affected),
            }
        }

        Ok(affected)
    }

    /// Overwrite the root rule every unmatched request falls back to
    pub fn set_default_rule(&mut self, kind: RuleType) {
        self.rules.set(None, None, None, Rule::new(kind));

        if let Some(metrics) = &self.metrics {
            metrics.record_written(1);
        }

        debug!("Root rule set to {}", kind);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Check whether a role may exercise a privilege on a resource
    ///
    /// `None` role or resource is the wildcard. `None` (or an empty)
    /// privilege asks about every privilege at once.
    ///
    /// # Errors
    ///
    /// `NotFound` if a named role or resource is not registered.
    pub fn is_allowed(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> Result<bool> {
        self.explain(role, resource, privilege)
            .map(|decision| decision.allowed)
    }

    /// Resolve a request and report which rule decided it
    pub fn explain(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        privilege: Option<&str>,
    ) -> Result<Decision> {
        let role = role.map(|id| self.roles.get(id)).transpose()?;
        let resource = resource.map(|id| self.resources.get(id)).transpose()?;
        let privilege = privilege.filter(|p| !p.is_empty());

        let decision =
            Resolver::new(&self.roles, &self.rules).resolve(role, resource, privilege);

        if let Some(metrics) = &self.metrics {
            metrics.record_decision(decision.allowed, decision.is_default());
        }

        debug!(
            "Decision for role={:?} resource={:?} privilege={:?}: {} ({})",
            role.map(|r| r.to_string()),
            resource.map(|r| r.to_string()),
            privilege,
            decision.kind,
            decision.coordinate
        );

        Ok(decision)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn roles(&self) -> &Registry<Role> {
        &self.roles
    }

    pub fn resources(&self) -> &Registry<Resource> {
        &self.resources
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    /// Current counters, `None` when metrics are disabled
    pub fn metrics(&self) -> Option<AclMetrics> {
        self.metrics.as_ref().map(MetricsCollector::snapshot)
    }

    /// Counters in Prometheus text format, `None` when metrics are disabled
    pub fn export_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(MetricsCollector::export_prometheus)
    }
}

impl Default for Acl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog_acl() -> Acl {
        let mut acl = Acl::new();
        acl.add_role("guest", Ids::Unspecified).unwrap();
        acl.add_role("member", "guest").unwrap();
        acl.add_resource("blog", Ids::Unspecified).unwrap();
        acl.add_resource("post", "blog").unwrap();
        acl
    }

    #[test]
    fn test_acl_creation() {
        let acl = Acl::new();

        assert_eq!(acl.config().default_rule, RuleType::Deny);
        assert!(acl.metrics().is_some());
        assert_eq!(acl.rules().len(), 1);
        assert!(!acl.is_allowed(None, None, None).unwrap());
    }

    #[test]
    fn test_add_resource_rejects_parent_list() {
        let mut acl = blog_acl();

        let err = acl.add_resource("comment", ["post"]).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(!acl.has_resource("comment"));
    }

    #[test]
    fn test_duplicate_and_unknown_parent() {
        let mut acl = blog_acl();

        assert!(acl.add_role("guest", Ids::Unspecified).unwrap_err().is_already_exists());
        assert!(acl.add_role("admin", "root").unwrap_err().is_not_found());
        assert!(acl.add_resource("page", "wiki").unwrap_err().is_not_found());
    }

    #[test]
    fn test_allow_then_deny() {
        let mut acl = blog_acl();

        acl.allow("member", "blog", "view").unwrap();
        assert!(acl.is_allowed(Some("member"), Some("blog"), Some("view")).unwrap());

        acl.deny("member", "blog", "view").unwrap();
        assert!(!acl.is_allowed(Some("member"), Some("blog"), Some("view")).unwrap());
    }

    #[test]
    fn test_unknown_ids_in_query() {
        let acl = blog_acl();

        assert!(acl.is_allowed(Some("ghost"), None, None).unwrap_err().is_not_found());
        assert!(acl.is_allowed(None, Some("wiki"), None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_empty_privilege_means_all() {
        let mut acl = blog_acl();
        acl.allow("member", "blog", Ids::Unspecified).unwrap();

        assert!(acl.is_allowed(Some("member"), Some("blog"), Some("")).unwrap());
        assert!(acl.is_allowed(Some("member"), Some("blog"), None).unwrap());
    }

    #[test]
    fn test_set_default_rule() {
        let mut acl = blog_acl();
        acl.set_default_rule(RuleType::Allow);

        let decision = acl.explain(Some("guest"), Some("post"), Some("view")).unwrap();
        assert!(decision.allowed);
        assert!(decision.is_default());
    }

    #[test]
    fn test_metrics_disabled() {
        let acl = Acl::with_config(AclConfig {
            enable_metrics: false,
            ..Default::default()
        });

        acl.is_allowed(None, None, None).unwrap();
        assert!(acl.metrics().is_none());
        assert!(acl.export_metrics().is_none());
    }
}
