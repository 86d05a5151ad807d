//! Property-based tests for rule resolution

mod common;

use hieracl::{Acl, Ids};
use proptest::prelude::*;
use std::collections::HashSet;

/// Role `r{i}` may only take parents among `r0..r{i-1}`, so the graph stays acyclic
fn role_dag() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..8).prop_flat_map(|count| {
        (0..count)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    proptest::sample::subsequence((0..i).collect::<Vec<_>>(), 0..=i.min(3)).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn build_roles(acl: &mut Acl, dag: &[Vec<usize>]) {
    for (i, parents) in dag.iter().enumerate() {
        let parents: Vec<String> = parents.iter().map(|p| format!("r{}", p)).collect();
        acl.add_role(format!("r{}", i), parents).unwrap();
    }
}

fn inherits_from(dag: &[Vec<usize>], role: usize, ancestor: usize) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![role];
    while let Some(current) = stack.pop() {
        if current == ancestor {
            return true;
        }
        if seen.insert(current) {
            stack.extend(dag[current].iter().copied());
        }
    }
    false
}

proptest! {
    #[test]
    fn prop_allow_then_deny(privilege in "[a-z]{1,8}", depth in 1usize..5) {
        common::init_tracing();

        let mut acl = Acl::new();
        acl.add_role("user", Ids::Unspecified).unwrap();
        acl.add_resource("n0", Ids::Unspecified).unwrap();
        for level in 1..depth {
            acl.add_resource(format!("n{}", level), format!("n{}", level - 1)).unwrap();
        }
        let leaf = format!("n{}", depth - 1);

        prop_assert!(!acl.is_allowed(Some("user"), Some(leaf.as_str()), Some(privilege.as_str())).unwrap());

        acl.allow("user", leaf.as_str(), privilege.as_str()).unwrap();
        prop_assert!(acl.is_allowed(Some("user"), Some(leaf.as_str()), Some(privilege.as_str())).unwrap());

        acl.deny("user", leaf.as_str(), privilege.as_str()).unwrap();
        prop_assert!(!acl.is_allowed(Some("user"), Some(leaf.as_str()), Some(privilege.as_str())).unwrap());
    }

    #[test]
    fn prop_allow_reaches_existing_descendants(depth in 1usize..6, target in 0usize..6) {
        let target = target % depth;

        let mut acl = Acl::new();
        acl.add_role("user", Ids::Unspecified).unwrap();
        acl.add_resource("n0", Ids::Unspecified).unwrap();
        for level in 1..depth {
            acl.add_resource(format!("n{}", level), format!("n{}", level - 1)).unwrap();
        }

        acl.allow("user", format!("n{}", target), "read").unwrap();

        for level in 0..depth {
            let resource = format!("n{}", level);
            let allowed = acl.is_allowed(Some("user"), Some(resource.as_str()), Some("read")).unwrap();
            prop_assert_eq!(allowed, level >= target);
        }
    }

    #[test]
    fn prop_role_inheritance_follows_ancestry(dag in role_dag(), granted in 0usize..8) {
        let granted = granted % dag.len();

        let mut acl = Acl::new();
        build_roles(&mut acl, &dag);
        acl.add_resource("doc", Ids::Unspecified).unwrap();
        acl.allow(format!("r{}", granted), "doc", "read").unwrap();

        for role in 0..dag.len() {
            let id = format!("r{}", role);
            let allowed = acl.is_allowed(Some(id.as_str()), Some("doc"), Some("read")).unwrap();
            prop_assert_eq!(allowed, inherits_from(&dag, role, granted));
        }
    }

    #[test]
    fn prop_failed_bulk_write_is_atomic(dag in role_dag(), privileges in proptest::collection::vec("[a-z]{1,5}", 0..4)) {
        let mut acl = Acl::new();
        build_roles(&mut acl, &dag);
        acl.add_resource("doc", Ids::Unspecified).unwrap();

        let before = acl.rules().len();
        let mut roles: Vec<String> = (0..dag.len()).map(|i| format!("r{}", i)).collect();
        roles.push("missing".to_string());

        prop_assert!(acl.allow(roles, "doc", privileges).unwrap_err().is_not_found());
        prop_assert_eq!(acl.rules().len(), before);
        prop_assert!(!acl.rules().has_resource_rules("doc"));
    }
}
