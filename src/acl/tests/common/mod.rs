//! Common test utilities shared across integration tests

#![allow(dead_code)]

use hieracl::{Acl, Ids};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Roles `guest` ← `member` ← `admin` without any resources
pub fn role_chain() -> Acl {
    init_tracing();

    let mut acl = Acl::new();
    acl.add_role("guest", Ids::Unspecified).unwrap();
    acl.add_role("member", "guest").unwrap();
    acl.add_role("admin", "member").unwrap();
    acl
}

/// [`role_chain`] plus resources `blog` ← `post`
pub fn blog_acl() -> Acl {
    let mut acl = role_chain();
    acl.add_resource("blog", Ids::Unspecified).unwrap();
    acl.add_resource("post", "blog").unwrap();
    acl
}

pub fn allowed(acl: &Acl, role: &str, resource: &str, privilege: &str) -> bool {
    acl.is_allowed(Some(role), Some(resource), Some(privilege))
        .unwrap()
}
