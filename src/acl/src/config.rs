//! Engine configuration

use crate::rules::RuleType;
use serde::{Deserialize, Serialize};

/// Access-control engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Verdict of the root rule when the engine is created
    pub default_rule: RuleType,

    /// Enable decision and mutation counters
    pub enable_metrics: bool,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            default_rule: RuleType::Deny,
            enable_metrics: true,
        }
    }
}
