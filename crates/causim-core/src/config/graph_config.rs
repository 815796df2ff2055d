use serde::{Deserialize, Serialize};

use super::defaults;

/// Causal graph export and handoff configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Add a Treatment -> Outcome edge before export.
    pub direct_effect_edge: bool,
    /// Reject graphs with an edge going backward in time.
    pub validate_time_order: bool,
    /// Proceed past identification warnings from the graph consumer.
    pub continue_on_warnings: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            direct_effect_edge: defaults::DEFAULT_DIRECT_EFFECT_EDGE,
            validate_time_order: defaults::DEFAULT_VALIDATE_TIME_ORDER,
            continue_on_warnings: defaults::DEFAULT_CONTINUE_ON_WARNINGS,
        }
    }
}
