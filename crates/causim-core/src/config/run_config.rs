use serde::{Deserialize, Serialize};

use super::defaults;

/// What the run executor does with a sample whose simulation diverges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DivergencePolicy {
    /// Exclude the sample and record it in the dataset's drop list.
    Drop,
    /// Redraw the sample up to `max_retries` times, then fail.
    #[default]
    Retry,
    /// Fail the whole experiment on the first divergence.
    Abort,
}

/// Run executor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of independent draws.
    pub num_samples: usize,
    /// Master seed for the pseudo-random generator.
    pub seed: u64,
    /// Execute samples on the rayon pool with per-sample derived seeds.
    pub parallel: bool,
    /// Trace the representative sample and attach a causal graph.
    pub causal_graph: bool,
    pub divergence_policy: DivergencePolicy,
    /// Attempts per sample under `DivergencePolicy::Retry`.
    pub max_retries: usize,
    /// Magnitude above which a state value counts as a blow-up. Unset keeps
    /// each experiment's own simulator threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence_threshold: Option<f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_samples: defaults::DEFAULT_NUM_SAMPLES,
            seed: defaults::DEFAULT_SEED,
            parallel: defaults::DEFAULT_PARALLEL,
            causal_graph: defaults::DEFAULT_CAUSAL_GRAPH,
            divergence_policy: DivergencePolicy::default(),
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            divergence_threshold: None,
        }
    }
}
