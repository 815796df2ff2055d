//! Run executor options.

use causim_core::config::{CausimConfig, DivergencePolicy, RunConfig};
use causim_core::errors::ExperimentError;
use causim_dynamics::SimConfig;
use serde::{Deserialize, Serialize};

/// What to do with a sample whose simulation diverges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum OnDivergence {
    /// Exclude the sample and record it in [`crate::Dataset::dropped`].
    Drop,
    /// Redraw up to `max_attempts` times, then fail the experiment.
    Retry { max_attempts: usize },
    /// Fail the experiment on the first divergence.
    Abort,
}

impl OnDivergence {
    pub fn from_policy(policy: DivergencePolicy, max_retries: usize) -> Self {
        match policy {
            DivergencePolicy::Drop => Self::Drop,
            DivergencePolicy::Retry => Self::Retry {
                max_attempts: max_retries,
            },
            DivergencePolicy::Abort => Self::Abort,
        }
    }

    pub(crate) fn max_attempts(&self) -> usize {
        match self {
            Self::Retry { max_attempts } => (*max_attempts).max(1),
            Self::Drop | Self::Abort => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    pub num_samples: usize,
    pub seed: u64,
    /// Trace the first accepted sample and attach a causal graph.
    pub causal_graph: bool,
    pub parallel: bool,
    pub divergence: OnDivergence,
    /// Replaces the experiment config's threshold when set.
    pub divergence_threshold: Option<f64>,
    /// Run the time-order and endpoint checks on the built graph.
    pub validate_time_order: bool,
    /// Keep every realized trajectory in the dataset.
    pub keep_trajectories: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

impl From<&RunConfig> for RunOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            num_samples: config.num_samples,
            seed: config.seed,
            causal_graph: config.causal_graph,
            parallel: config.parallel,
            divergence: OnDivergence::from_policy(config.divergence_policy, config.max_retries),
            divergence_threshold: config.divergence_threshold,
            validate_time_order: true,
            keep_trajectories: false,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &CausimConfig) -> Self {
        Self {
            validate_time_order: config.graph.validate_time_order,
            ..Self::from(&config.run)
        }
    }

    pub fn with_samples(mut self, num_samples: usize) -> Self {
        self.num_samples = num_samples;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.num_samples == 0 {
            return Err(ExperimentError::NoSamples);
        }
        Ok(())
    }

    /// The simulator configuration a run actually uses.
    pub(crate) fn sim_config(&self, base: &SimConfig) -> SimConfig {
        let mut config = base.clone();
        if let Some(threshold) = self.divergence_threshold {
            config.divergence_threshold = threshold;
        }
        config
    }
}
