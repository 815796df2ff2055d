//! Top-level causim configuration with layered resolution.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DivergencePolicy, GraphConfig, ObservabilityConfig, RunConfig};
use crate::constants::{ENV_PREFIX, PROJECT_CONFIG_FILE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (applied via [`ConfigOverrides`])
/// 2. Environment variables (`CAUSIM_*`)
/// 3. Project config (`causim.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CausimConfig {
    pub run: RunConfig,
    pub graph: GraphConfig,
    pub observability: ObservabilityConfig,
}

/// Caller-supplied overrides, the highest-priority layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub num_samples: Option<usize>,
    pub seed: Option<u64>,
    pub parallel: Option<bool>,
    pub divergence_policy: Option<DivergencePolicy>,
    pub continue_on_warnings: Option<bool>,
}

impl CausimConfig {
    /// Load configuration from `root/causim.toml`, the process environment,
    /// and `overrides`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let project_path = root.join(PROJECT_CONFIG_FILE);
        let mut config = if project_path.exists() {
            Self::from_file(&project_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing and embedding).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `CAUSIM_*` environment overrides using `lookup` to read variables.
    ///
    /// Pattern: `CAUSIM_RUN_NUM_SAMPLES`, `CAUSIM_GRAPH_DIRECT_EFFECT_EDGE`, etc.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        if let Some(v) = get("RUN_NUM_SAMPLES") {
            self.run.num_samples = parse_env("run.num_samples", &v)?;
        }
        if let Some(v) = get("RUN_SEED") {
            self.run.seed = parse_env("run.seed", &v)?;
        }
        if let Some(v) = get("RUN_PARALLEL") {
            self.run.parallel = parse_env("run.parallel", &v)?;
        }
        if let Some(v) = get("RUN_CAUSAL_GRAPH") {
            self.run.causal_graph = parse_env("run.causal_graph", &v)?;
        }
        if let Some(v) = get("RUN_DIVERGENCE_POLICY") {
            self.run.divergence_policy = match v.to_ascii_lowercase().as_str() {
                "drop" => DivergencePolicy::Drop,
                "retry" => DivergencePolicy::Retry,
                "abort" => DivergencePolicy::Abort,
                other => {
                    return Err(ConfigError::ValidationFailed {
                        field: "run.divergence_policy".to_string(),
                        message: format!("unknown policy '{other}'"),
                    })
                }
            };
        }
        if let Some(v) = get("RUN_MAX_RETRIES") {
            self.run.max_retries = parse_env("run.max_retries", &v)?;
        }
        if let Some(v) = get("RUN_DIVERGENCE_THRESHOLD") {
            self.run.divergence_threshold = Some(parse_env("run.divergence_threshold", &v)?);
        }
        if let Some(v) = get("GRAPH_DIRECT_EFFECT_EDGE") {
            self.graph.direct_effect_edge = parse_env("graph.direct_effect_edge", &v)?;
        }
        if let Some(v) = get("GRAPH_CONTINUE_ON_WARNINGS") {
            self.graph.continue_on_warnings = parse_env("graph.continue_on_warnings", &v)?;
        }
        if let Some(v) = get("OBSERVABILITY_LOG_LEVEL") {
            self.observability.log_level = v;
        }
        Ok(())
    }

    /// Apply programmatic overrides (highest priority).
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.num_samples {
            self.run.num_samples = v;
        }
        if let Some(v) = overrides.seed {
            self.run.seed = v;
        }
        if let Some(v) = overrides.parallel {
            self.run.parallel = v;
        }
        if let Some(v) = overrides.divergence_policy {
            self.run.divergence_policy = v;
        }
        if let Some(v) = overrides.continue_on_warnings {
            self.graph.continue_on_warnings = v;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.num_samples == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "run.num_samples".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.run.divergence_policy == DivergencePolicy::Retry && self.run.max_retries == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "run.max_retries".to_string(),
                message: "must be greater than 0 when divergence_policy = \"retry\"".to_string(),
            });
        }
        if let Some(threshold) = self.run.divergence_threshold {
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "run.divergence_threshold".to_string(),
                    message: "must be a positive finite number".to_string(),
                });
            }
        }
        match self.observability.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationFailed {
                    field: "observability.log_level".to_string(),
                    message: format!("unknown level '{other}'"),
                })
            }
        }
        Ok(())
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn parse_env<T: FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::ValidationFailed {
            field: field.to_string(),
            message: format!("cannot parse '{raw}'"),
        })
}
