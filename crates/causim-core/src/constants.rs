/// Name of the synthetic treatment node in every causal graph.
pub const TREATMENT_NODE: &str = "Treatment";

/// Name of the synthetic outcome node in every causal graph.
pub const OUTCOME_NODE: &str = "Outcome";

/// Environment variable read by [`crate::tracing_setup::init_tracing`].
pub const LOG_ENV_VAR: &str = "CAUSIM_LOG";

/// Project-level config file looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "causim.toml";

/// Prefix for environment overrides, e.g. `CAUSIM_RUN_NUM_SAMPLES`.
pub const ENV_PREFIX: &str = "CAUSIM_";

/// Name used for a (variable, step) or (parameter, step) node.
pub fn step_node_name(variable: &str, step: usize) -> String {
    format!("{variable}_{step}")
}
