//! Configuration system for causim.
//! TOML-based, layered resolution: overrides > env > project file > defaults.

pub mod causim_config;
pub mod defaults;
pub mod graph_config;
pub mod observability_config;
pub mod run_config;

pub use causim_config::{CausimConfig, ConfigOverrides};
pub use graph_config::GraphConfig;
pub use observability_config::ObservabilityConfig;
pub use run_config::{DivergencePolicy, RunConfig};
