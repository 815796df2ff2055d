// Single source of truth for all default values.

// --- Run ---
pub const DEFAULT_NUM_SAMPLES: usize = 100;
pub const DEFAULT_SEED: u64 = 1234;
pub const DEFAULT_PARALLEL: bool = false;
pub const DEFAULT_CAUSAL_GRAPH: bool = true;
pub const DEFAULT_MAX_RETRIES: usize = 10;
pub const DEFAULT_DIVERGENCE_THRESHOLD: f64 = 1e12;

// --- Graph ---
pub const DEFAULT_DIRECT_EFFECT_EDGE: bool = true;
pub const DEFAULT_VALIDATE_TIME_ORDER: bool = true;
pub const DEFAULT_CONTINUE_ON_WARNINGS: bool = false;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
