//! Span definitions per operation: run, sample, graph build, export, handoff.

/// Create a run span.
#[macro_export]
macro_rules! run_span {
    ($experiment:expr, $num_samples:expr) => {
        tracing::info_span!("causim.run", experiment = %$experiment, num_samples = $num_samples)
    };
}

/// Create a per-sample span.
#[macro_export]
macro_rules! sample_span {
    ($index:expr, $attempt:expr) => {
        tracing::debug_span!("causim.sample", index = $index, attempt = $attempt)
    };
}

/// Create a graph-build span.
#[macro_export]
macro_rules! graph_build_span {
    ($tape_len:expr) => {
        tracing::info_span!("causim.graph_build", tape_len = $tape_len)
    };
}

/// Create a handoff span.
#[macro_export]
macro_rules! handoff_span {
    ($consumer:expr, $rows:expr) => {
        tracing::info_span!("causim.handoff", consumer = %$consumer, rows = $rows)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RUN: &str = "causim.run";
    pub const SAMPLE: &str = "causim.sample";
    pub const GRAPH_BUILD: &str = "causim.graph_build";
    pub const HANDOFF: &str = "causim.handoff";
}
