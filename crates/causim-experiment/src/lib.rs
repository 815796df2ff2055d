//! # causim-experiment
//!
//! Reproducible causal experiments over a simulator: an
//! [`ExperimentDesign`] supplies the state sampler, propensity scorer,
//! outcome extractor and covariate builder; the run executor draws samples,
//! assigns treatment, simulates both arms, and traces one representative
//! sample into a [`causim_causal::CausalGraph`]. The resulting [`Dataset`]
//! is handed to a [`GraphConsumer`] after a schema check.

pub mod consumer;
pub mod dataset;
pub mod design;
pub mod experiment;
pub mod options;
pub mod presets;
pub mod runner;
pub mod table;

pub use consumer::{handoff, BackdoorAdjustment, ConsumerReport, Estimate, GraphConsumer, HandoffPolicy};
pub use dataset::{Dataset, DroppedSample};
pub use design::ExperimentDesign;
pub use experiment::Experiment;
pub use options::{OnDivergence, RunOptions};
pub use runner::{derive_seed, run, run_parallel};
pub use table::{Column, ColumnData, Table};
