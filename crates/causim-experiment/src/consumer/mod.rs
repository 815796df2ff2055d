//! Handing a dataset and its graph to a causal-inference engine.

mod backdoor_adjustment;

pub use backdoor_adjustment::BackdoorAdjustment;

use causim_causal::{to_gml, GmlExportOptions};
use causim_core::config::GraphConfig;
use causim_core::constants::{OUTCOME_NODE, TREATMENT_NODE};
use causim_core::errors::{CausimResult, ConsumerError, SchemaError};
use causim_core::handoff_span;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::table::Table;

/// A point estimate with its confidence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub value: f64,
    pub std_error: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerReport {
    /// Identified estimand, in the consumer's notation.
    pub estimand: String,
    pub estimate: Option<Estimate>,
    /// Identification warnings, e.g. unobserved confounders.
    pub warnings: Vec<String>,
}

/// An external graphical causal-inference engine.
pub trait GraphConsumer {
    fn name(&self) -> &str;

    /// Identify and estimate the effect of `treatment` on `outcome` from a
    /// GML graph and a table whose covariate columns are named after the
    /// graph's observed nodes.
    fn estimate(
        &self,
        graph_gml: &str,
        table: &Table,
        treatment: &str,
        outcome: &str,
    ) -> Result<ConsumerReport, ConsumerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffPolicy {
    /// Add Treatment -> Outcome to the exported graph.
    pub direct_effect_edge: bool,
    /// Return the report despite identification warnings.
    pub continue_on_warnings: bool,
}

impl Default for HandoffPolicy {
    fn default() -> Self {
        Self::from(&GraphConfig::default())
    }
}

impl From<&GraphConfig> for HandoffPolicy {
    fn from(config: &GraphConfig) -> Self {
        Self {
            direct_effect_edge: config.direct_effect_edge,
            continue_on_warnings: config.continue_on_warnings,
        }
    }
}

/// Check the schema, export the graph, run `consumer`, and surface its
/// warnings. Warnings are fatal unless `policy.continue_on_warnings`.
pub fn handoff<C: GraphConsumer + ?Sized>(
    dataset: &Dataset,
    consumer: &C,
    policy: &HandoffPolicy,
) -> CausimResult<ConsumerReport> {
    let span = handoff_span!(consumer.name(), dataset.len());
    let _guard = span.enter();

    dataset.validate_schema()?;
    let table = dataset.to_table()?;
    let graph = dataset
        .causal_graph
        .as_ref()
        .ok_or(SchemaError::MissingGraph)?;
    let gml = to_gml(
        graph,
        &GmlExportOptions {
            direct_effect_edge: policy.direct_effect_edge,
        },
    )?;

    let report = consumer.estimate(&gml, &table, TREATMENT_NODE, OUTCOME_NODE)?;
    for warning in &report.warnings {
        tracing::warn!(consumer = consumer.name(), %warning, "identification warning");
    }
    if !report.warnings.is_empty() && !policy.continue_on_warnings {
        return Err(ConsumerError::IdentificationBlocked {
            warnings: report.warnings,
        }
        .into());
    }
    Ok(report)
}
