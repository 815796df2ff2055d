//! Per-sample experiment output plus the shared causal graph.

use std::path::Path;

use causim_causal::{from_gml, to_gml, CausalGraph, GmlExportOptions};
use causim_core::constants::{OUTCOME_NODE, TREATMENT_NODE};
use causim_core::errors::{CausimResult, SchemaError};
use causim_dynamics::Trajectory;
use serde::{Deserialize, Serialize};

use crate::table::{ColumnData, Table};

/// A sample excluded under [`crate::OnDivergence::Drop`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedSample {
    pub sample: usize,
    pub attempts: usize,
    pub reason: String,
}

/// Per-sample arrays aligned by row, and one graph for all rows.
///
/// `covariates[i]` follows the column order of the graph's
/// `covariate_names`; [`Dataset::validate_schema`] enforces it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub covariates: Vec<Vec<f64>>,
    pub treatments: Vec<bool>,
    pub outcomes: Vec<f64>,
    /// Treated minus untreated outcome; known only because the ground truth
    /// is simulated.
    pub true_effects: Vec<f64>,
    pub propensities: Vec<f64>,
    /// Sample index each row came from. Gaps are dropped samples.
    pub samples: Vec<usize>,
    pub causal_graph: Option<CausalGraph>,
    pub dropped: Vec<DroppedSample>,
    /// Realized trajectories, when requested.
    pub trajectories: Vec<Trajectory<f64>>,
}

/// On-disk form: the graph travels as GML with its covariate names
/// alongside, since GML cannot carry the list.
#[derive(Serialize, Deserialize)]
struct DatasetFile {
    covariates: Vec<Vec<f64>>,
    treatments: Vec<bool>,
    outcomes: Vec<f64>,
    true_effects: Vec<f64>,
    propensities: Vec<f64>,
    #[serde(default)]
    samples: Vec<usize>,
    #[serde(default)]
    dropped: Vec<DroppedSample>,
    covariate_names: Option<Vec<String>>,
    causal_graph_gml: Option<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn covariate_names(&self) -> Option<&[String]> {
        self.causal_graph.as_ref().and_then(CausalGraph::covariate_names)
    }

    /// Covariate columns per row: the graph's count when attached, else the
    /// first row's width.
    pub fn covariate_width(&self) -> usize {
        match self.covariate_names() {
            Some(names) => names.len(),
            None => self.covariates.first().map_or(0, Vec::len),
        }
    }

    pub fn average_true_effect(&self) -> Option<f64> {
        if self.true_effects.is_empty() {
            return None;
        }
        Some(self.true_effects.iter().sum::<f64>() / self.true_effects.len() as f64)
    }

    /// Check that the graph's covariate names line up with the covariate
    /// matrix and every per-sample array has one entry per row.
    pub fn validate_schema(&self) -> Result<(), SchemaError> {
        let graph = self.causal_graph.as_ref().ok_or(SchemaError::MissingGraph)?;
        let names = graph
            .covariate_names()
            .ok_or(SchemaError::MissingCovariateNames)?;

        let rows = self.covariates.len();
        for (column, actual) in [
            ("treatments", self.treatments.len()),
            ("outcomes", self.outcomes.len()),
            ("true_effects", self.true_effects.len()),
            ("propensities", self.propensities.len()),
        ] {
            if actual != rows {
                return Err(SchemaError::LengthMismatch {
                    column: column.to_string(),
                    expected: rows,
                    actual,
                });
            }
        }

        for (row, values) in self.covariates.iter().enumerate() {
            if values.len() != names.len() {
                return Err(SchemaError::CovariateWidth {
                    row,
                    expected: names.len(),
                    actual: values.len(),
                });
            }
        }

        for name in names {
            if !graph.node(name).is_some_and(|n| n.observed) {
                return Err(SchemaError::UnobservedColumn { name: name.clone() });
            }
        }
        Ok(())
    }

    /// Covariate columns named after the graph's observed nodes, then a
    /// boolean `Treatment` and a numeric `Outcome`.
    pub fn to_table(&self) -> Result<Table, SchemaError> {
        self.validate_schema()?;
        let names = self
            .covariate_names()
            .ok_or(SchemaError::MissingCovariateNames)?;

        let mut table = Table::default();
        for (i, name) in names.iter().enumerate() {
            let column = self.covariates.iter().map(|row| row[i]).collect();
            table.push(name.clone(), ColumnData::Float(column));
        }
        table.push(TREATMENT_NODE, ColumnData::Bool(self.treatments.clone()));
        table.push(OUTCOME_NODE, ColumnData::Float(self.outcomes.clone()));
        Ok(table)
    }

    pub fn to_json(&self) -> CausimResult<String> {
        let causal_graph_gml = match &self.causal_graph {
            Some(graph) => Some(to_gml(
                graph,
                &GmlExportOptions {
                    direct_effect_edge: false,
                },
            )?),
            None => None,
        };
        let file = DatasetFile {
            covariates: self.covariates.clone(),
            treatments: self.treatments.clone(),
            outcomes: self.outcomes.clone(),
            true_effects: self.true_effects.clone(),
            propensities: self.propensities.clone(),
            samples: self.samples.clone(),
            dropped: self.dropped.clone(),
            covariate_names: self.covariate_names().map(<[String]>::to_vec),
            causal_graph_gml,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Inverse of [`Dataset::to_json`]; reattaches the covariate names.
    pub fn from_json(text: &str) -> CausimResult<Self> {
        let file: DatasetFile = serde_json::from_str(text)?;
        let causal_graph = match file.causal_graph_gml {
            Some(gml) => {
                let mut graph = from_gml(&gml)?;
                if let Some(names) = file.covariate_names {
                    graph.reattach_covariate_names(names)?;
                }
                Some(graph)
            }
            None => None,
        };
        Ok(Self {
            covariates: file.covariates,
            treatments: file.treatments,
            outcomes: file.outcomes,
            true_effects: file.true_effects,
            propensities: file.propensities,
            samples: file.samples,
            causal_graph,
            dropped: file.dropped,
            trajectories: Vec::new(),
        })
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> CausimResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> CausimResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
