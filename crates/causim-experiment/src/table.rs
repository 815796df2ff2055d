//! Flat tabular view of a dataset for graph consumers.

use causim_core::errors::ConsumerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Float(Vec<f64>),
    Bool(Vec<bool>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row `i` as a float; booleans map to 0/1.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            Self::Float(v) => v.get(i).copied(),
            Self::Bool(v) => v.get(i).map(|&b| if b { 1.0 } else { 0.0 }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Column-major table. Covariate columns are named after graph nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    pub fn push(&mut self, name: impl Into<String>, data: ColumnData) {
        self.columns.push(Column {
            name: name.into(),
            data,
        });
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric view of column `name`.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>, ConsumerError> {
        let column = self.column(name).ok_or_else(|| ConsumerError::MissingColumn {
            name: name.to_string(),
        })?;
        Ok((0..column.data.len())
            .filter_map(|i| column.data.get_f64(i))
            .collect())
    }

    /// Comma-separated rendering with a header row.
    pub fn to_csv(&self) -> String {
        let mut out = self.column_names().join(",");
        out.push('\n');
        for row in 0..self.num_rows() {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| match &c.data {
                    ColumnData::Float(v) => v.get(row).map(f64::to_string).unwrap_or_default(),
                    ColumnData::Bool(v) => v.get(row).map(bool::to_string).unwrap_or_default(),
                })
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }
}
