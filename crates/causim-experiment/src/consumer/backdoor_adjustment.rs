//! Built-in consumer: backdoor screening on the parsed graph, then an OLS
//! regression of the outcome on treatment plus the adjustment set.
//!
//! Uses `nalgebra` for the least-squares solve and Student-t critical
//! values via `statrs` for the interval.

use causim_causal::{analyze, from_gml};
use causim_core::errors::ConsumerError;
use nalgebra as na;
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{ConsumerReport, Estimate, GraphConsumer};
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdoorAdjustment {
    /// Two-sided confidence level of the reported interval.
    pub confidence: f64,
}

impl Default for BackdoorAdjustment {
    fn default() -> Self {
        Self { confidence: 0.95 }
    }
}

impl GraphConsumer for BackdoorAdjustment {
    fn name(&self) -> &str {
        "backdoor_adjustment"
    }

    fn estimate(
        &self,
        graph_gml: &str,
        table: &Table,
        treatment: &str,
        outcome: &str,
    ) -> Result<ConsumerReport, ConsumerError> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(estimation(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        let graph = from_gml(graph_gml).map_err(|e| estimation(e.to_string()))?;
        let report = analyze(&graph);

        // Adjust in table column order so the design matrix is stable.
        let adjust: Vec<&str> = table
            .column_names()
            .into_iter()
            .filter(|name| report.adjustment_set.contains(*name))
            .collect();
        if let Some(missing) = report
            .adjustment_set
            .iter()
            .find(|name| table.column(name).is_none())
        {
            return Err(ConsumerError::MissingColumn {
                name: missing.clone(),
            });
        }

        let y = table.numeric(outcome)?;
        let mut regressors = vec![table.numeric(treatment)?];
        for name in &adjust {
            regressors.push(table.numeric(name)?);
        }
        let fit = ols(&y, &regressors)?;
        let value = fit.coefficients[1];
        let std_error = fit.std_errors[1];

        let t = StudentsT::new(0.0, 1.0, fit.df as f64)
            .map_err(|e| estimation(format!("invalid t distribution: {e}")))?;
        let critical = t.inverse_cdf(1.0 - (1.0 - self.confidence) / 2.0);

        let estimand = if adjust.is_empty() {
            format!("E[{outcome} | do({treatment})] = E[{outcome} | {treatment}]")
        } else {
            format!(
                "E[{outcome} | do({treatment})] = E_W[E[{outcome} | {treatment}, W]], W = {{{}}}",
                adjust.join(", ")
            )
        };
        tracing::debug!(%estimand, value, std_error, "backdoor estimate");

        Ok(ConsumerReport {
            estimand,
            estimate: Some(Estimate {
                value,
                std_error,
                ci_low: value - critical * std_error,
                ci_high: value + critical * std_error,
                confidence: self.confidence,
            }),
            warnings: report.warnings(),
        })
    }
}

fn estimation(message: impl Into<String>) -> ConsumerError {
    ConsumerError::Estimation {
        message: message.into(),
    }
}

/// Ordinary least squares fit with an intercept.
#[derive(Debug, Clone)]
pub(crate) struct OlsFit {
    /// Intercept first, then one per regressor.
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub df: usize,
}

/// Regress `y` on an intercept plus `regressors`. Coefficients come from an
/// LU solve of the normal equations; standard errors from the diagonal of
/// `(X'X)^-1`.
pub(crate) fn ols(y: &[f64], regressors: &[Vec<f64>]) -> Result<OlsFit, ConsumerError> {
    let n = y.len();
    let k = regressors.len() + 1;
    if regressors.iter().any(|r| r.len() != n) {
        return Err(estimation("regressor length differs from outcome length"));
    }
    if n <= k {
        return Err(estimation(format!(
            "{n} rows cannot identify {k} coefficients"
        )));
    }

    let x = na::DMatrix::from_fn(n, k, |i, j| if j == 0 { 1.0 } else { regressors[j - 1][i] });
    let y = na::DVector::from_column_slice(y);
    let singular = || estimation("design matrix is singular; treatment or a covariate is collinear");

    // Rank check on X itself; the normal equations square its condition number.
    let singular_values = x.clone().svd(false, false).singular_values;
    let largest = singular_values.iter().fold(0.0_f64, |acc, &s| acc.max(s));
    if singular_values.iter().any(|&s| s <= largest * 1e-10) {
        return Err(singular());
    }

    let xtx = x.tr_mul(&x);
    let beta = xtx.clone().lu().solve(&x.tr_mul(&y)).ok_or_else(singular)?;
    let xtx_inv = xtx.try_inverse().ok_or_else(singular)?;

    let rss = (&y - &x * &beta).norm_squared();
    let df = n - k;
    let sigma2 = rss / df as f64;
    let std_errors = (0..k)
        .map(|j| (sigma2 * xtx_inv[(j, j)]).max(0.0).sqrt())
        .collect();

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        df,
    })
}
