//! Lotka–Volterra predator–prey dynamics.
//!
//! ```text
//! d(rabbits)/dt = rabbit_growth * rabbits - rabbit_death * rabbits * foxes
//! d(foxes)/dt   = fox_growth * rabbits * foxes - fox_death * foxes
//! ```

use std::collections::BTreeMap;

use causim_trace::Scalar;

use crate::config::SimConfig;
use crate::dynamics::Dynamics;

pub const RABBITS: &str = "rabbits";
pub const FOXES: &str = "foxes";

pub const RABBIT_GROWTH: &str = "rabbit_growth";
pub const RABBIT_DEATH: &str = "rabbit_death";
pub const FOX_GROWTH: &str = "fox_growth";
pub const FOX_DEATH: &str = "fox_death";

const STATE_NAMES: &[&str] = &[RABBITS, FOXES];
const PARAM_NAMES: &[&str] = &[RABBIT_GROWTH, RABBIT_DEATH, FOX_GROWTH, FOX_DEATH];

#[derive(Debug, Clone, Copy, Default)]
pub struct LotkaVolterra;

impl LotkaVolterra {
    /// Default parameters: growth 0.3 / death 0.015 for rabbits,
    /// growth 0.015 / death 0.7 for foxes.
    pub fn default_config(end_time: usize) -> SimConfig {
        let params: BTreeMap<String, f64> = [
            (RABBIT_GROWTH, 0.3),
            (RABBIT_DEATH, 0.015),
            (FOX_GROWTH, 0.015),
            (FOX_DEATH, 0.7),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        SimConfig::new(params, end_time)
    }
}

impl Dynamics for LotkaVolterra {
    fn state_names(&self) -> &'static [&'static str] {
        STATE_NAMES
    }

    fn param_names(&self) -> &'static [&'static str] {
        PARAM_NAMES
    }

    fn derivative<S: Scalar>(&self, params: &[S], state: &[S]) -> Vec<S> {
        let (alpha, beta, delta, gamma) = (params[0], params[1], params[2], params[3]);
        let (rabbits, foxes) = (state[0], state[1]);
        let encounters = rabbits * foxes;
        vec![
            alpha * rabbits - beta * encounters,
            delta * encounters - gamma * foxes,
        ]
    }
}
