//! # causim-dynamics
//!
//! The simulator collaborator: a [`Dynamics`] trait for continuous-time
//! systems, fixed-step integrators, and a [`Simulator`] that steps a state
//! through time under a [`SimConfig`], reading every parameter per step so a
//! mid-run override lands on its own per-step parameter node.

pub mod config;
pub mod dynamics;
pub mod integrator;
pub mod intervention;
pub mod lotka_volterra;
pub mod simulator;
pub mod state;

pub use config::{Integrator, SimConfig};
pub use dynamics::Dynamics;
pub use intervention::{Intervention, ParamOverride};
pub use lotka_volterra::LotkaVolterra;
pub use simulator::Simulator;
pub use state::{State, Trajectory};
