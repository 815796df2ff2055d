//! # causim-core
//!
//! Foundation crate for the causim workspace.
//! Defines errors, config, constants, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing_setup;

pub use config::CausimConfig;
pub use errors::{CausimError, CausimErrorCode, CausimResult};
