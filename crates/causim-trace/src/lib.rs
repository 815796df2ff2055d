//! # causim-trace
//!
//! Execution tracing for numeric code. A [`Var`] carries provenance (its node
//! on a [`Tape`]) through every arithmetic operation; simulator and user code
//! are written once against the [`Scalar`] and [`Recorder`] traits and run
//! either untraced (`f64`) or traced (`Var`).

pub mod recorder;
pub mod scalar;
pub mod tape;
pub mod var;

pub use recorder::{Recorder, Tracer, Untraced};
pub use scalar::Scalar;
pub use tape::{Tag, Tape, TapeNode, TapeRecord};
pub use var::Var;
