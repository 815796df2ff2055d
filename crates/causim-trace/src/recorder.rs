//! The seam between numeric code and tracing.
//!
//! Simulator and experiment code take a `R: Recorder` and never construct
//! scalars directly, so one definition runs untraced for every sample and
//! traced for the representative one.

use crate::scalar::Scalar;
use crate::tape::{Tag, Tape};
use crate::var::Var;

pub trait Recorder {
    type Scalar: Scalar;

    /// Lift a constant. Constants carry no provenance.
    fn constant(&self, value: f64) -> Self::Scalar;

    /// Mark `value` as the named quantity `tag` (a read or write).
    fn record(&self, tag: Tag, value: Self::Scalar) -> Self::Scalar;

    /// A fresh named input with no dependencies, e.g. a sampled initial state.
    fn input(&self, tag: Tag, value: f64) -> Self::Scalar;

    /// A named value whose dependencies are given explicitly rather than
    /// through arithmetic, e.g. a parameter switched by the treatment draw.
    fn derived(&self, tag: Tag, value: f64, parents: &[Self::Scalar]) -> Self::Scalar;

    /// Register `value` as the next covariate column.
    fn covariate(&self, value: Self::Scalar);

    /// Whether this recorder keeps a trace.
    fn is_tracing(&self) -> bool;
}

/// Plain `f64` execution with no bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Untraced;

impl Recorder for Untraced {
    type Scalar = f64;

    #[inline]
    fn constant(&self, value: f64) -> f64 {
        value
    }

    #[inline]
    fn record(&self, _tag: Tag, value: f64) -> f64 {
        value
    }

    #[inline]
    fn input(&self, _tag: Tag, value: f64) -> f64 {
        value
    }

    #[inline]
    fn derived(&self, _tag: Tag, value: f64, _parents: &[f64]) -> f64 {
        value
    }

    #[inline]
    fn covariate(&self, _value: f64) {}

    fn is_tracing(&self) -> bool {
        false
    }
}

/// Records every operation into a [`Tape`].
#[derive(Debug, Clone, Copy)]
pub struct Tracer<'t> {
    tape: &'t Tape,
}

impl<'t> Tracer<'t> {
    pub fn new(tape: &'t Tape) -> Self {
        Self { tape }
    }

    pub fn tape(&self) -> &'t Tape {
        self.tape
    }
}

impl<'t> Recorder for Tracer<'t> {
    type Scalar = Var<'t>;

    fn constant(&self, value: f64) -> Var<'t> {
        self.tape.push(value, &[], None)
    }

    fn record(&self, tag: Tag, value: Var<'t>) -> Var<'t> {
        self.tape.tag(tag, value)
    }

    fn input(&self, tag: Tag, value: f64) -> Var<'t> {
        self.tape.push(value, &[], Some(tag))
    }

    fn derived(&self, tag: Tag, value: f64, parents: &[Var<'t>]) -> Var<'t> {
        let mut indices: Vec<usize> = parents.iter().map(Var::index).collect();
        indices.sort_unstable();
        indices.dedup();
        self.tape.push(value, &indices, Some(tag))
    }

    fn covariate(&self, value: Var<'t>) {
        self.tape.push_covariate(value.index());
    }

    fn is_tracing(&self) -> bool {
        true
    }
}
