//! States and trajectories.

use causim_core::errors::SimulationError;
use causim_trace::Scalar;

/// A named tuple of scalar variables at one time step.
#[derive(Debug, Clone, PartialEq)]
pub struct State<S> {
    names: &'static [&'static str],
    values: Vec<S>,
}

impl<S: Scalar> State<S> {
    pub fn new(names: &'static [&'static str], values: Vec<S>) -> Result<Self, SimulationError> {
        if names.len() != values.len() {
            return Err(SimulationError::StateArity {
                expected: names.len(),
                actual: values.len(),
            });
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn values(&self) -> &[S] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<S> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, S)> + '_ {
        self.names.iter().copied().zip(self.values.iter().copied())
    }

    /// Drop provenance.
    pub fn to_plain(&self) -> State<f64> {
        State {
            names: self.names,
            values: self.values.iter().map(|v| v.value()).collect(),
        }
    }
}

/// Contiguous states from `start_step` through `last_step()`, one per step.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<S> {
    start_step: usize,
    states: Vec<State<S>>,
}

impl<S: Scalar> Trajectory<S> {
    pub fn new(start_step: usize, initial: State<S>) -> Self {
        Self {
            start_step,
            states: vec![initial],
        }
    }

    pub fn start_step(&self) -> usize {
        self.start_step
    }

    pub fn last_step(&self) -> usize {
        self.start_step + self.states.len() - 1
    }

    pub fn last(&self) -> &State<S> {
        // A trajectory is never empty: `new` seeds it with the initial state.
        &self.states[self.states.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn push(&mut self, state: State<S>) {
        self.states.push(state);
    }

    pub fn state_at(&self, step: usize) -> Option<&State<S>> {
        step.checked_sub(self.start_step)
            .and_then(|offset| self.states.get(offset))
    }

    /// Value of `name` at `step`, if both exist.
    pub fn value(&self, name: &str, step: usize) -> Option<S> {
        self.state_at(step).and_then(|s| s.get(name))
    }

    pub fn states(&self) -> &[State<S>] {
        &self.states
    }

    /// Values of one variable across the whole trajectory.
    pub fn series(&self, name: &str) -> Vec<f64> {
        self.states
            .iter()
            .filter_map(|s| s.get(name).map(Scalar::value))
            .collect()
    }

    /// Drop provenance.
    pub fn to_plain(&self) -> Trajectory<f64> {
        Trajectory {
            start_step: self.start_step,
            states: self.states.iter().map(State::to_plain).collect(),
        }
    }
}
