//! The recording tape: an append-only arena of traced values.
//!
//! Node indices are assigned in creation order and a node's parents always
//! have smaller indices, so the tape is topologically sorted by construction.

use std::cell::{Ref, RefCell};
use std::fmt;

use causim_core::constants::{step_node_name, OUTCOME_NODE, TREATMENT_NODE};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::recorder::Tracer;
use crate::var::Var;

/// Which named quantity a tape node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tag {
    /// A simulation variable written at a time step.
    State { name: String, step: usize },
    /// A configuration parameter read at a time step.
    Param { name: String, step: usize },
    /// The treatment assignment.
    Treatment,
    /// The scalar outcome.
    Outcome,
}

impl Tag {
    pub fn state(name: impl Into<String>, step: usize) -> Self {
        Self::State {
            name: name.into(),
            step,
        }
    }

    pub fn param(name: impl Into<String>, step: usize) -> Self {
        Self::Param {
            name: name.into(),
            step,
        }
    }

    /// Graph node name: `rabbits_3`, `fox_growth_3`, `Treatment`, `Outcome`.
    pub fn node_name(&self) -> String {
        match self {
            Self::State { name, step } | Self::Param { name, step } => step_node_name(name, *step),
            Self::Treatment => TREATMENT_NODE.to_string(),
            Self::Outcome => OUTCOME_NODE.to_string(),
        }
    }

    /// The time step, if the tag has one.
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::State { step, .. } | Self::Param { step, .. } => Some(*step),
            Self::Treatment | Self::Outcome => None,
        }
    }

    /// The variable or parameter name, if the tag has one.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::State { name, .. } | Self::Param { name, .. } => Some(name),
            Self::Treatment | Self::Outcome => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node_name())
    }
}

/// One recorded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeNode {
    pub value: f64,
    /// Indices of the traced operands this value was computed from.
    pub parents: SmallVec<[usize; 2]>,
    /// `None` for anonymous intermediates and constants.
    pub tag: Option<Tag>,
}

/// An owned snapshot of a finished tape, consumed by the graph builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapeRecord {
    pub nodes: Vec<TapeNode>,
    /// Node indices registered as covariates, in column order.
    pub covariates: Vec<usize>,
}

impl TapeRecord {
    /// Iterate `(index, tag)` for every tagged node.
    pub fn tagged(&self) -> impl Iterator<Item = (usize, &Tag)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.tag.as_ref().map(|t| (i, t)))
    }
}

#[derive(Default)]
struct TapeInner {
    nodes: Vec<TapeNode>,
    covariates: Vec<usize>,
}

/// Single-threaded recording arena. Create [`Var`]s through [`Tape::tracer`].
#[derive(Default)]
pub struct Tape {
    inner: RefCell<TapeInner>,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    /// A [`crate::Recorder`] that records into this tape.
    pub fn tracer(&self) -> Tracer<'_> {
        Tracer::new(self)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the recorded nodes.
    pub fn nodes(&self) -> Ref<'_, [TapeNode]> {
        Ref::map(self.inner.borrow(), |inner| inner.nodes.as_slice())
    }

    /// Covariate node indices in registration order.
    pub fn covariates(&self) -> Vec<usize> {
        self.inner.borrow().covariates.clone()
    }

    /// Consume the tape into an owned record.
    pub fn finish(self) -> TapeRecord {
        let inner = self.inner.into_inner();
        TapeRecord {
            nodes: inner.nodes,
            covariates: inner.covariates,
        }
    }

    /// Clone the current contents into an owned record.
    pub fn snapshot(&self) -> TapeRecord {
        let inner = self.inner.borrow();
        TapeRecord {
            nodes: inner.nodes.clone(),
            covariates: inner.covariates.clone(),
        }
    }

    pub(crate) fn push(&self, value: f64, parents: &[usize], tag: Option<Tag>) -> Var<'_> {
        let mut inner = self.inner.borrow_mut();
        let index = inner.nodes.len();
        debug_assert!(parents.iter().all(|&p| p < index));
        inner.nodes.push(TapeNode {
            value,
            parents: SmallVec::from_slice(parents),
            tag,
        });
        Var::from_parts(self, index, value)
    }

    /// Tag `var`. A node already carrying the identical tag is returned as is.
    pub(crate) fn tag(&self, tag: Tag, var: Var<'_>) -> Var<'_> {
        let already = self.inner.borrow().nodes[var.index()].tag.as_ref() == Some(&tag);
        if already {
            return Var::from_parts(self, var.index(), var.value);
        }
        self.push(var.value, &[var.index()], Some(tag))
    }

    pub(crate) fn push_covariate(&self, index: usize) {
        self.inner.borrow_mut().covariates.push(index);
    }
}

impl fmt::Debug for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Tape")
            .field("nodes", &inner.nodes.len())
            .field("covariates", &inner.covariates)
            .finish()
    }
}
