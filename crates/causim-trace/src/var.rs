//! The traced scalar.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::scalar::Scalar;
use crate::tape::Tape;

/// A value on a [`Tape`]. Every operation appends a node whose parents are
/// the traced operands; plain `f64` operands are constants and add no parent.
#[derive(Clone, Copy)]
pub struct Var<'t> {
    tape: &'t Tape,
    index: usize,
    pub value: f64,
}

impl<'t> Var<'t> {
    pub(crate) fn from_parts(tape: &'t Tape, index: usize, value: f64) -> Self {
        Self { tape, index, value }
    }

    /// Index of this value's node on the tape.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tape(&self) -> &'t Tape {
        self.tape
    }

    fn unary(self, value: f64) -> Self {
        self.tape.push(value, &[self.index], None)
    }

    fn binary(self, other: Self, value: f64) -> Self {
        debug_assert!(
            std::ptr::eq(self.tape, other.tape),
            "operands recorded on different tapes"
        );
        if self.index == other.index {
            return self.unary(value);
        }
        self.tape.push(value, &[self.index, other.index], None)
    }
}

impl fmt::Debug for Var<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var(#{} = {})", self.index, self.value)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<'t> $trait for Var<'t> {
            type Output = Var<'t>;
            fn $method(self, rhs: Var<'t>) -> Var<'t> {
                self.binary(rhs, self.value $op rhs.value)
            }
        }

        impl<'t> $trait<f64> for Var<'t> {
            type Output = Var<'t>;
            fn $method(self, rhs: f64) -> Var<'t> {
                self.unary(self.value $op rhs)
            }
        }

        impl<'t> $trait<Var<'t>> for f64 {
            type Output = Var<'t>;
            fn $method(self, rhs: Var<'t>) -> Var<'t> {
                rhs.unary(self $op rhs.value)
            }
        }
    };
}

impl_binary_op!(Add, add, +);
impl_binary_op!(Sub, sub, -);
impl_binary_op!(Mul, mul, *);
impl_binary_op!(Div, div, /);

impl<'t> Neg for Var<'t> {
    type Output = Var<'t>;
    fn neg(self) -> Var<'t> {
        self.unary(-self.value)
    }
}

impl Scalar for Var<'_> {
    fn value(self) -> f64 {
        self.value
    }

    fn exp(self) -> Self {
        self.unary(self.value.exp())
    }

    fn ln(self) -> Self {
        self.unary(self.value.ln())
    }

    fn sqrt(self) -> Self {
        self.unary(self.value.sqrt())
    }

    fn powi(self, n: i32) -> Self {
        self.unary(self.value.powi(n))
    }

    fn abs(self) -> Self {
        self.unary(self.value.abs())
    }
}
