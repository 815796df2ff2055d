use causim_trace::Scalar;

/// A continuous-time system `dx/dt = f(params, x)`.
///
/// `derivative` is generic over [`Scalar`] so the same definition runs on
/// plain `f64` and on traced values.
pub trait Dynamics: Send + Sync {
    /// Variable names, in state-vector order.
    fn state_names(&self) -> &'static [&'static str];

    /// Parameter names, in the order `derivative` receives them.
    fn param_names(&self) -> &'static [&'static str];

    fn derivative<S: Scalar>(&self, params: &[S], state: &[S]) -> Vec<S>;

    /// Index of a parameter in `param_names()`.
    fn param_index(&self, name: &str) -> Option<usize> {
        self.param_names().iter().position(|p| *p == name)
    }

    /// Index of a variable in `state_names()`.
    fn state_index(&self, name: &str) -> Option<usize> {
        self.state_names().iter().position(|s| *s == name)
    }
}
