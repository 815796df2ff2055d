//! Fixed-step integrators over any [`Scalar`].

use causim_trace::Scalar;

use crate::config::Integrator;
use crate::dynamics::Dynamics;

/// Advance `state` by `delta_t` using `substeps` steps of `integrator`.
pub fn advance<D: Dynamics, S: Scalar>(
    dynamics: &D,
    integrator: Integrator,
    substeps: usize,
    delta_t: f64,
    params: &[S],
    state: &[S],
) -> Vec<S> {
    let h = delta_t / substeps.max(1) as f64;
    let mut x = state.to_vec();
    for _ in 0..substeps.max(1) {
        x = match integrator {
            Integrator::Euler => euler(dynamics, params, &x, h),
            Integrator::Rk4 => rk4(dynamics, params, &x, h),
        };
    }
    x
}

fn euler<D: Dynamics, S: Scalar>(dynamics: &D, params: &[S], x: &[S], h: f64) -> Vec<S> {
    let k = dynamics.derivative(params, x);
    axpy(x, &k, h)
}

fn rk4<D: Dynamics, S: Scalar>(dynamics: &D, params: &[S], x: &[S], h: f64) -> Vec<S> {
    let k1 = dynamics.derivative(params, x);
    let k2 = dynamics.derivative(params, &axpy(x, &k1, h / 2.0));
    let k3 = dynamics.derivative(params, &axpy(x, &k2, h / 2.0));
    let k4 = dynamics.derivative(params, &axpy(x, &k3, h));
    x.iter()
        .enumerate()
        .map(|(i, &xi)| xi + (k1[i] + k2[i] * 2.0 + k3[i] * 2.0 + k4[i]) * (h / 6.0))
        .collect()
}

/// `x + k * a`, elementwise.
fn axpy<S: Scalar>(x: &[S], k: &[S], a: f64) -> Vec<S> {
    x.iter().zip(k).map(|(&xi, &ki)| xi + ki * a).collect()
}
