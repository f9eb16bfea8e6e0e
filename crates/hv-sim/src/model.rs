//! ODE system trait for the integrators.

use crate::error::SimResult;
use hv_core::STATE_DIM;

/// Flat state integrated by the solver.
pub type State = [f64; STATE_DIM];

/// Right-hand side `dy/dt = f(t, y)` of an initial value problem.
pub trait OdeSystem {
    fn rhs(&self, t: f64, y: &State) -> SimResult<State>;
}

impl<F> OdeSystem for F
where
    F: Fn(f64, &State) -> SimResult<State>,
{
    fn rhs(&self, t: f64, y: &State) -> SimResult<State> {
        self(t, y)
    }
}

/// `a + s * b`
#[inline]
pub(crate) fn axpy(a: &State, s: f64, b: &State) -> State {
    std::array::from_fn(|i| a[i] + s * b[i])
}

/// `y + h * sum(c_k * k_k)`
#[inline]
pub(crate) fn combine(y: &State, h: f64, terms: &[(f64, &State)]) -> State {
    std::array::from_fn(|i| y[i] + h * terms.iter().map(|(c, k)| c * k[i]).sum::<f64>())
}

pub(crate) fn all_finite(y: &State) -> bool {
    y.iter().all(|v| v.is_finite())
}
