//! Finite difference Jacobian of a residual vector.

use crate::error::FitResult;
use nalgebra::{DMatrix, DVector};

/// Forward-difference Jacobian of `f` at `p`, reusing the known `f_p = f(p)`.
///
/// Column `j` perturbs `p[j]` by `epsilon * max(|p[j]|, 1)`. The result is
/// `len(f_p) x len(p)`.
pub fn forward_difference_jacobian<F>(
    p: &DVector<f64>,
    f_p: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> FitResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> FitResult<DVector<f64>>,
{
    let mut jac = DMatrix::zeros(f_p.len(), p.len());

    for j in 0..p.len() {
        let mut p_perturbed = p.clone();
        let dp = epsilon * p[j].abs().max(1.0);
        p_perturbed[j] += dp;

        let df = (f(&p_perturbed)? - f_p) / dp;
        jac.set_column(j, &df);
    }

    Ok(jac)
}
