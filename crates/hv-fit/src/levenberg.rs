//! Levenberg-Marquardt nonlinear least squares.

use crate::error::{FitError, FitResult};
use crate::jacobian::forward_difference_jacobian;
use nalgebra::{DMatrix, DVector};

/// Levenberg-Marquardt configuration.
#[derive(Clone, Debug)]
pub struct LmConfig {
    /// Maximum outer iterations
    pub max_iterations: usize,
    /// Relative reduction of the cost below which the fit is converged
    pub ftol: f64,
    /// Relative parameter step below which the fit is converged
    pub xtol: f64,
    /// Infinity norm of the gradient below which the fit is converged
    pub gtol: f64,
    /// Initial damping factor
    pub lambda_init: f64,
    /// Damping factor at which the search is considered stagnated
    pub lambda_max: f64,
    /// Finite-difference step for the Jacobian
    pub jacobian_epsilon: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-14,
            lambda_init: 1e-3,
            lambda_max: 1e16,
            jacobian_epsilon: 1e-8,
        }
    }
}

/// Outcome of a converged fit.
#[derive(Clone, Debug)]
pub struct LmReport {
    /// Fitted parameters
    pub params: DVector<f64>,
    /// Final sum of squared residuals
    pub cost: f64,
    /// Number of outer iterations
    pub iterations: usize,
}

/// Minimize `sum(residual(p)^2)` starting from `p0`.
///
/// Uses Marquardt's diagonal scaling of the normal equations. The residual
/// closure must return a vector of fixed length for every parameter vector.
/// Non-convergence is reported as [`FitError::ConvergenceFailed`] with
/// empty `target`/`model`; callers fill those in.
pub fn levenberg_marquardt<F>(p0: DVector<f64>, residual_fn: F, config: &LmConfig) -> FitResult<LmReport>
where
    F: Fn(&DVector<f64>) -> FitResult<DVector<f64>>,
{
    let mut p = p0;
    let mut r = residual_fn(&p)?;
    if r.len() < p.len() {
        return Err(FitError::InsufficientSamples {
            what: "least squares fit",
            needed: p.len(),
            got: r.len(),
        });
    }
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(non_converged("initial residual is not finite".to_string()));
    }

    let mut lambda = config.lambda_init;

    for iter in 0..config.max_iterations {
        let jac = forward_difference_jacobian(&p, &r, &residual_fn, config.jacobian_epsilon)?;
        let jt = jac.transpose();
        let jtj = &jt * &jac;
        let grad = &jt * &r;

        if grad.amax() <= config.gtol {
            tracing::debug!(iterations = iter, cost, "levenberg-marquardt: gradient converged");
            return Ok(LmReport {
                params: p,
                cost,
                iterations: iter,
            });
        }

        // Inner loop: increase damping until the step lowers the cost
        loop {
            let step = damped_step(&jtj, &grad, lambda)?;
            let p_new = &p + &step;
            let r_new = residual_fn(&p_new)?;
            let cost_new = r_new.norm_squared();

            if cost_new.is_finite() && cost_new < cost {
                let reduction = (cost - cost_new) / cost.max(f64::MIN_POSITIVE);
                let step_small = step.norm() <= config.xtol * (p.norm() + config.xtol);

                p = p_new;
                r = r_new;
                cost = cost_new;
                lambda = (lambda / 10.0).max(1e-15);

                if reduction <= config.ftol || step_small || cost == 0.0 {
                    tracing::debug!(iterations = iter + 1, cost, "levenberg-marquardt: converged");
                    return Ok(LmReport {
                        params: p,
                        cost,
                        iterations: iter + 1,
                    });
                }
                break;
            }

            lambda *= 10.0;
            if lambda > config.lambda_max {
                // No descent direction left: the current point is a minimum
                // as far as the model can resolve.
                if step.norm() <= config.xtol.sqrt() * (p.norm() + config.xtol.sqrt()) {
                    return Ok(LmReport {
                        params: p,
                        cost,
                        iterations: iter + 1,
                    });
                }
                return Err(non_converged(format!(
                    "damping exceeded {:e} at iteration {}, cost = {:e}",
                    config.lambda_max, iter, cost
                )));
            }
        }
    }

    Err(non_converged(format!(
        "maximum iterations {} reached, cost = {:e}",
        config.max_iterations, cost
    )))
}

fn damped_step(jtj: &DMatrix<f64>, grad: &DVector<f64>, lambda: f64) -> FitResult<DVector<f64>> {
    let mut a = jtj.clone();
    for i in 0..a.nrows() {
        let d = jtj[(i, i)];
        a[(i, i)] += lambda * if d > 0.0 { d } else { 1.0 };
    }
    let rhs = -grad.clone();
    a.lu().solve(&rhs).ok_or_else(|| FitError::Numeric {
        what: "singular normal equations".to_string(),
    })
}

fn non_converged(what: String) -> FitError {
    FitError::ConvergenceFailed {
        target: String::new(),
        model: String::new(),
        what,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_exponential_decay() {
        // y = a * exp(-b x)
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.5 * (-1.3 * x).exp()).collect();

        let residual = |p: &DVector<f64>| -> FitResult<DVector<f64>> {
            Ok(DVector::from_iterator(
                xs.len(),
                xs.iter().zip(&ys).map(|(x, y)| p[0] * (-p[1] * x).exp() - y),
            ))
        };

        let report =
            levenberg_marquardt(DVector::from_vec(vec![1.0, 1.0]), residual, &LmConfig::default())
                .unwrap();

        assert!((report.params[0] - 2.5).abs() < 1e-6);
        assert!((report.params[1] - 1.3).abs() < 1e-6);
        assert!(report.cost < 1e-12);
    }

    #[test]
    fn too_few_residuals_is_rejected() {
        let residual =
            |p: &DVector<f64>| -> FitResult<DVector<f64>> { Ok(DVector::from_element(1, p[0] + p[1])) };
        let err = levenberg_marquardt(DVector::from_vec(vec![1.0, 1.0]), residual, &LmConfig::default())
            .unwrap_err();
        assert!(matches!(err, FitError::InsufficientSamples { .. }));
    }

    #[test]
    fn non_finite_start_fails_to_converge() {
        let residual =
            |p: &DVector<f64>| -> FitResult<DVector<f64>> { Ok(DVector::from_element(2, p[0] / 0.0)) };
        let err = levenberg_marquardt(DVector::from_vec(vec![1.0]), residual, &LmConfig::default())
            .unwrap_err();
        assert!(matches!(err, FitError::ConvergenceFailed { .. }));
    }

    #[test]
    fn iteration_cap_is_reported() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.5 * (-1.3 * x).exp()).collect();
        let residual = |p: &DVector<f64>| -> FitResult<DVector<f64>> {
            Ok(DVector::from_iterator(
                xs.len(),
                xs.iter().zip(&ys).map(|(x, y)| p[0] * (-p[1] * x).exp() - y),
            ))
        };
        let config = LmConfig {
            max_iterations: 1,
            ..LmConfig::default()
        };
        let err = levenberg_marquardt(DVector::from_vec(vec![10.0, 0.01]), residual, &config)
            .unwrap_err();
        assert!(err.to_string().contains("maximum iterations"));
    }
}
