//! Time integrators.
//!
//! Fixed-step methods implement [`Integrator`]; the adaptive
//! Dormand-Prince pair exposes a single trial step with an error estimate
//! and is driven by [`crate::solve::integrate`].

use crate::error::SimResult;
use crate::model::{OdeSystem, State, axpy, combine};

/// Trait for fixed-step time integrators.
pub trait Integrator {
    /// Advance state by one time step.
    fn step<S: OdeSystem>(&self, sys: &S, t: f64, y: &State, dt: f64) -> SimResult<State>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug)]
pub struct Rk4;

impl Integrator for Rk4 {
    fn step<S: OdeSystem>(&self, sys: &S, t: f64, y: &State, dt: f64) -> SimResult<State> {
        let k1 = sys.rhs(t, y)?;
        let k2 = sys.rhs(t + 0.5 * dt, &axpy(y, 0.5 * dt, &k1))?;
        let k3 = sys.rhs(t + 0.5 * dt, &axpy(y, 0.5 * dt, &k2))?;
        let k4 = sys.rhs(t + dt, &axpy(y, dt, &k3))?;

        // y_new = y + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        Ok(combine(
            y,
            dt / 6.0,
            &[(1.0, &k1), (2.0, &k2), (2.0, &k3), (1.0, &k4)],
        ))
    }
}

/// Forward Euler (explicit, 1st order).
/// Calls rhs() once per step instead of 4 times (RK4).
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<S: OdeSystem>(&self, sys: &S, t: f64, y: &State, dt: f64) -> SimResult<State> {
        let ydot = sys.rhs(t, y)?;
        Ok(axpy(y, dt, &ydot))
    }
}

/// Dormand-Prince 5(4) tableau.
mod dp {
    pub const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
    pub const A2: [f64; 1] = [1.0 / 5.0];
    pub const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
    pub const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
    pub const A5: [f64; 4] = [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
    ];
    pub const A6: [f64; 5] = [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ];
    /// 5th-order weights (also row 7 of A).
    pub const B: [f64; 7] = [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ];
    /// Difference between 5th- and 4th-order weights.
    pub const E: [f64; 7] = [
        71.0 / 57600.0,
        0.0,
        -71.0 / 16695.0,
        71.0 / 1920.0,
        -17253.0 / 339200.0,
        22.0 / 525.0,
        -1.0 / 40.0,
    ];
}

/// Error estimator order + 1, used in step-size control.
pub const DP_ERROR_EXPONENT: f64 = 1.0 / 5.0;

/// Outcome of one Dormand-Prince trial step.
#[derive(Clone, Debug)]
pub struct TrialStep {
    pub y_new: State,
    /// Derivative at `(t + h, y_new)`; reused as `k1` of the next step.
    pub f_new: State,
    /// Scaled RMS error norm; the step is acceptable when <= 1.
    pub error_norm: f64,
}

#[derive(Clone, Debug)]
pub struct DormandPrince45 {
    pub rtol: f64,
    pub atol: f64,
}

impl DormandPrince45 {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Attempt a step of size `h` from `(t, y)` given `f0 = f(t, y)`.
    pub fn trial_step<S: OdeSystem>(
        &self,
        sys: &S,
        t: f64,
        y: &State,
        f0: &State,
        h: f64,
    ) -> SimResult<TrialStep> {
        use dp::*;

        let k1 = *f0;
        let k2 = sys.rhs(t + C[1] * h, &combine(y, h, &[(A2[0], &k1)]))?;
        let k3 = sys.rhs(t + C[2] * h, &combine(y, h, &[(A3[0], &k1), (A3[1], &k2)]))?;
        let k4 = sys.rhs(
            t + C[3] * h,
            &combine(y, h, &[(A4[0], &k1), (A4[1], &k2), (A4[2], &k3)]),
        )?;
        let k5 = sys.rhs(
            t + C[4] * h,
            &combine(
                y,
                h,
                &[(A5[0], &k1), (A5[1], &k2), (A5[2], &k3), (A5[3], &k4)],
            ),
        )?;
        let k6 = sys.rhs(
            t + C[5] * h,
            &combine(
                y,
                h,
                &[
                    (A6[0], &k1),
                    (A6[1], &k2),
                    (A6[2], &k3),
                    (A6[3], &k4),
                    (A6[4], &k5),
                ],
            ),
        )?;
        let y_new = combine(
            y,
            h,
            &[
                (B[0], &k1),
                (B[2], &k3),
                (B[3], &k4),
                (B[4], &k5),
                (B[5], &k6),
            ],
        );
        let k7 = sys.rhs(t + h, &y_new)?;

        let ks = [&k1, &k2, &k3, &k4, &k5, &k6, &k7];
        let mut sum_sq = 0.0;
        for i in 0..y.len() {
            let err: f64 = h * ks.iter().zip(E).map(|(k, e)| e * k[i]).sum::<f64>();
            let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
            sum_sq += (err / scale).powi(2);
        }
        let error_norm = (sum_sq / y.len() as f64).sqrt();

        Ok(TrialStep {
            y_new,
            f_new: k7,
            error_norm,
        })
    }

    /// Starting step estimate (Hairer, Norsett & Wanner, II.4).
    pub fn initial_step<S: OdeSystem>(
        &self,
        sys: &S,
        t0: f64,
        y0: &State,
        f0: &State,
        max_step: f64,
    ) -> SimResult<f64> {
        let scale: State = std::array::from_fn(|i| self.atol + self.rtol * y0[i].abs());
        let rms = |v: &State| {
            (v.iter().zip(&scale).map(|(x, s)| (x / s).powi(2)).sum::<f64>() / v.len() as f64)
                .sqrt()
        };

        let d0 = rms(y0);
        let d1 = rms(f0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };
        let h0 = h0.min(max_step);

        let y1 = axpy(y0, h0, f0);
        let f1 = sys.rhs(t0 + h0, &y1)?;
        let diff: State = std::array::from_fn(|i| f1[i] - f0[i]);
        let d2 = rms(&diff) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(DP_ERROR_EXPONENT)
        };

        Ok((100.0 * h0).min(h1).min(max_step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimResult;
    use approx::assert_relative_eq;

    // y' = -y in every component
    fn decay(_t: f64, y: &State) -> SimResult<State> {
        Ok(y.map(|v| -v))
    }

    #[test]
    fn rk4_matches_exponential() {
        let mut y = [1.0; 5];
        let dt = 0.01;
        for k in 0..100 {
            y = Rk4.step(&decay, k as f64 * dt, &y, dt).unwrap();
        }
        assert_relative_eq!(y[0], (-1.0f64).exp(), max_relative = 1e-8);
    }

    #[test]
    fn euler_is_first_order() {
        let y = ForwardEuler.step(&decay, 0.0, &[2.0; 5], 0.1).unwrap();
        assert_relative_eq!(y[3], 1.8);
    }

    #[test]
    fn dormand_prince_step_is_accurate() {
        let dp = DormandPrince45::new(1e-6, 1e-9);
        let y0 = [1.0; 5];
        let f0 = decay(0.0, &y0).unwrap();
        let trial = dp.trial_step(&decay, 0.0, &y0, &f0, 0.1).unwrap();
        assert_relative_eq!(trial.y_new[0], (-0.1f64).exp(), max_relative = 1e-7);
        assert_relative_eq!(trial.f_new[0], -trial.y_new[0]);
        assert!(trial.error_norm.is_finite());
    }

    #[test]
    fn initial_step_respects_max_step() {
        let dp = DormandPrince45::new(1e-3, 1e-6);
        let y0 = [1.0; 5];
        let f0 = decay(0.0, &y0).unwrap();
        let h = dp.initial_step(&decay, 0.0, &y0, &f0, 1e-4).unwrap();
        assert!(h > 0.0 && h <= 1e-4);
    }
}
