//! Integration driver: step loop, recording and abort conditions.

use crate::error::{SimError, SimResult};
use crate::integrator::{DP_ERROR_EXPONENT, DormandPrince45, ForwardEuler, Integrator, Rk4};
use crate::model::{OdeSystem, State, all_finite};
use crate::options::{Method, SolveOptions};
use std::time::Instant;
use tracing::{debug, warn};

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Time grid and the state at each grid point.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub t: Vec<f64>,
    pub y: Vec<State>,
}

/// Checks run before every step.
struct Guard<'a> {
    opts: &'a SolveOptions,
    started: Instant,
    steps: usize,
}

impl<'a> Guard<'a> {
    fn new(opts: &'a SolveOptions) -> Self {
        Self {
            opts,
            started: Instant::now(),
            steps: 0,
        }
    }

    fn tick(&mut self, t: f64) -> SimResult<()> {
        self.steps += 1;
        if self.steps > self.opts.max_steps {
            return Err(SimError::MaxStepsExceeded {
                max_steps: self.opts.max_steps,
                t,
            });
        }
        if let Some(token) = &self.opts.cancel
            && token.is_cancelled()
        {
            warn!(t, "solve cancelled");
            return Err(SimError::Cancelled { t });
        }
        if let Some(deadline) = self.opts.deadline
            && self.started.elapsed() > deadline
        {
            warn!(t, deadline_ms = deadline.as_millis() as u64, "solve deadline exceeded");
            return Err(SimError::DeadlineExceeded {
                deadline_ms: deadline.as_millis(),
                t,
            });
        }
        Ok(())
    }
}

/// Integrate `sys` from `y0` over `[opts.t_start, opts.t_end]`.
///
/// Every accepted step is recorded; the first sample is `(t_start, y0)` and
/// the last lands exactly on `t_end`.
pub fn integrate<S: OdeSystem>(sys: &S, y0: &State, opts: &SolveOptions) -> SimResult<Trajectory> {
    opts.validate()?;
    if !all_finite(y0) {
        return Err(SimError::NonFinite { t: opts.t_start });
    }
    match opts.method {
        Method::Rk45 => integrate_adaptive(sys, y0, opts),
        Method::Rk4 => integrate_fixed(&Rk4, sys, y0, opts),
        Method::Euler => integrate_fixed(&ForwardEuler, sys, y0, opts),
    }
}

fn integrate_fixed<I: Integrator, S: OdeSystem>(
    integrator: &I,
    sys: &S,
    y0: &State,
    opts: &SolveOptions,
) -> SimResult<Trajectory> {
    let span = opts.t_end - opts.t_start;
    let n_steps = (span / opts.max_step).ceil().max(1.0) as usize;
    let dt = span / n_steps as f64;
    if n_steps > opts.max_steps {
        // The grid is known up front; fail before reserving it
        return Err(SimError::MaxStepsExceeded {
            max_steps: opts.max_steps,
            t: opts.t_start + opts.max_steps as f64 * dt,
        });
    }

    let mut guard = Guard::new(opts);
    let mut t_rec = Vec::with_capacity(n_steps + 1);
    let mut y_rec = Vec::with_capacity(n_steps + 1);
    let mut y = *y0;
    t_rec.push(opts.t_start);
    y_rec.push(y);

    for k in 0..n_steps {
        let t = opts.t_start + k as f64 * dt;
        guard.tick(t)?;
        y = integrator.step(sys, t, &y, dt)?;
        if !all_finite(&y) {
            return Err(SimError::NonFinite { t: t + dt });
        }
        // Avoid drift in the recorded grid
        let t_next = if k + 1 == n_steps {
            opts.t_end
        } else {
            opts.t_start + (k + 1) as f64 * dt
        };
        t_rec.push(t_next);
        y_rec.push(y);
    }

    Ok(Trajectory { t: t_rec, y: y_rec })
}

fn integrate_adaptive<S: OdeSystem>(sys: &S, y0: &State, opts: &SolveOptions) -> SimResult<Trajectory> {
    let dp = DormandPrince45::new(opts.rtol, opts.atol);
    let mut guard = Guard::new(opts);

    let mut t = opts.t_start;
    let mut y = *y0;
    let mut f = sys.rhs(t, &y)?;
    if !all_finite(&f) {
        return Err(SimError::NonFinite { t });
    }

    let mut h = match opts.first_step {
        Some(h) => h.min(opts.max_step),
        None => dp.initial_step(sys, t, &y, &f, opts.max_step)?,
    };

    let mut t_rec = vec![t];
    let mut y_rec = vec![y];
    let mut rejected = 0usize;

    while t < opts.t_end {
        guard.tick(t)?;

        let min_step = 10.0 * f64::EPSILON * t.abs().max(1.0);
        h = h.min(opts.max_step).min(opts.t_end - t);
        if h < min_step {
            return Err(SimError::StepSizeUnderflow { t, h });
        }

        let trial = dp.trial_step(sys, t, &y, &f, h)?;
        let norm = trial.error_norm;

        if norm.is_finite() && norm <= 1.0 {
            let factor = if norm == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * norm.powf(-DP_ERROR_EXPONENT)).min(MAX_FACTOR)
            };
            let t_new = if opts.t_end - (t + h) <= min_step {
                opts.t_end
            } else {
                t + h
            };
            if !all_finite(&trial.y_new) || !all_finite(&trial.f_new) {
                return Err(SimError::NonFinite { t: t_new });
            }
            t = t_new;
            y = trial.y_new;
            f = trial.f_new;
            t_rec.push(t);
            y_rec.push(y);
            h *= factor;
        } else {
            rejected += 1;
            let factor = if norm.is_finite() {
                (SAFETY * norm.powf(-DP_ERROR_EXPONENT)).max(MIN_FACTOR)
            } else {
                MIN_FACTOR
            };
            h *= factor.min(1.0);
        }
    }

    debug!(
        accepted = t_rec.len() - 1,
        rejected,
        "adaptive integration finished"
    );
    Ok(Trajectory { t: t_rec, y: y_rec })
}
