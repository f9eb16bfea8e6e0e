//! Solve configuration.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Integration method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Dormand-Prince 5(4), adaptive step bounded by `max_step`.
    #[default]
    Rk45,
    /// Classical 4th-order Runge-Kutta, fixed step = `max_step`.
    Rk4,
    /// Forward Euler, fixed step = `max_step`.
    Euler,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Rk45 => "rk45",
            Method::Rk4 => "rk4",
            Method::Euler => "euler",
        }
    }
}

impl FromStr for Method {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rk45" => Ok(Method::Rk45),
            "rk4" => Ok(Method::Rk4),
            "euler" => Ok(Method::Euler),
            _ => Err(SimError::Config {
                message: format!("unknown integration method '{s}' (expected rk45, rk4 or euler)"),
            }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared flag that stops a running solve at its next step.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tokens are equal when they share the same flag.
impl PartialEq for CancelToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Options for a solve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Start time (seconds)
    pub t_start: f64,
    /// End time (seconds)
    pub t_end: f64,
    /// Largest step the integrator may take (seconds)
    pub max_step: f64,
    pub method: Method,
    /// First trial step for the adaptive method; estimated when `None`
    pub first_step: Option<f64>,
    /// Relative tolerance (adaptive only)
    pub rtol: f64,
    /// Absolute tolerance (adaptive only)
    pub atol: f64,
    /// Maximum number of accepted plus rejected steps
    pub max_steps: usize,
    /// Wall-clock budget for the integration
    pub deadline: Option<Duration>,
    #[serde(skip)]
    pub cancel: Option<CancelToken>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 1.0,
            max_step: 1e-5,
            method: Method::default(),
            first_step: None,
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: 50_000_000,
            deadline: None,
            cancel: None,
        }
    }
}

impl SolveOptions {
    pub fn new(t_start: f64, t_end: f64, max_step: f64, method: Method) -> Self {
        Self {
            t_start,
            t_end,
            max_step,
            method,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.t_start.is_finite() || !self.t_end.is_finite() {
            return Err(SimError::InvalidArg {
                what: "time span must be finite",
            });
        }
        if self.t_end <= self.t_start {
            return Err(SimError::InvalidArg {
                what: "t_end must be greater than t_start",
            });
        }
        if !(self.max_step > 0.0) {
            return Err(SimError::InvalidArg {
                what: "max_step must be positive",
            });
        }
        if !(self.rtol > 0.0) || !(self.atol >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "tolerances must be positive",
            });
        }
        if self.first_step.is_some_and(|h| !(h > 0.0)) {
            return Err(SimError::InvalidArg {
                what: "first_step must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_options_defaults() {
        let opts = SolveOptions::default();
        assert_eq!(opts.max_step, 1e-5);
        assert_eq!(opts.method, Method::Rk45);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn solve_options_invalid() {
        let mut opts = SolveOptions::new(1.0, 1.0, 1e-3, Method::Rk4);
        assert!(opts.validate().is_err());
        opts.t_end = 2.0;
        opts.max_step = 0.0;
        assert!(opts.validate().is_err());
        opts.max_step = f64::NAN;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn method_names_parse() {
        assert_eq!("RK45".parse::<Method>().unwrap(), Method::Rk45);
        assert_eq!("euler".parse::<Method>().unwrap(), Method::Euler);
        assert!("lsoda".parse::<Method>().is_err());
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
