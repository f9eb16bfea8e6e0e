//! Error types for simulation operations.

use crate::expr::ExprError;
use hv_components::ComponentError;
use hv_core::CoreError;
use hv_eval::EvalError;
use thiserror::Error;

/// Errors encountered while configuring, solving or querying a model.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unified model is missing its {what}")]
    NotConfigured { what: &'static str },

    #[error("Unified model has not been solved")]
    NotSolved,

    #[error("Non-finite state or derivative at t = {t}")]
    NonFinite { t: f64 },

    #[error("Step size {h:e} underflowed at t = {t}")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("Exceeded {max_steps} integration steps at t = {t}")]
    MaxStepsExceeded { max_steps: usize, t: f64 },

    #[error("Deadline of {deadline_ms} ms exceeded at t = {t}")]
    DeadlineExceeded { deadline_ms: u128, t: f64 },

    #[error("Solve cancelled at t = {t}")]
    Cancelled { t: f64 },

    #[error("Governing equations failed: {message}")]
    Equations { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Config {
            message: e.to_string(),
        }
    }
}
