//! Error types for evaluation.

use hv_core::CoreError;
use hv_fit::FitError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Evaluator has not been fitted; call fit() before score()")]
    NotFitted,

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Prediction spans [{start}, {end}] but no target samples fall inside it")]
    NoOverlap { start: f64, end: f64 },

    #[error("Resampling failed: {0}")]
    Fit(#[from] FitError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type EvalResult<T> = Result<T, EvalError>;
