//! Error types for curve fitting.

use hv_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building or fitting a curve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("Model not found: '{key}' (available: {available})")]
    ModelNotFound { key: String, available: String },

    #[error("Fit of {target} with model '{model}' failed to converge: {what}")]
    ConvergenceFailed {
        target: String,
        model: String,
        what: String,
    },

    #[error("Insufficient samples for {what}: need {needed}, got {got}")]
    InsufficientSamples {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Interpolation error: {message}")]
    Interp { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type FitResult<T> = Result<T, FitError>;

impl From<ninterp::error::ValidateError> for FitError {
    fn from(e: ninterp::error::ValidateError) -> Self {
        FitError::Interp {
            message: e.to_string(),
        }
    }
}

impl From<ninterp::error::InterpolateError> for FitError {
    fn from(e: ninterp::error::InterpolateError) -> Self {
        FitError::Interp {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_not_found_names_key() {
        let err = FitError::ModelNotFound {
            key: "coulombs_typo".to_string(),
            available: "interp, unispline".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("coulombs_typo"));
        assert!(msg.contains("interp"));
    }

    #[test]
    fn convergence_failure_names_target_and_model() {
        let err = FitError::ConvergenceFailed {
            target: "magnetic spring".to_string(),
            model: "coulombs_modified".to_string(),
            what: "max iterations".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("magnetic spring"));
        assert!(msg.contains("coulombs_modified"));
    }
}
