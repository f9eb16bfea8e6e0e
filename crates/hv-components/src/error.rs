//! Error types for component operations.

use hv_core::CoreError;
use hv_fit::FitError;
use thiserror::Error;

/// Errors that can occur while configuring or evaluating components.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Model not found: '{key}' ({what})")]
    ModelNotFound { key: String, what: &'static str },

    #[error("Missing component: {what}")]
    MissingComponent { what: &'static str },

    #[error("Missing key: {key}")]
    MissingKey { key: String },

    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    #[error("Index cannot be created more than once")]
    IndexAlreadyCreated,

    #[error("Index has not been created")]
    IndexMissing,

    #[error("Fit error: {0}")]
    Fit(#[from] FitError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;
