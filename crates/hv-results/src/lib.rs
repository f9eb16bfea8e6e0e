//! hv-results: on-disk persistence of unified harvester models.
//!
//! A saved model is a directory holding `manifest.json` plus one JSON
//! artifact per model field. See [`save_model`] and [`load_model`].

pub mod hash;
pub mod store;
pub mod types;

pub use hash::{artifact_checksum, compute_model_id};
pub use store::{ModelStore, load_manifest, load_model, save_model};
pub use types::*;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Refusing to overwrite existing model at {path}")]
    AlreadyExists { path: String },

    #[error("Model not found: {path}")]
    NotFound { path: String },

    #[error("Unsupported format version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Field '{field}' holds user code and cannot be saved")]
    NotPersistable { field: &'static str },

    #[error("Checksum mismatch for artifact '{field}'")]
    ChecksumMismatch { field: String },

    #[error(transparent)]
    Sim(#[from] hv_sim::SimError),
}
