//! Manifest and artifact names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current on-disk format.
pub const FORMAT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Every saved model field, in the order artifacts are written.
pub const FIELDS: [&str; 7] = [
    "mechanical_model",
    "electrical_model",
    "coupling_model",
    "governing_equations",
    "post_processing_pipeline",
    "time",
    "raw_solution",
];

pub fn artifact_file(field: &str) -> String {
    format!("{field}.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub format_version: u32,
    pub fields: Vec<String>,
    /// RFC 3339 timestamp of the save.
    #[serde(default)]
    pub saved_at: String,
    /// Content hash of the model definition (see [`crate::compute_model_id`]).
    #[serde(default)]
    pub model_id: String,
    /// SHA-256 of each artifact file, keyed by field.
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}
