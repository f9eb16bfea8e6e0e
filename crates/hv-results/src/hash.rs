//! Content hashing for artifacts and model identity.

use crate::StoreResult;
use hv_sim::UnifiedModel;
use sha2::{Digest, Sha256};

pub fn artifact_checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Hash of the model definition: sub-models, equations and pipelines.
/// The solved trajectory does not contribute.
pub fn compute_model_id(model: &UnifiedModel) -> StoreResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(&model.mechanical_model())?);
    hasher.update(serde_json::to_vec(&model.electrical_model())?);
    hasher.update(serde_json::to_vec(&model.coupling_model())?);
    hasher.update(serde_json::to_vec(&model.governing_equations())?);
    hasher.update(serde_json::to_vec(model.post_processing_pipeline())?);
    Ok(format!("{:x}", hasher.finalize()))
}
