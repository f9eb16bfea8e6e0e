//! Model storage API.

use crate::hash::{artifact_checksum, compute_model_id};
use crate::types::{FIELDS, FORMAT_VERSION, MANIFEST_FILE, ModelManifest, artifact_file};
use crate::{StoreError, StoreResult};
use hv_components::{CouplingModel, ElectricalModel, MechanicalModel};
use hv_sim::{GoverningEquations, PipelineSet, RawSolution, UnifiedModel};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn check_persistable(model: &UnifiedModel) -> StoreResult<()> {
    if model
        .governing_equations()
        .is_some_and(|eq| !eq.is_persistable())
    {
        return Err(StoreError::NotPersistable {
            field: "governing_equations",
        });
    }
    if model
        .electrical_model()
        .is_some_and(|e| !e.is_persistable())
    {
        return Err(StoreError::NotPersistable {
            field: "electrical_model",
        });
    }
    if !model.post_processing_pipeline().is_persistable() {
        return Err(StoreError::NotPersistable {
            field: "post_processing_pipeline",
        });
    }
    Ok(())
}

fn serialize_fields(model: &UnifiedModel) -> StoreResult<Vec<(&'static str, Vec<u8>)>> {
    let [mech, elec, coup, eq, pipes, time, raw] = FIELDS;
    Ok(vec![
        (mech, serde_json::to_vec_pretty(&model.mechanical_model())?),
        (elec, serde_json::to_vec_pretty(&model.electrical_model())?),
        (coup, serde_json::to_vec_pretty(&model.coupling_model())?),
        (eq, serde_json::to_vec_pretty(&model.governing_equations())?),
        (pipes, serde_json::to_vec_pretty(model.post_processing_pipeline())?),
        (time, serde_json::to_vec(&model.time())?),
        (raw, serde_json::to_vec(&model.raw_solution())?),
    ])
}

/// Write `model` into a new directory at `path`.
///
/// Fails with [`StoreError::AlreadyExists`] if anything exists at `path`.
/// Artifacts are staged in a hidden sibling directory that is renamed into
/// place once complete, so a failed save leaves nothing at `path`.
pub fn save_model(path: &Path, model: &UnifiedModel) -> StoreResult<ModelManifest> {
    if path.exists() {
        return Err(StoreError::AlreadyExists {
            path: display(path),
        });
    }
    check_persistable(model)?;
    let artifacts = serialize_fields(model)?;
    let manifest = ModelManifest {
        format_version: FORMAT_VERSION,
        fields: FIELDS.iter().map(|f| f.to_string()).collect(),
        saved_at: chrono::Utc::now().to_rfc3339(),
        model_id: compute_model_id(model)?,
        checksums: artifacts
            .iter()
            .map(|(field, bytes)| (field.to_string(), artifact_checksum(bytes)))
            .collect::<BTreeMap<_, _>>(),
    };

    let staging = staging_dir(path);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    let written = write_artifacts(&staging, &artifacts, &manifest).and_then(|()| {
        fs::rename(&staging, path)?;
        Ok(())
    });
    if let Err(err) = written {
        let _ = fs::remove_dir_all(&staging);
        return Err(err);
    }

    info!(path = %path.display(), model_id = %manifest.model_id, "saved model");
    Ok(manifest)
}

/// Hidden sibling of `path` used while a save is in progress.
fn staging_dir(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

fn write_artifacts(
    dir: &Path,
    artifacts: &[(&'static str, Vec<u8>)],
    manifest: &ModelManifest,
) -> StoreResult<()> {
    fs::create_dir_all(dir)?;
    for (field, bytes) in artifacts {
        fs::write(dir.join(artifact_file(field)), bytes)?;
    }
    // Manifest last: a directory without one is never a saved model
    fs::write(dir.join(MANIFEST_FILE), serde_json::to_string_pretty(manifest)?)?;
    Ok(())
}

pub fn load_manifest(path: &Path) -> StoreResult<ModelManifest> {
    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(StoreError::NotFound {
            path: display(path),
        });
    }
    let manifest: ModelManifest = serde_json::from_str(&fs::read_to_string(manifest_path)?)?;
    if manifest.format_version != FORMAT_VERSION {
        return Err(StoreError::VersionMismatch {
            found: manifest.format_version,
            expected: FORMAT_VERSION,
        });
    }
    Ok(manifest)
}

fn read_field<T: DeserializeOwned>(dir: &Path, manifest: &ModelManifest, field: &str) -> StoreResult<T> {
    let file = dir.join(artifact_file(field));
    if !file.exists() {
        return Err(StoreError::NotFound {
            path: display(&file),
        });
    }
    let bytes = fs::read(&file)?;
    if let Some(expected) = manifest.checksums.get(field)
        && *expected != artifact_checksum(&bytes)
    {
        return Err(StoreError::ChecksumMismatch {
            field: field.to_string(),
        });
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Rebuild a model saved with [`save_model`].
pub fn load_model(path: &Path) -> StoreResult<UnifiedModel> {
    if !path.is_dir() {
        return Err(StoreError::NotFound {
            path: display(path),
        });
    }
    let manifest = load_manifest(path)?;

    let mut model = UnifiedModel::new();
    if let Some(m) = read_field::<Option<MechanicalModel>>(path, &manifest, "mechanical_model")? {
        model.set_mechanical_model(m);
    }
    if let Some(e) = read_field::<Option<ElectricalModel>>(path, &manifest, "electrical_model")? {
        model.set_electrical_model(e);
    }
    if let Some(c) = read_field::<Option<CouplingModel>>(path, &manifest, "coupling_model")? {
        model.set_coupling_model(c);
    }
    if let Some(g) = read_field::<Option<GoverningEquations>>(path, &manifest, "governing_equations")? {
        model.set_governing_equations(g);
    }
    model.set_pipelines(read_field::<PipelineSet>(path, &manifest, "post_processing_pipeline")?);

    let time = read_field::<Option<Vec<f64>>>(path, &manifest, "time")?;
    let raw = read_field::<Option<RawSolution>>(path, &manifest, "raw_solution")?;
    if let (Some(time), Some(raw)) = (time, raw) {
        model.restore_solution(time, raw)?;
    }

    info!(path = %path.display(), "loaded model");
    Ok(model)
}

/// A directory of named saved models.
#[derive(Clone, Debug)]
pub struct ModelStore {
    root_dir: PathBuf,
}

impl ModelStore {
    pub fn new(root_dir: PathBuf) -> StoreResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    fn model_dir(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.model_dir(name).join(MANIFEST_FILE).exists()
    }

    pub fn save(&self, name: &str, model: &UnifiedModel) -> StoreResult<ModelManifest> {
        save_model(&self.model_dir(name), model)
    }

    pub fn load(&self, name: &str) -> StoreResult<UnifiedModel> {
        load_model(&self.model_dir(name))
    }

    /// Names of every saved model, sorted.
    pub fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') && entry.path().is_dir() && self.has_model(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> StoreResult<()> {
        let dir = self.model_dir(name);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}
