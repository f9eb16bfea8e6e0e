//! Magnetic spring: force between the fixed and moving magnets as a
//! function of separation, fitted once from FEA samples.

use crate::error::ComponentResult;
use hv_core::numeric::{ensure_all_finite, ensure_same_len};
use hv_fit::{CurveKind, Extrapolation, FittedCurve, fit_curve};
use serde::{Deserialize, Serialize};

const FIT_TARGET: &str = "magnetic spring";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagneticSpring {
    z: Vec<f64>,
    force: Vec<f64>,
    kind: CurveKind,
    curve: FittedCurve,
}

impl MagneticSpring {
    /// Fit a spring to `(z, force)` samples using the named model family.
    ///
    /// Unknown names fail with a model-not-found error listing `model`.
    pub fn new(z: &[f64], force: &[f64], model: &str) -> ComponentResult<Self> {
        let kind = CurveKind::lookup(model, &CurveKind::ALL)?;
        Self::with_kind(z, force, kind)
    }

    pub fn with_kind(z: &[f64], force: &[f64], kind: CurveKind) -> ComponentResult<Self> {
        ensure_same_len(z, force, "magnetic spring samples")?;
        ensure_all_finite(z, "magnetic spring z")?;
        ensure_all_finite(force, "magnetic spring force")?;
        let curve = fit_curve(FIT_TARGET, kind, z, force, Extrapolation::Clamp)?;
        Ok(Self {
            z: z.to_vec(),
            force: force.to_vec(),
            kind,
            curve,
        })
    }

    /// Force [N] at separation `z` [m].
    pub fn get_force(&self, z: f64) -> f64 {
        self.curve.eval(z)
    }

    pub fn get_force_array(&self, z: &[f64]) -> Vec<f64> {
        z.iter().map(|&zi| self.get_force(zi)).collect()
    }

    /// Fitted coefficients, `None` for interpolating kinds.
    pub fn model_parameters(&self) -> Option<&[f64]> {
        self.curve.params()
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn samples(&self) -> (&[f64], &[f64]) {
        (&self.z, &self.force)
    }

    /// Re-run the fit on the stored samples with the current model.
    pub fn refit(&mut self) -> ComponentResult<()> {
        self.curve = fit_curve(FIT_TARGET, self.kind, &self.z, &self.force, Extrapolation::Clamp)?;
        Ok(())
    }

    /// Swap the model family and refit. The spring is unchanged on error.
    pub fn set_model(&mut self, model: &str) -> ComponentResult<()> {
        let kind = CurveKind::lookup(model, &CurveKind::ALL)?;
        let curve = fit_curve(FIT_TARGET, kind, &self.z, &self.force, Extrapolation::Clamp)?;
        self.kind = kind;
        self.curve = curve;
        Ok(())
    }
}
