//! Piecewise-linear interpolation curves.

use crate::error::{FitError, FitResult};
use ndarray::Array1;
use ninterp::prelude::{Interp1DOwned, Interpolator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Behaviour outside the sampled range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Extrapolation {
    /// Hold the nearest end value.
    Clamp,
    /// Return a fixed value.
    Fill(f64),
}

impl From<Extrapolation> for ninterp::interpolator::Extrapolate<f64> {
    fn from(value: Extrapolation) -> Self {
        match value {
            Extrapolation::Clamp => ninterp::interpolator::Extrapolate::Clamp,
            Extrapolation::Fill(v) => ninterp::interpolator::Extrapolate::Fill(v),
        }
    }
}

/// Serialized form of a [`LinearCurve`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearCurveData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub extrapolation: Extrapolation,
}

/// Linear interpolant through `(x, y)` samples.
///
/// Samples are sorted by `x` on construction; duplicate positions are
/// rejected.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "LinearCurveData", try_from = "LinearCurveData")]
pub struct LinearCurve {
    x: Vec<f64>,
    y: Vec<f64>,
    extrapolation: Extrapolation,
    interp: Arc<Interp1DOwned<f64, ninterp::strategy::Linear>>,
}

impl LinearCurve {
    pub fn new(x: &[f64], y: &[f64], extrapolation: Extrapolation) -> FitResult<Self> {
        hv_core::ensure_same_len(x, y, "interpolation samples")?;
        if x.len() < 2 {
            return Err(FitError::InsufficientSamples {
                what: "linear interpolation",
                needed: 2,
                got: x.len(),
            });
        }
        hv_core::ensure_all_finite(x, "interpolation positions")?;
        hv_core::ensure_all_finite(y, "interpolation values")?;

        let (xs, ys) = sorted_pairs(x, y)?;
        let interp = Interp1DOwned::new(
            Array1::from_vec(xs.clone()),
            Array1::from_vec(ys.clone()),
            ninterp::strategy::Linear,
            extrapolation.into(),
        )?;

        Ok(Self {
            x: xs,
            y: ys,
            extrapolation,
            interp: Arc::new(interp),
        })
    }

    /// Evaluate at `x`, surfacing interpolation errors.
    pub fn try_eval(&self, x: f64) -> FitResult<f64> {
        Ok(self.interp.interpolate(&[x])?)
    }

    /// Evaluate at `x`. Evaluation failures (e.g. a NaN query) yield NaN so
    /// downstream finiteness checks see them.
    pub fn eval(&self, x: f64) -> f64 {
        self.try_eval(x).unwrap_or(f64::NAN)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Sampled domain `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }
}

impl fmt::Debug for LinearCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearCurve")
            .field("points", &self.x.len())
            .field("domain", &self.domain())
            .field("extrapolation", &self.extrapolation)
            .finish()
    }
}

impl From<LinearCurve> for LinearCurveData {
    fn from(curve: LinearCurve) -> Self {
        Self {
            x: curve.x,
            y: curve.y,
            extrapolation: curve.extrapolation,
        }
    }
}

impl TryFrom<LinearCurveData> for LinearCurve {
    type Error = FitError;

    fn try_from(data: LinearCurveData) -> Result<Self, Self::Error> {
        LinearCurve::new(&data.x, &data.y, data.extrapolation)
    }
}

/// Sort samples by position and reject duplicate positions.
pub(crate) fn sorted_pairs(x: &[f64], y: &[f64]) -> FitResult<(Vec<f64>, Vec<f64>)> {
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(FitError::InvalidArg {
            what: "duplicate sample positions",
        });
    }

    Ok(pairs.into_iter().unzip())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn stays_within_sample_bounds(
            y in prop::collection::vec(-1.0e3_f64..1.0e3, 2..20),
            frac in 0.0_f64..1.0,
        ) {
            let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
            let curve = LinearCurve::new(&x, &y, Extrapolation::Clamp).unwrap();
            let lo = y.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let v = curve.eval(frac * (y.len() - 1) as f64);
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
