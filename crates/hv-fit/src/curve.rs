//! Curve-kind registry and fitted curves.

use crate::error::{FitError, FitResult};
use crate::family::ParametricFamily;
use crate::interp::{Extrapolation, LinearCurve};
use crate::levenberg::{LmConfig, levenberg_marquardt};
use crate::savgol::{fit_window, savgol_smooth};
use crate::spline::CubicSpline;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default Savitzky-Golay window and polynomial order.
const SAVGOL_WINDOW: usize = 11;
const SAVGOL_ORDER: usize = 3;

/// How a curve is obtained from samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// Iterative least-squares fit of a closed-form family.
    Parametric(ParametricFamily),
    /// Savitzky-Golay smoothing followed by linear interpolation.
    SavgolSmoothing,
    /// Linear interpolation through the samples.
    Interp,
    /// Natural cubic spline through the samples.
    Unispline,
}

impl CurveKind {
    pub const ALL: [CurveKind; 7] = [
        CurveKind::Parametric(ParametricFamily::CoulombsUnmodified),
        CurveKind::Parametric(ParametricFamily::CoulombsModified),
        CurveKind::Parametric(ParametricFamily::PowerSeries2),
        CurveKind::Parametric(ParametricFamily::PowerSeries3),
        CurveKind::SavgolSmoothing,
        CurveKind::Interp,
        CurveKind::Unispline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CurveKind::Parametric(family) => family.name(),
            CurveKind::SavgolSmoothing => "savgol_smoothing",
            CurveKind::Interp => "interp",
            CurveKind::Unispline => "unispline",
        }
    }

    /// Resolve a registry name, restricted to `allowed` kinds.
    pub fn lookup(key: &str, allowed: &[CurveKind]) -> FitResult<Self> {
        allowed
            .iter()
            .copied()
            .find(|kind| kind.name() == key)
            .ok_or_else(|| FitError::ModelNotFound {
                key: key.to_string(),
                available: allowed.iter().map(|k| k.name()).collect::<Vec<_>>().join(", "),
            })
    }
}

impl FromStr for CurveKind {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CurveKind::lookup(s, &CurveKind::ALL)
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A callable `position -> quantity` produced by [`fit_curve`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedCurve {
    Parametric {
        family: ParametricFamily,
        params: Vec<f64>,
    },
    Linear(LinearCurve),
    Spline(CubicSpline),
}

impl FittedCurve {
    pub fn eval(&self, z: f64) -> f64 {
        match self {
            FittedCurve::Parametric { family, params } => family.eval(z, params),
            FittedCurve::Linear(curve) => curve.eval(z),
            FittedCurve::Spline(spline) => spline.eval(z),
        }
    }

    /// Fitted coefficients, if the curve came from an iterative fit.
    pub fn params(&self) -> Option<&[f64]> {
        match self {
            FittedCurve::Parametric { params, .. } => Some(params),
            _ => None,
        }
    }
}

/// Fit `kind` to `(z, y)` samples.
///
/// `target` names what is being fitted (e.g. "magnetic spring") and is
/// carried into convergence errors. Interpolating kinds use `extrapolation`
/// outside the sampled range. Input samples are never modified.
pub fn fit_curve(
    target: &str,
    kind: CurveKind,
    z: &[f64],
    y: &[f64],
    extrapolation: Extrapolation,
) -> FitResult<FittedCurve> {
    hv_core::ensure_same_len(z, y, "curve samples")?;

    match kind {
        CurveKind::Parametric(family) => {
            hv_core::ensure_all_finite(z, "fit positions")?;
            hv_core::ensure_all_finite(y, "fit values")?;

            let p0 = DVector::from_vec(family.initial_guess(z, y));
            let residual = |p: &DVector<f64>| -> FitResult<DVector<f64>> {
                let params = p.as_slice();
                Ok(DVector::from_iterator(
                    z.len(),
                    z.iter().zip(y).map(|(zi, yi)| family.eval(*zi, params) - yi),
                ))
            };

            let report = levenberg_marquardt(p0, residual, &LmConfig::default()).map_err(|e| match e {
                FitError::ConvergenceFailed { what, .. } => FitError::ConvergenceFailed {
                    target: target.to_string(),
                    model: family.name().to_string(),
                    what,
                },
                other => other,
            })?;

            tracing::debug!(
                target_name = target,
                model = family.name(),
                iterations = report.iterations,
                cost = report.cost,
                "curve fit converged"
            );

            Ok(FittedCurve::Parametric {
                family,
                params: report.params.iter().copied().collect(),
            })
        }
        CurveKind::SavgolSmoothing => {
            let window = fit_window(SAVGOL_WINDOW, z.len());
            let order = SAVGOL_ORDER.min(window.saturating_sub(1));
            let (zs, ys) = crate::interp::sorted_pairs(z, y)?;
            let smoothed = savgol_smooth(&ys, window, order)?;
            Ok(FittedCurve::Linear(LinearCurve::new(&zs, &smoothed, extrapolation)?))
        }
        CurveKind::Interp => Ok(FittedCurve::Linear(LinearCurve::new(z, y, extrapolation)?)),
        CurveKind::Unispline => Ok(FittedCurve::Spline(CubicSpline::new(z, y, extrapolation)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inverse_power_samples() -> (Vec<f64>, Vec<f64>) {
        let z: Vec<f64> = (1..40).map(|i| 0.002 * i as f64).collect();
        let y = z
            .iter()
            .map(|zi| ParametricFamily::CoulombsModified.eval(*zi, &[5.0e-4, 3.1]))
            .collect();
        (z, y)
    }

    #[test]
    fn registry_resolves_every_name() {
        for kind in CurveKind::ALL {
            assert_eq!(kind.name().parse::<CurveKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_lists_attempted_key() {
        let err = "coulombs_typo".parse::<CurveKind>().unwrap_err();
        match err {
            FitError::ModelNotFound { key, available } => {
                assert_eq!(key, "coulombs_typo");
                assert!(available.contains("coulombs_modified"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn restricted_lookup_rejects_disallowed_kind() {
        let err = CurveKind::lookup("coulombs_modified", &[CurveKind::Interp, CurveKind::Unispline])
            .unwrap_err();
        assert!(matches!(err, FitError::ModelNotFound { .. }));
    }

    #[test]
    fn iterative_fit_recovers_inverse_power_law() {
        let (z, y) = inverse_power_samples();
        let curve = fit_curve(
            "magnetic spring",
            CurveKind::Parametric(ParametricFamily::CoulombsModified),
            &z,
            &y,
            Extrapolation::Clamp,
        )
        .unwrap();
        let params = curve.params().unwrap();
        assert_eq!(params.len(), 2);
        assert_relative_eq!(params[0], 5.0e-4, max_relative = 1e-6);
        assert_relative_eq!(params[1], 3.1, max_relative = 1e-6);
    }

    #[test]
    fn fit_does_not_mutate_samples() {
        let (z, y) = inverse_power_samples();
        let (z0, y0) = (z.clone(), y.clone());
        fit_curve("magnetic spring", CurveKind::SavgolSmoothing, &z, &y, Extrapolation::Clamp).unwrap();
        assert_eq!(z, z0);
        assert_eq!(y, y0);
    }

    #[test]
    fn non_finite_samples_fail_fit() {
        let err = fit_curve(
            "magnetic spring",
            CurveKind::Parametric(ParametricFamily::PowerSeries2),
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0, f64::NAN, 1.0, 2.0],
            Extrapolation::Clamp,
        )
        .unwrap_err();
        assert!(matches!(err, FitError::Core(_)));
    }

    #[test]
    fn fitted_curve_survives_json() {
        let (z, y) = inverse_power_samples();
        for kind in [CurveKind::Interp, CurveKind::Unispline, CurveKind::SavgolSmoothing] {
            let curve = fit_curve("flux", kind, &z, &y, Extrapolation::Fill(0.0)).unwrap();
            let json = serde_json::to_string(&curve).unwrap();
            let back: FittedCurve = serde_json::from_str(&json).unwrap();
            assert_eq!(back.eval(0.0411), curve.eval(0.0411));
        }
    }
}
