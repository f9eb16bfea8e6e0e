//! Coil flux linkage models.
//!
//! A [`FluxModel`] pairs the flux curve `z -> phi` with its derivative
//! `z -> dphi/dz`. Both are zero outside the sampled range.

use crate::error::{ComponentError, ComponentResult};
use hv_core::numeric::{ensure_all_finite, ensure_same_len, gradient};
use hv_fit::{CubicSpline, Extrapolation, LinearCurve};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Registered flux model kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluxModelKind {
    /// Linear interpolation of the flux; derivative from numerical gradient.
    Interp,
    /// Natural cubic spline with analytic derivative.
    Unispline,
}

impl FluxModelKind {
    pub const ALL: [FluxModelKind; 2] = [FluxModelKind::Interp, FluxModelKind::Unispline];

    pub fn name(self) -> &'static str {
        match self {
            FluxModelKind::Interp => "interp",
            FluxModelKind::Unispline => "unispline",
        }
    }

    pub fn lookup(key: &str) -> ComponentResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or_else(|| ComponentError::ModelNotFound {
                key: key.to_string(),
                what: "flux model not found",
            })
    }
}

impl FromStr for FluxModelKind {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
    }
}

impl fmt::Display for FluxModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type ScalarFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A scalar function of magnet position.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FluxFn {
    Linear(LinearCurve),
    Spline(CubicSpline),
    /// First derivative of the wrapped spline.
    SplineSlope(CubicSpline),
    /// User-supplied function; cannot be persisted.
    #[serde(skip)]
    Custom(ScalarFn),
}

impl FluxFn {
    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        FluxFn::Custom(Arc::new(f))
    }

    pub fn eval(&self, z: f64) -> f64 {
        match self {
            FluxFn::Linear(c) => c.eval(z),
            FluxFn::Spline(s) => s.eval(z),
            FluxFn::SplineSlope(s) => s.derivative(z),
            FluxFn::Custom(f) => f(z),
        }
    }

    pub fn is_persistable(&self) -> bool {
        !matches!(self, FluxFn::Custom(_))
    }
}

impl fmt::Debug for FluxFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluxFn::Linear(c) => f.debug_tuple("Linear").field(c).finish(),
            FluxFn::Spline(s) => f.debug_tuple("Spline").field(s).finish(),
            FluxFn::SplineSlope(s) => f.debug_tuple("SplineSlope").field(s).finish(),
            FluxFn::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluxModel {
    /// `None` for user-supplied functions.
    kind: Option<FluxModelKind>,
    flux: FluxFn,
    dflux: FluxFn,
}

impl FluxModel {
    /// Build from `(z, phi)` samples taken directly in the model's frame.
    pub fn from_samples(kind: FluxModelKind, z: &[f64], phi: &[f64]) -> ComponentResult<Self> {
        ensure_same_len(z, phi, "flux samples")?;
        ensure_all_finite(z, "flux positions")?;
        ensure_all_finite(phi, "flux linkage")?;

        let fill = Extrapolation::Fill(0.0);
        let (flux, dflux) = match kind {
            FluxModelKind::Interp => {
                let flux = LinearCurve::new(z, phi, fill)?;
                // gradient over the sorted samples the curve holds
                let dphi = gradient(flux.x(), flux.y());
                let dflux = LinearCurve::new(flux.x(), &dphi, fill)?;
                (FluxFn::Linear(flux), FluxFn::Linear(dflux))
            }
            FluxModelKind::Unispline => {
                let spline = CubicSpline::new(z, phi, fill)?;
                (FluxFn::Spline(spline.clone()), FluxFn::SplineSlope(spline))
            }
        };

        Ok(Self {
            kind: Some(kind),
            flux,
            dflux,
        })
    }

    /// Build from a raw FEA flux curve.
    ///
    /// The curve is re-centred so its |phi| peak sits at the coil centre,
    /// measured from the bottom edge of a magnet assembly `mm` millimetres
    /// tall: `z' = z - z_peak + coil_center - mm / 1000`.
    pub fn from_database_curve(
        kind: FluxModelKind,
        z: &[f64],
        phi: &[f64],
        coil_center: f64,
        mm: f64,
    ) -> ComponentResult<Self> {
        ensure_same_len(z, phi, "flux samples")?;
        let peak = phi
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .map(|(i, _)| i)
            .ok_or(ComponentError::InvalidArg {
                what: "flux curve has no finite samples",
            })?;

        let offset = coil_center - mm / 1000.0 - z[peak];
        let shifted: Vec<f64> = z.iter().map(|zi| zi + offset).collect();
        Self::from_samples(kind, &shifted, phi)
    }

    /// Pair arbitrary flux and derivative functions.
    pub fn custom(
        flux: impl Fn(f64) -> f64 + Send + Sync + 'static,
        dflux: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: None,
            flux: FluxFn::custom(flux),
            dflux: FluxFn::custom(dflux),
        }
    }

    pub fn kind(&self) -> Option<FluxModelKind> {
        self.kind
    }

    /// Flux linkage [Wb] at relative magnet position `z` [m].
    pub fn flux(&self, z: f64) -> f64 {
        self.flux.eval(z)
    }

    /// dphi/dz [Wb/m] at `z`.
    pub fn dflux(&self, z: f64) -> f64 {
        self.dflux.eval(z)
    }

    pub fn is_persistable(&self) -> bool {
        self.flux.is_persistable() && self.dflux.is_persistable()
    }
}
