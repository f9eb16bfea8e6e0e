//! Natural cubic spline interpolation with analytic derivative.

use crate::error::{FitError, FitResult};
use crate::interp::{Extrapolation, sorted_pairs};
use serde::{Deserialize, Serialize};

/// Serialized form of a [`CubicSpline`]: the knots only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CubicSplineData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub extrapolation: Extrapolation,
}

/// Interpolating natural cubic spline (zero curvature at both ends).
///
/// Outside the knot range the spline follows `extrapolation`; the
/// derivative there is zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "CubicSplineData", try_from = "CubicSplineData")]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots
    m: Vec<f64>,
    extrapolation: Extrapolation,
}

impl CubicSpline {
    pub fn new(x: &[f64], y: &[f64], extrapolation: Extrapolation) -> FitResult<Self> {
        hv_core::ensure_same_len(x, y, "spline samples")?;
        if x.len() < 3 {
            return Err(FitError::InsufficientSamples {
                what: "cubic spline",
                needed: 3,
                got: x.len(),
            });
        }
        hv_core::ensure_all_finite(x, "spline positions")?;
        hv_core::ensure_all_finite(y, "spline values")?;

        let (xs, ys) = sorted_pairs(x, y)?;
        let m = natural_second_derivatives(&xs, &ys);
        Ok(Self {
            x: xs,
            y: ys,
            m,
            extrapolation,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let n = self.x.len();
        if x < self.x[0] || x > self.x[n - 1] {
            return match self.extrapolation {
                Extrapolation::Fill(v) => v,
                Extrapolation::Clamp if x < self.x[0] => self.y[0],
                Extrapolation::Clamp => self.y[n - 1],
            };
        }

        let i = self.segment(x);
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - x) / h;
        let b = (x - self.x[i]) / h;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }

    /// First derivative dy/dx.
    pub fn derivative(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let n = self.x.len();
        if x < self.x[0] || x > self.x[n - 1] {
            return 0.0;
        }

        let i = self.segment(x);
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - x) / h;
        let b = (x - self.x[i]) / h;
        (self.y[i + 1] - self.y[i]) / h - (3.0 * a * a - 1.0) * h * self.m[i] / 6.0
            + (3.0 * b * b - 1.0) * h * self.m[i + 1] / 6.0
    }

    pub fn knots(&self) -> (&[f64], &[f64]) {
        (&self.x, &self.y)
    }

    /// Index of the segment `[x_i, x_{i+1}]` containing `x` (assumed in range).
    fn segment(&self, x: f64) -> usize {
        let idx = self.x.partition_point(|&k| k <= x);
        idx.saturating_sub(1).min(self.x.len() - 2)
    }
}

/// Solve the tridiagonal system for the natural spline second derivatives.
fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut m = vec![0.0; n];
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    // Thomas algorithm over the interior knots 1..n-1
    for i in 1..n - 1 {
        let h0 = x[i] - x[i - 1];
        let h1 = x[i + 1] - x[i];
        let lower = h0;
        let diag = 2.0 * (h0 + h1);
        let upper = h1;
        let rhs = 6.0 * ((y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0);

        let denom = diag - lower * c_prime[i - 1];
        c_prime[i] = upper / denom;
        d_prime[i] = (rhs - lower * d_prime[i - 1]) / denom;
    }

    for i in (1..n - 1).rev() {
        m[i] = d_prime[i] - c_prime[i] * m[i + 1];
    }
    m
}

impl From<CubicSpline> for CubicSplineData {
    fn from(spline: CubicSpline) -> Self {
        Self {
            x: spline.x,
            y: spline.y,
            extrapolation: spline.extrapolation,
        }
    }
}

impl TryFrom<CubicSplineData> for CubicSpline {
    type Error = FitError;

    fn try_from(data: CubicSplineData) -> Result<Self, Self::Error> {
        CubicSpline::new(&data.x, &data.y, data.extrapolation)
    }
}
