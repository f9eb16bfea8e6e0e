//! Closed-form model families for iterative curve fits.

use hv_core::constants::MU0;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Closed-form force/flux law with a fixed number of coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParametricFamily {
    /// Point-dipole Coulomb law: `F = mu0 * m^2 / (4 pi z^2)`, params `[m]`.
    CoulombsUnmodified,
    /// Inverse-power law: `F = mu0 * a / (4 pi z^x)`, params `[a, x]`.
    CoulombsModified,
    /// `F = a0 + a1 z + a2 z^2`
    PowerSeries2,
    /// `F = a0 + a1 z + a2 z^2 + a3 z^3`
    PowerSeries3,
}

impl ParametricFamily {
    pub fn name(self) -> &'static str {
        match self {
            ParametricFamily::CoulombsUnmodified => "coulombs_unmodified",
            ParametricFamily::CoulombsModified => "coulombs_modified",
            ParametricFamily::PowerSeries2 => "power_series_2",
            ParametricFamily::PowerSeries3 => "power_series_3",
        }
    }

    pub fn param_count(self) -> usize {
        match self {
            ParametricFamily::CoulombsUnmodified => 1,
            ParametricFamily::CoulombsModified => 2,
            ParametricFamily::PowerSeries2 => 3,
            ParametricFamily::PowerSeries3 => 4,
        }
    }

    pub fn eval(self, z: f64, p: &[f64]) -> f64 {
        match self {
            ParametricFamily::CoulombsUnmodified => MU0 * p[0] * p[0] / (4.0 * PI * z * z),
            ParametricFamily::CoulombsModified => MU0 * p[0] / (4.0 * PI * z.powf(p[1])),
            ParametricFamily::PowerSeries2 | ParametricFamily::PowerSeries3 => {
                // Horner
                p.iter().rev().fold(0.0, |acc, c| acc * z + c)
            }
        }
    }

    /// Starting point for the iterative fit.
    ///
    /// Uses closed-form estimates where the family allows one (log-linear
    /// regression for the inverse-power law, linear least squares for the
    /// power series) and falls back to ones otherwise.
    pub fn initial_guess(self, z: &[f64], y: &[f64]) -> Vec<f64> {
        let ones = vec![1.0; self.param_count()];
        match self {
            ParametricFamily::CoulombsUnmodified => {
                let scale = 4.0 * PI / MU0;
                let est: Vec<f64> = z
                    .iter()
                    .zip(y)
                    .filter(|(zi, yi)| **zi > 0.0 && **yi > 0.0)
                    .map(|(zi, yi)| (yi * zi * zi * scale).sqrt())
                    .collect();
                if est.is_empty() {
                    ones
                } else {
                    vec![hv_core::mean(&est)]
                }
            }
            ParametricFamily::CoulombsModified => {
                // ln F = ln(mu0 a / 4 pi) - x ln z
                let (lz, lf): (Vec<f64>, Vec<f64>) = z
                    .iter()
                    .zip(y)
                    .filter(|(zi, yi)| **zi > 0.0 && **yi > 0.0)
                    .map(|(zi, yi)| (zi.ln(), yi.ln()))
                    .unzip();
                match polyfit(&lz, &lf, 1) {
                    Some(c) => vec![c[0].exp() * 4.0 * PI / MU0, -c[1]],
                    None => ones,
                }
            }
            ParametricFamily::PowerSeries2 => polyfit(z, y, 2).unwrap_or(ones),
            ParametricFamily::PowerSeries3 => polyfit(z, y, 3).unwrap_or(ones),
        }
    }
}

/// Least-squares polynomial coefficients, lowest order first.
fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    if x.len() <= degree {
        return None;
    }
    let a = DMatrix::from_fn(x.len(), degree + 1, |r, c| x[r].powi(c as i32));
    let b = DVector::from_column_slice(y);
    let coeffs = a.svd(true, true).solve(&b, 1e-14).ok()?;
    if coeffs.iter().all(|c| c.is_finite()) {
        Some(coeffs.iter().copied().collect())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn power_series_uses_horner() {
        let p = [1.0, 2.0, 3.0];
        assert_relative_eq!(ParametricFamily::PowerSeries2.eval(2.0, &p), 1.0 + 4.0 + 12.0);
    }

    #[test]
    fn inverse_power_guess_recovers_exact_law() {
        let z: Vec<f64> = (1..20).map(|i| 0.005 * i as f64).collect();
        let y: Vec<f64> = z
            .iter()
            .map(|zi| ParametricFamily::CoulombsModified.eval(*zi, &[2.0e-3, 2.5]))
            .collect();
        let guess = ParametricFamily::CoulombsModified.initial_guess(&z, &y);
        assert_relative_eq!(guess[0], 2.0e-3, max_relative = 1e-8);
        assert_relative_eq!(guess[1], 2.5, max_relative = 1e-8);
    }

    #[test]
    fn guess_falls_back_to_ones_without_positive_samples() {
        let guess = ParametricFamily::CoulombsModified.initial_guess(&[-1.0, -2.0], &[1.0, 2.0]);
        assert_eq!(guess, vec![1.0, 1.0]);
    }
}
