//! Fits of every registered curve kind against synthetic force curves.

use approx::assert_relative_eq;
use hv_core::constants::MU0;
use hv_fit::{CurveKind, Extrapolation, FitError, ParametricFamily, fit_curve};
use std::f64::consts::PI;

fn positions() -> Vec<f64> {
    (1..=50).map(|i| 0.004 + 0.001 * i as f64).collect()
}

#[test]
fn inverse_power_law_recovers_coefficients() {
    let (a, x) = (0.8, 2.6);
    let z = positions();
    let f: Vec<f64> = z.iter().map(|z| MU0 * a / (4.0 * PI * z.powf(x))).collect();

    let curve = fit_curve(
        "magnetic spring",
        CurveKind::Parametric(ParametricFamily::CoulombsModified),
        &z,
        &f,
        Extrapolation::Clamp,
    )
    .unwrap();
    let params = curve.params().unwrap();
    assert_relative_eq!(params[0], a, max_relative = 1e-6);
    assert_relative_eq!(params[1], x, max_relative = 1e-6);
    assert_relative_eq!(curve.eval(0.02), MU0 * a / (4.0 * PI * 0.02_f64.powf(x)), max_relative = 1e-6);
}

#[test]
fn cubic_series_recovers_polynomial() {
    let coeffs = [1.0, -20.0, 300.0, -1500.0];
    let z = positions();
    let f: Vec<f64> = z
        .iter()
        .map(|z| coeffs[0] + coeffs[1] * z + coeffs[2] * z * z + coeffs[3] * z * z * z)
        .collect();
    let kind: CurveKind = "power_series_3".parse().unwrap();
    let curve = fit_curve("flux", kind, &z, &f, Extrapolation::Clamp).unwrap();
    for (p, c) in curve.params().unwrap().iter().zip(coeffs) {
        assert_relative_eq!(*p, c, epsilon = 1e-6, max_relative = 1e-4);
    }
}

#[test]
fn interpolating_kinds_pass_through_samples() {
    let z = positions();
    let f: Vec<f64> = z.iter().map(|z| (-z * 40.0).exp()).collect();
    for name in ["interp", "unispline"] {
        let kind: CurveKind = name.parse().unwrap();
        let curve = fit_curve("magnetic spring", kind, &z, &f, Extrapolation::Clamp).unwrap();
        assert!(curve.params().is_none());
        for (zi, fi) in z.iter().zip(&f).step_by(7) {
            assert_relative_eq!(curve.eval(*zi), *fi, epsilon = 1e-12);
        }
        // clamped outside the sampled range
        assert_relative_eq!(curve.eval(10.0), f[f.len() - 1], epsilon = 1e-12);
    }
}

#[test]
fn savgol_smoothing_tracks_smooth_data() {
    let z = positions();
    let f: Vec<f64> = z.iter().map(|z| 2.0 - 30.0 * z + 100.0 * z * z).collect();
    let curve = fit_curve("magnetic spring", CurveKind::SavgolSmoothing, &z, &f, Extrapolation::Clamp).unwrap();
    // a cubic filter reproduces a quadratic exactly
    assert_relative_eq!(curve.eval(z[25]), f[25], epsilon = 1e-9);
}

#[test]
fn registry_errors_name_the_key() {
    let allowed = [CurveKind::Interp, CurveKind::Unispline];
    let err = CurveKind::lookup("coulombs_modified", &allowed).unwrap_err();
    match err {
        FitError::ModelNotFound { key, available } => {
            assert_eq!(key, "coulombs_modified");
            assert_eq!(available, "interp, unispline");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!("nope".parse::<CurveKind>().is_err());
}
