use crate::CoreError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Check that every element of `values` is finite.
pub fn ensure_all_finite(values: &[f64], what: &'static str) -> Result<(), CoreError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(CoreError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Check that two paired series have equal length.
pub fn ensure_same_len(a: &[f64], b: &[f64], what: &'static str) -> Result<(), CoreError> {
    if a.len() != b.len() {
        return Err(CoreError::LengthMismatch {
            what,
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Numerical gradient of `y` with respect to `x`.
///
/// Second-order central differences in the interior (non-uniform spacing
/// supported) and first-order one-sided differences at the boundaries.
/// Fewer than two samples yield a vector of zeros.
pub fn gradient(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = vec![0.0; n];
    out[0] = (y[1] - y[0]) / (x[1] - x[0]);
    out[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);

    for i in 1..n - 1 {
        let hs = x[i] - x[i - 1];
        let hd = x[i + 1] - x[i];
        let denom = hs * hd * (hs + hd);
        out[i] = (hs * hs * y[i + 1] + (hd * hd - hs * hs) * y[i] - hd * hd * y[i - 1]) / denom;
    }
    out
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_reports_offender() {
        let err = ensure_all_finite(&[1.0, f64::INFINITY], "series").unwrap_err();
        assert!(matches!(err, CoreError::NonFinite { what: "series", .. }));
        assert!(ensure_all_finite(&[1.0, 2.0], "series").is_ok());
    }

    #[test]
    fn gradient_of_quadratic_is_exact_in_interior() {
        let x: Vec<f64> = (0..6).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let g = gradient(&x, &y);
        for i in 1..5 {
            approx::assert_relative_eq!(g[i], 2.0 * x[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn gradient_handles_uneven_spacing() {
        let x = [0.0, 1.0, 3.0];
        let y = [0.0, 2.0, 6.0];
        let g = gradient(&x, &y);
        assert_eq!(g, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
