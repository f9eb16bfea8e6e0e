//! Savitzky-Golay smoothing.

use crate::error::{FitError, FitResult};
use nalgebra::{DMatrix, DVector};

/// Smooth `y` with a Savitzky-Golay filter.
///
/// Each output sample is the value at that sample of a least-squares
/// polynomial of degree `order` fitted to `window` neighbouring samples.
/// Near the edges the window is shifted inwards so it stays fully inside
/// the data, and the edge polynomial is evaluated at the offset of the
/// sample being smoothed.
pub fn savgol_smooth(y: &[f64], window: usize, order: usize) -> FitResult<Vec<f64>> {
    if window % 2 == 0 {
        return Err(FitError::InvalidArg {
            what: "savgol window must be odd",
        });
    }
    if order >= window {
        return Err(FitError::InvalidArg {
            what: "savgol order must be less than window",
        });
    }
    if y.len() < window {
        return Err(FitError::InsufficientSamples {
            what: "savgol smoothing",
            needed: window,
            got: y.len(),
        });
    }

    let n = y.len();
    let half = window / 2;
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let start = i.saturating_sub(half).min(n - window);
        let vandermonde = DMatrix::from_fn(window, order + 1, |r, c| {
            let offset = (start + r) as f64 - i as f64;
            offset.powi(c as i32)
        });
        let rhs = DVector::from_column_slice(&y[start..start + window]);

        let coeffs = vandermonde
            .svd(true, true)
            .solve(&rhs, 1e-12)
            .map_err(|e| FitError::Numeric {
                what: format!("savgol least squares: {e}"),
            })?;
        // Polynomial evaluated at offset zero
        out.push(coeffs[0]);
    }

    Ok(out)
}

/// Largest odd window not exceeding `preferred` or `len`.
pub fn fit_window(preferred: usize, len: usize) -> usize {
    let w = preferred.min(len);
    if w % 2 == 0 { w.saturating_sub(1) } else { w }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn preserves_polynomial_of_matching_order() {
        let y: Vec<f64> = (0..15).map(|i| {
            let x = i as f64;
            0.5 * x * x - 2.0 * x + 3.0
        }).collect();
        let smoothed = savgol_smooth(&y, 7, 2).unwrap();
        for (a, b) in smoothed.iter().zip(&y) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn reduces_alternating_noise() {
        let y: Vec<f64> = (0..21).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let smoothed = savgol_smooth(&y, 5, 1).unwrap();
        let rough: f64 = y.iter().map(|v| v.abs()).sum();
        let smooth: f64 = smoothed.iter().map(|v| v.abs()).sum();
        assert!(smooth < rough / 2.0);
    }

    #[test]
    fn rejects_even_window() {
        assert!(savgol_smooth(&[0.0; 10], 4, 1).is_err());
    }

    #[test]
    fn window_helper_is_odd_and_bounded() {
        assert_eq!(fit_window(11, 100), 11);
        assert_eq!(fit_window(11, 8), 7);
        assert_eq!(fit_window(10, 100), 9);
    }
}
