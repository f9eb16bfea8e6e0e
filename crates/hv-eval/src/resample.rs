//! Putting two series on one time base.

use crate::error::{EvalError, EvalResult};
use hv_fit::{Extrapolation, LinearCurve};

/// Linearly interpolate `(time_src, values_src)` at each of `time_dst`,
/// holding the end values outside the source span.
pub fn resample(time_src: &[f64], values_src: &[f64], time_dst: &[f64]) -> EvalResult<Vec<f64>> {
    let curve = LinearCurve::new(time_src, values_src, Extrapolation::Clamp)?;
    time_dst.iter().map(|&t| Ok(curve.try_eval(t)?)).collect()
}

/// Keep only the samples whose time lies in `[start, end]`.
///
/// Returns `(time, values)`; fails if nothing remains.
pub fn restrict_to_span(
    time: &[f64],
    values: &[f64],
    start: f64,
    end: f64,
) -> EvalResult<(Vec<f64>, Vec<f64>)> {
    let (t, v): (Vec<f64>, Vec<f64>) = time
        .iter()
        .zip(values)
        .filter(|(t, _)| **t >= start && **t <= end)
        .map(|(t, v)| (*t, *v))
        .unzip();
    if t.is_empty() {
        return Err(EvalError::NoOverlap { start, end });
    }
    Ok((t, v))
}
