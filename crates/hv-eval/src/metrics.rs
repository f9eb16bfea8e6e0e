//! Metric functions and ordered metric sets.
//!
//! Every metric takes `(predict, target)` and may return a scalar or an
//! array. Library metrics compare element-wise over the common length.

use crate::dtw::dtw;
use crate::score::MetricValue;
use std::fmt;
use std::sync::Arc;

pub type MetricFn = Arc<dyn Fn(&[f64], &[f64]) -> MetricValue + Send + Sync>;

/// Named metrics, scored in insertion order.
#[derive(Clone, Default)]
pub struct MetricSet {
    metrics: Vec<(String, MetricFn)>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metric; a repeated name replaces the earlier metric in place.
    pub fn with<F, R>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[f64], &[f64]) -> R + Send + Sync + 'static,
        R: Into<MetricValue>,
    {
        self.insert(name, f);
        self
    }

    pub fn insert<F, R>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[f64], &[f64]) -> R + Send + Sync + 'static,
        R: Into<MetricValue>,
    {
        let name = name.into();
        let f: MetricFn = Arc::new(move |p: &[f64], t: &[f64]| -> MetricValue {
            f(p, t).into()
        });
        match self.metrics.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = f,
            None => self.metrics.push((name, f)),
        }
    }

    /// Resolve names from the built-in library.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut set = Self::new();
        for name in names {
            let f = builtin(name)?;
            set.metrics.push((name.to_string(), f));
        }
        Some(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricFn)> {
        self.metrics.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl fmt::Debug for MetricSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.metrics.iter().map(|(n, _)| n)).finish()
    }
}

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: [&str; 8] = [
    "mean_absolute_error",
    "root_mean_square_error",
    "median_absolute_error",
    "max_error",
    "mean_absolute_percentage_error",
    "root_mean_square",
    "dtw_euclid_distance",
    "correlation",
];

/// Look up a library metric by name.
pub fn builtin(name: &str) -> Option<MetricFn> {
    let f: MetricFn = match name {
        "mean_absolute_error" => wrap(mean_absolute_error),
        "root_mean_square_error" => wrap(root_mean_square_error),
        "median_absolute_error" => wrap(median_absolute_error),
        "max_error" => wrap(max_error),
        "mean_absolute_percentage_error" => wrap(mean_absolute_percentage_error),
        "root_mean_square" => wrap(root_mean_square),
        "dtw_euclid_distance" => wrap(dtw_euclid_distance),
        "correlation" => wrap(correlation),
        _ => return None,
    };
    Some(f)
}

fn wrap<R: Into<MetricValue> + 'static>(f: fn(&[f64], &[f64]) -> R) -> MetricFn {
    Arc::new(move |p: &[f64], t: &[f64]| -> MetricValue { f(p, t).into() })
}

fn abs_errors(p: &[f64], t: &[f64]) -> Vec<f64> {
    p.iter().zip(t).map(|(p, t)| (p - t).abs()).collect()
}

fn mean_of(v: &[f64]) -> f64 {
    if v.is_empty() {
        return f64::NAN;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

pub fn mean_absolute_error(p: &[f64], t: &[f64]) -> f64 {
    mean_of(&abs_errors(p, t))
}

pub fn root_mean_square_error(p: &[f64], t: &[f64]) -> f64 {
    let sq: Vec<f64> = p.iter().zip(t).map(|(p, t)| (p - t).powi(2)).collect();
    mean_of(&sq).sqrt()
}

pub fn median_absolute_error(p: &[f64], t: &[f64]) -> f64 {
    let mut e = abs_errors(p, t);
    if e.is_empty() {
        return f64::NAN;
    }
    e.sort_by(f64::total_cmp);
    let mid = e.len() / 2;
    if e.len() % 2 == 0 {
        0.5 * (e[mid - 1] + e[mid])
    } else {
        e[mid]
    }
}

pub fn max_error(p: &[f64], t: &[f64]) -> f64 {
    abs_errors(p, t).into_iter().fold(f64::NAN, f64::max)
}

/// Mean of `|t - p| / |t|` in percent; samples with a zero target are skipped.
pub fn mean_absolute_percentage_error(p: &[f64], t: &[f64]) -> f64 {
    let ratios: Vec<f64> = p
        .iter()
        .zip(t)
        .filter(|(_, t)| **t != 0.0)
        .map(|(p, t)| ((t - p) / t).abs())
        .collect();
    100.0 * mean_of(&ratios)
}

fn rms(v: &[f64]) -> f64 {
    let sq: Vec<f64> = v.iter().map(|x| x * x).collect();
    mean_of(&sq).sqrt()
}

/// `[rms(predict), rms(target)]`.
pub fn root_mean_square(p: &[f64], t: &[f64]) -> Vec<f64> {
    vec![rms(p), rms(t)]
}

/// Cumulative DTW distance between the two series.
pub fn dtw_euclid_distance(p: &[f64], t: &[f64]) -> f64 {
    dtw(p, t).map_or(f64::NAN, |al| al.distance)
}

/// Pearson correlation coefficient.
pub fn correlation(p: &[f64], t: &[f64]) -> f64 {
    let n = p.len().min(t.len());
    let (p, t) = (&p[..n], &t[..n]);
    let (mp, mt) = (mean_of(p), mean_of(t));
    let mut cov = 0.0;
    let mut vp = 0.0;
    let mut vt = 0.0;
    for (a, b) in p.iter().zip(t) {
        cov += (a - mp) * (b - mt);
        vp += (a - mp).powi(2);
        vt += (b - mt).powi(2);
    }
    cov / (vp * vt).sqrt()
}
