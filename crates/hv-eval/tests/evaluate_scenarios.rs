//! End-to-end evaluator scenarios.

use hv_eval::{EvalError, Evaluator, MetricSet, MetricValue, metrics};

const TARGET: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0];
const PREDICT: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.0, 4.0, 3.0];
const TIME: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

#[test]
fn electrical_mean_and_max_over_both_series() {
    let metrics = MetricSet::new()
        .with("mean", |p: &[f64], t: &[f64]| {
            p.iter().chain(t).sum::<f64>() / (p.len() + t.len()) as f64
        })
        .with("max_value", |p: &[f64], t: &[f64]| {
            p.iter().chain(t).copied().fold(f64::MIN, f64::max)
        });

    let mut ev = Evaluator::electrical(&TARGET, &TIME, false, 0.0).unwrap();
    assert_eq!(ev.score(&metrics).unwrap_err(), EvalError::NotFitted);
    ev.fit(&PREDICT, &TIME).unwrap();
    let score = ev.score(&metrics).unwrap();

    // (25 + 33) / 18
    approx::assert_relative_eq!(score.scalar("mean").unwrap(), 3.2222222222, epsilon = 1e-9);
    assert_eq!(score.scalar("max_value"), Some(6.0));
}

#[test]
fn library_metrics_on_mechanical_signal() {
    let metrics = MetricSet::new()
        .with("mae", metrics::mean_absolute_error)
        .with("max", metrics::max_error)
        .with("rms", metrics::root_mean_square);

    let mut ev = Evaluator::mechanical(&TARGET, &TIME, false).unwrap();
    ev.fit(&PREDICT, &TIME).unwrap();
    let score = ev.score(&metrics).unwrap();

    // errors: 0 0 0 0 0 2 2 2 2
    approx::assert_relative_eq!(score.scalar("mae").unwrap(), 8.0 / 9.0);
    assert_eq!(score.scalar("max"), Some(2.0));
    assert!(matches!(score.get("rms"), Some(MetricValue::Array(v)) if v.len() == 2));
}

#[test]
fn warped_identical_signals_score_zero() {
    let metrics = MetricSet::from_names(["mean_absolute_error", "dtw_euclid_distance"]).unwrap();
    let mut ev = Evaluator::electrical(&TARGET, &TIME, true, 0.0).unwrap();
    ev.fit(&TARGET, &TIME).unwrap();
    let score = ev.score(&metrics).unwrap();
    assert_eq!(score.scalar("mean_absolute_error"), Some(0.0));
    assert_eq!(score.scalar("dtw_euclid_distance"), Some(0.0));
}
