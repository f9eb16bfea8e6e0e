//! hv-eval: scoring predicted harvester signals against measurements.
//!
//! An [`Evaluator`] holds a target signal, aligns a prediction to it with
//! [`Evaluator::fit`] (resampling, optional dynamic time warping and, for
//! electrical signals, trimming of silent leading/trailing target samples)
//! and then applies named metric functions with [`Evaluator::score`].

pub mod clip;
pub mod dtw;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod resample;
pub mod score;

pub use clip::{spectral_clip_bounds, frame_powers};
pub use dtw::{DtwAlignment, dtw};
pub use error::{EvalError, EvalResult};
pub use evaluator::{Aligned, Evaluator, EvaluatorKind};
pub use metrics::{MetricFn, MetricSet};
pub use resample::{resample, restrict_to_span};
pub use score::{MetricValue, Score};
