//! Aligning a prediction with a measured target and scoring it.

use crate::clip::spectral_clip_bounds;
use crate::dtw::dtw;
use crate::error::{EvalError, EvalResult};
use crate::metrics::MetricSet;
use crate::resample::{resample, restrict_to_span};
use crate::score::Score;
use hv_core::numeric::{ensure_all_finite, ensure_same_len};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default power threshold for trimming silent electrical target samples.
pub const DEFAULT_CLIP_THRESHOLD: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    /// Position or velocity signals.
    Mechanical,
    /// EMF or voltage signals; supports dead-signal clipping.
    Electrical,
}

/// Target and prediction on one time base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aligned {
    pub time: Vec<f64>,
    pub target: Vec<f64>,
    pub predict: Vec<f64>,
}

/// Single-use scorer for one target signal.
#[derive(Debug, Clone)]
pub struct Evaluator {
    kind: EvaluatorKind,
    target: Vec<f64>,
    time_target: Vec<f64>,
    warp: bool,
    clip_threshold: f64,
    predict: Option<Vec<f64>>,
    time_predict: Option<Vec<f64>>,
    aligned: Option<Aligned>,
}

impl Evaluator {
    fn new(
        kind: EvaluatorKind,
        target: &[f64],
        time_target: &[f64],
        warp: bool,
        clip_threshold: f64,
    ) -> EvalResult<Self> {
        ensure_same_len(target, time_target, "target samples")?;
        ensure_all_finite(target, "target signal")?;
        ensure_all_finite(time_target, "target time")?;
        if target.is_empty() {
            return Err(EvalError::InvalidArg {
                what: "target signal is empty",
            });
        }
        Ok(Self {
            kind,
            target: target.to_vec(),
            time_target: time_target.to_vec(),
            warp,
            clip_threshold,
            predict: None,
            time_predict: None,
            aligned: None,
        })
    }

    pub fn mechanical(y_target: &[f64], time_target: &[f64], warp: bool) -> EvalResult<Self> {
        Self::new(EvaluatorKind::Mechanical, y_target, time_target, warp, 0.0)
    }

    /// `clip_threshold <= 0` disables clipping.
    pub fn electrical(
        emf_target: &[f64],
        time_target: &[f64],
        warp: bool,
        clip_threshold: f64,
    ) -> EvalResult<Self> {
        Self::new(EvaluatorKind::Electrical, emf_target, time_target, warp, clip_threshold)
    }

    pub fn kind(&self) -> EvaluatorKind {
        self.kind
    }

    pub fn warp(&self) -> bool {
        self.warp
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn time_target(&self) -> &[f64] {
        &self.time_target
    }

    /// Prediction passed to the last `fit`.
    pub fn predict(&self) -> Option<&[f64]> {
        self.predict.as_deref()
    }

    pub fn time_predict(&self) -> Option<&[f64]> {
        self.time_predict.as_deref()
    }

    pub fn aligned(&self) -> Option<&Aligned> {
        self.aligned.as_ref()
    }

    /// Target samples that survive dead-signal clipping.
    fn clipped_target(&self) -> (&[f64], &[f64]) {
        if self.kind == EvaluatorKind::Electrical && self.clip_threshold > 0.0 {
            let r = spectral_clip_bounds(&self.target, self.clip_threshold);
            (&self.time_target[r.clone()], &self.target[r])
        } else {
            (&self.time_target, &self.target)
        }
    }

    /// Align `predict` with the target. Replaces any earlier alignment.
    pub fn fit(&mut self, predict: &[f64], time_predict: &[f64]) -> EvalResult<()> {
        ensure_same_len(predict, time_predict, "predicted samples")?;
        if predict.is_empty() {
            return Err(EvalError::InvalidArg {
                what: "prediction is empty",
            });
        }
        self.aligned = None;

        let (t_min, t_max) = time_predict
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| (lo.min(t), hi.max(t)));

        let (time_target, target) = self.clipped_target();
        let (time, target) = restrict_to_span(time_target, target, t_min, t_max)?;
        let resampled = if predict.len() == 1 {
            vec![predict[0]; time.len()]
        } else {
            resample(time_predict, predict, &time)?
        };

        let aligned = if self.warp {
            let al = dtw(&resampled, &target)?;
            Aligned {
                time: al.path.iter().map(|&(_, j)| time[j]).collect(),
                target: al.path.iter().map(|&(_, j)| target[j]).collect(),
                predict: al.path.iter().map(|&(i, _)| resampled[i]).collect(),
            }
        } else {
            Aligned {
                time,
                target,
                predict: resampled,
            }
        };

        debug!(
            kind = ?self.kind,
            warp = self.warp,
            samples = aligned.time.len(),
            "evaluator fitted"
        );
        self.predict = Some(predict.to_vec());
        self.time_predict = Some(time_predict.to_vec());
        self.aligned = Some(aligned);
        Ok(())
    }

    /// `fit`, then return the aligned `(time, predict)`.
    pub fn fit_transform(
        &mut self,
        predict: &[f64],
        time_predict: &[f64],
    ) -> EvalResult<(Vec<f64>, Vec<f64>)> {
        self.fit(predict, time_predict)?;
        let aligned = self.aligned.as_ref().ok_or(EvalError::NotFitted)?;
        Ok((aligned.time.clone(), aligned.predict.clone()))
    }

    /// Apply each metric to `(aligned predict, aligned target)`.
    pub fn score(&self, metrics: &MetricSet) -> EvalResult<Score> {
        let aligned = self.aligned.as_ref().ok_or(EvalError::NotFitted)?;
        let entries = metrics
            .iter()
            .map(|(name, f)| (name.to_string(), f(&aligned.predict, &aligned.target)))
            .collect();
        Ok(Score::from_entries(entries))
    }
}
