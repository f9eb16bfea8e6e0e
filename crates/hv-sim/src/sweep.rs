//! Parallel parameter sweeps.
//!
//! Each combination builds and solves its own [`UnifiedModel`], so the work
//! items share nothing and are fanned out with rayon. A failing combination
//! is recorded in its [`SweepOutcome`] and the rest of the sweep carries on.

use crate::error::SimResult;
use crate::options::SolveOptions;
use crate::unified::UnifiedModel;
use hv_core::HarvesterState;
use hv_eval::Score;
use rayon::prelude::*;
use tracing::{debug, info};

/// One combination of named parameter values.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSet {
    values: Vec<(String, f64)>,
}

impl ParamSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

/// Cartesian product of named value lists.
#[derive(Clone, Debug, Default)]
pub struct ParameterGrid {
    axes: Vec<(String, Vec<f64>)>,
}

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        self.axes.push((name.into(), values.into()));
        self
    }

    /// Number of combinations (zero if any axis is empty).
    pub fn len(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(|(_, v)| v.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All combinations; the first axis varies slowest.
    pub fn combinations(&self) -> Vec<ParamSet> {
        let n = self.len();
        (0..n)
            .map(|mut k| {
                let mut values = vec![(String::new(), 0.0); self.axes.len()];
                for (slot, (name, axis)) in values.iter_mut().zip(&self.axes).rev() {
                    *slot = (name.clone(), axis[k % axis.len()]);
                    k /= axis.len();
                }
                ParamSet { values }
            })
            .collect()
    }
}

/// Result of one combination. Errors are kept as their display text.
#[derive(Clone, Debug)]
pub struct SweepOutcome {
    pub params: ParamSet,
    pub result: Result<Score, String>,
}

/// Build, solve and score every combination of `grid` in parallel.
///
/// Outcomes are returned in [`ParameterGrid::combinations`] order.
pub fn run_sweep<B, S>(
    grid: &ParameterGrid,
    y0: HarvesterState,
    options: &SolveOptions,
    build: B,
    score: S,
) -> Vec<SweepOutcome>
where
    B: Fn(&ParamSet) -> SimResult<UnifiedModel> + Sync,
    S: Fn(&UnifiedModel) -> SimResult<Score> + Sync,
{
    let combos = grid.combinations();
    info!(combinations = combos.len(), "starting parameter sweep");

    let outcomes: Vec<SweepOutcome> = combos
        .into_par_iter()
        .map(|params| {
            let result = build(&params)
                .and_then(|mut model| {
                    model.solve_with(y0, options)?;
                    score(&model)
                })
                .map_err(|e| e.to_string());
            if let Err(message) = &result {
                debug!(?params, %message, "sweep combination failed");
            }
            SweepOutcome { params, result }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(total = outcomes.len(), failed, "parameter sweep finished");
    outcomes
}
