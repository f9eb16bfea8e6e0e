//! The unified harvester model: sub-models, solve, query and score.

use crate::error::{SimError, SimResult};
use crate::expr::{Columns, Expr, Var};
use crate::governing::{GoverningEquations, Subsystems};
use crate::model::State;
use crate::options::{Method, SolveOptions};
use crate::pipeline::{Pipeline, PipelineSet};
use crate::solution::{RawSolution, ResultTable};
use crate::solve::integrate;
use hv_components::{CouplingModel, ElectricalModel, MechanicalModel};
use hv_core::HarvesterState;
use hv_eval::evaluator::DEFAULT_CLIP_THRESHOLD;
use hv_eval::{Evaluator, MetricSet, Score};
use tracing::{debug, info};

/// Options for [`UnifiedModel::score_electrical_model`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElectricalScoreOptions {
    /// Align with dynamic time warping.
    pub warp: bool,
    /// Spectral power below which the target is considered dead signal.
    pub clip_threshold: f64,
    /// Score the load-terminal voltage instead of the open-circuit EMF.
    pub closed_circuit: bool,
}

impl Default for ElectricalScoreOptions {
    fn default() -> Self {
        Self {
            warp: false,
            clip_threshold: DEFAULT_CLIP_THRESHOLD,
            closed_circuit: false,
        }
    }
}

/// Mechanical, electrical and coupling models integrated as one system.
///
/// The model is configured with the `set_*` methods, solved with
/// [`solve`](Self::solve) and then queried with
/// [`get_result`](Self::get_result) or scored against measurements.
#[derive(Clone, Debug, Default)]
pub struct UnifiedModel {
    mechanical_model: Option<MechanicalModel>,
    electrical_model: Option<ElectricalModel>,
    coupling_model: Option<CouplingModel>,
    governing_equations: Option<GoverningEquations>,
    post_processing_pipeline: PipelineSet,
    time: Option<Vec<f64>>,
    raw_solution: Option<RawSolution>,
}

/// Solved columns seen by the expression evaluator.
struct SolvedColumns<'a> {
    time: &'a [f64],
    solution: &'a RawSolution,
}

impl Columns for SolvedColumns<'_> {
    fn len(&self) -> usize {
        self.time.len()
    }

    fn column(&self, var: Var) -> &[f64] {
        match var {
            Var::Time => self.time,
            Var::State(idx) => self.solution.row(idx),
        }
    }
}

impl UnifiedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mechanical_model(&mut self, model: MechanicalModel) -> &mut Self {
        self.mechanical_model = Some(model);
        self
    }

    pub fn set_electrical_model(&mut self, model: ElectricalModel) -> &mut Self {
        self.electrical_model = Some(model);
        self
    }

    pub fn set_coupling_model(&mut self, model: impl Into<CouplingModel>) -> &mut Self {
        self.coupling_model = Some(model.into());
        self
    }

    pub fn set_governing_equations(&mut self, equations: GoverningEquations) -> &mut Self {
        self.governing_equations = Some(equations);
        self
    }

    /// Register a post-processing pipeline. Pipelines run in the order they
    /// were first registered; re-using a name replaces that pipeline.
    pub fn set_post_processing_pipeline(&mut self, name: impl Into<String>, pipeline: Pipeline) -> &mut Self {
        self.post_processing_pipeline.set(name, pipeline);
        self
    }

    pub fn set_pipelines(&mut self, pipelines: PipelineSet) -> &mut Self {
        self.post_processing_pipeline = pipelines;
        self
    }

    pub fn mechanical_model(&self) -> Option<&MechanicalModel> {
        self.mechanical_model.as_ref()
    }

    pub fn electrical_model(&self) -> Option<&ElectricalModel> {
        self.electrical_model.as_ref()
    }

    pub fn coupling_model(&self) -> Option<&CouplingModel> {
        self.coupling_model.as_ref()
    }

    pub fn governing_equations(&self) -> Option<&GoverningEquations> {
        self.governing_equations.as_ref()
    }

    pub fn post_processing_pipeline(&self) -> &PipelineSet {
        &self.post_processing_pipeline
    }

    pub fn time(&self) -> Option<&[f64]> {
        self.time.as_deref()
    }

    pub fn raw_solution(&self) -> Option<&RawSolution> {
        self.raw_solution.as_ref()
    }

    pub fn is_solved(&self) -> bool {
        self.time.is_some() && self.raw_solution.is_some()
    }

    /// Install a previously computed solution, e.g. when loading from disk.
    pub fn restore_solution(&mut self, time: Vec<f64>, raw_solution: RawSolution) -> SimResult<()> {
        if time.len() != raw_solution.n_samples() {
            return Err(SimError::InvalidArg {
                what: "time and raw solution differ in length",
            });
        }
        self.time = Some(time);
        self.raw_solution = Some(raw_solution);
        Ok(())
    }

    /// Whether every field can be written to disk.
    pub fn is_persistable(&self) -> bool {
        self.governing_equations
            .as_ref()
            .is_none_or(GoverningEquations::is_persistable)
            && self
                .electrical_model
                .as_ref()
                .is_none_or(ElectricalModel::is_persistable)
            && self.post_processing_pipeline.is_persistable()
    }

    fn subsystems(&self) -> SimResult<(Subsystems<'_>, &GoverningEquations)> {
        let mechanical = self
            .mechanical_model
            .as_ref()
            .ok_or(SimError::NotConfigured {
                what: "mechanical model",
            })?;
        let electrical = self
            .electrical_model
            .as_ref()
            .ok_or(SimError::NotConfigured {
                what: "electrical model",
            })?;
        let coupling = self.coupling_model.as_ref().ok_or(SimError::NotConfigured {
            what: "coupling model",
        })?;
        let equations = self
            .governing_equations
            .as_ref()
            .ok_or(SimError::NotConfigured {
                what: "governing equations",
            })?;
        mechanical.validate()?;
        electrical.flux_model()?;
        Ok((
            Subsystems {
                mechanical,
                electrical,
                coupling,
            },
            equations,
        ))
    }

    /// Integrate over `[t_start, t_end]` from `y0` (exactly five components).
    pub fn solve(
        &mut self,
        t_start: f64,
        t_end: f64,
        y0: &[f64],
        t_max_step: f64,
        method: Method,
    ) -> SimResult<()> {
        let y0 = HarvesterState::from_slice(y0)?;
        self.solve_with(y0, &SolveOptions::new(t_start, t_end, t_max_step, method))
    }

    /// Integrate with full control over the solver, then run the pipelines.
    /// A failed solve leaves any previous solution untouched.
    pub fn solve_with(&mut self, y0: HarvesterState, opts: &SolveOptions) -> SimResult<()> {
        let (time, states) = {
            let (subsystems, equations) = self.subsystems()?;
            info!(
                t_start = opts.t_start,
                t_end = opts.t_end,
                method = %opts.method,
                max_step = opts.max_step,
                "solving unified model"
            );
            let rhs = |t: f64, y: &State| -> SimResult<State> {
                let dy = equations.eval(t, &HarvesterState::from(*y), &subsystems)?;
                Ok(dy.to_array())
            };
            let trajectory = integrate(&rhs, &y0.to_array(), opts)?;
            let states: Vec<HarvesterState> = trajectory
                .y
                .iter()
                .map(|y| self.post_processing_pipeline.apply(HarvesterState::from(*y)))
                .collect();
            (trajectory.t, states)
        };

        debug!(
            pipelines = self.post_processing_pipeline.len(),
            "applied post-processing pipelines"
        );
        info!(samples = time.len(), "solve finished");
        self.raw_solution = Some(RawSolution::from_states(&states));
        self.time = Some(time);
        Ok(())
    }

    fn solved(&self) -> SimResult<SolvedColumns<'_>> {
        match (&self.time, &self.raw_solution) {
            (Some(time), Some(solution)) => Ok(SolvedColumns { time, solution }),
            _ => Err(SimError::NotSolved),
        }
    }

    /// Evaluate `(name, expression)` pairs over the solution.
    ///
    /// Expressions may use `x1`..`x5`, `t` and the helper functions of
    /// [`crate::expr`]. Every expression is parsed before any is evaluated.
    pub fn get_result(&self, expressions: &[(&str, &str)]) -> SimResult<ResultTable> {
        let cols = self.solved()?;
        let parsed = expressions
            .iter()
            .map(|(name, src)| Ok((name.to_string(), Expr::parse(src)?)))
            .collect::<SimResult<Vec<_>>>()?;
        let columns = parsed
            .into_iter()
            .map(|(name, expr)| (name, expr.eval(&cols)))
            .collect();
        Ok(ResultTable::from_columns(columns))
    }

    fn predict(&self, prediction_expr: &str) -> SimResult<(Vec<f64>, Vec<f64>)> {
        let cols = self.solved()?;
        let predict = Expr::parse(prediction_expr)?.eval(&cols);
        Ok((predict, cols.time.to_vec()))
    }

    /// Score the mechanical response (`prediction_expr`, e.g. `"x3 - x1"`)
    /// against a measured position trace.
    pub fn score_mechanical_model(
        &self,
        time_target: &[f64],
        y_target: &[f64],
        metrics: &MetricSet,
        prediction_expr: &str,
        warp: bool,
    ) -> SimResult<Score> {
        self.score_mechanical_model_with_evaluator(time_target, y_target, metrics, prediction_expr, warp)
            .map(|(score, _)| score)
    }

    pub fn score_mechanical_model_with_evaluator(
        &self,
        time_target: &[f64],
        y_target: &[f64],
        metrics: &MetricSet,
        prediction_expr: &str,
        warp: bool,
    ) -> SimResult<(Score, Evaluator)> {
        let (predict, time) = self.predict(prediction_expr)?;
        let mut evaluator = Evaluator::mechanical(y_target, time_target, warp)?;
        evaluator.fit(&predict, &time)?;
        let score = evaluator.score(metrics)?;
        Ok((score, evaluator))
    }

    /// Score the EMF (`prediction_expr`, e.g. `"g(t, x5)"`) against a
    /// measured voltage trace.
    pub fn score_electrical_model(
        &self,
        time_target: &[f64],
        emf_target: &[f64],
        metrics: &MetricSet,
        prediction_expr: &str,
        options: ElectricalScoreOptions,
    ) -> SimResult<Score> {
        self.score_electrical_model_with_evaluator(time_target, emf_target, metrics, prediction_expr, options)
            .map(|(score, _)| score)
    }

    pub fn score_electrical_model_with_evaluator(
        &self,
        time_target: &[f64],
        emf_target: &[f64],
        metrics: &MetricSet,
        prediction_expr: &str,
        options: ElectricalScoreOptions,
    ) -> SimResult<(Score, Evaluator)> {
        let (mut predict, time) = self.predict(prediction_expr)?;
        if options.closed_circuit {
            let electrical = self
                .electrical_model
                .as_ref()
                .ok_or(SimError::NotConfigured {
                    what: "electrical model",
                })?;
            let ratio = electrical.load_voltage_ratio()?;
            predict.iter_mut().for_each(|v| *v *= ratio);
        }
        let mut evaluator = Evaluator::electrical(emf_target, time_target, options.warp, options.clip_threshold)?;
        evaluator.fit(&predict, &time)?;
        let score = evaluator.score(metrics)?;
        Ok((score, evaluator))
    }
}
