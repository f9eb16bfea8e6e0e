//! Unified electromechanical harvester simulation.
//!
//! Provides:
//! - Coupled mechanical/electrical governing equations
//! - Dormand-Prince 5(4) adaptive, RK4 and forward Euler integration with
//!   step limits, deadlines and cancellation
//! - Post-processing pipelines over solved trajectories
//! - A whitelisted expression language for derived signals
//! - Scoring against measured mechanical and electrical traces
//! - Parallel parameter sweeps and YAML configuration

pub mod config;
pub mod error;
pub mod expr;
pub mod governing;
pub mod integrator;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod solution;
pub mod solve;
pub mod sweep;
pub mod unified;

pub use config::HarvesterConfig;
pub use error::{SimError, SimResult};
pub use expr::{Expr, ExprError};
pub use governing::{GoverningEquations, Subsystems, unified_ode};
pub use integrator::{DormandPrince45, ForwardEuler, Integrator, Rk4};
pub use model::{OdeSystem, State};
pub use options::{CancelToken, Method, SolveOptions};
pub use pipeline::{Pipeline, PipelineSet};
pub use solution::{RawSolution, ResultTable};
pub use solve::{Trajectory, integrate};
pub use sweep::{ParamSet, ParameterGrid, SweepOutcome, run_sweep};
pub use unified::{ElectricalScoreOptions, UnifiedModel};
