//! hv-fit: curve fitting for measured force and flux curves.
//!
//! Provides:
//! - Levenberg-Marquardt nonlinear least squares over closed-form model families
//! - Linear interpolation curves and natural cubic splines
//! - Savitzky-Golay smoothing
//! - A name -> model-family registry with explicit "model not found" errors
//!
//! Every fitted curve is a plain, cloneable, serializable value that maps a
//! scalar position to a scalar quantity.

pub mod curve;
pub mod error;
pub mod family;
pub mod interp;
pub mod jacobian;
pub mod levenberg;
pub mod savgol;
pub mod spline;

pub use curve::{CurveKind, FittedCurve, fit_curve};
pub use error::{FitError, FitResult};
pub use family::ParametricFamily;
pub use interp::{Extrapolation, LinearCurve};
pub use levenberg::{LmConfig, LmReport, levenberg_marquardt};
pub use spline::CubicSpline;
