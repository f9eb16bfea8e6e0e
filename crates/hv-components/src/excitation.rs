//! Base excitation of the harvester housing.

use crate::error::{ComponentError, ComponentResult};
use crate::traits::Excitation;
use hv_core::numeric::{ensure_all_finite, ensure_same_len};
use hv_core::units::constants::G0_MPS2;
use hv_fit::savgol::{fit_window, savgol_smooth};
use hv_fit::{Extrapolation, LinearCurve};
use serde::{Deserialize, Serialize};

const SMOOTHING_ORDER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    fn to_seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1e-3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelUnit {
    MetersPerSecondSquared,
    /// Multiples of standard gravity.
    G,
}

impl AccelUnit {
    fn to_mps2(self) -> f64 {
        match self {
            AccelUnit::MetersPerSecondSquared => 1.0,
            AccelUnit::G => G0_MPS2,
        }
    }
}

/// Measured housing acceleration, interpolated linearly and held constant
/// outside the recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccelerometerInput {
    curve: LinearCurve,
}

impl AccelerometerInput {
    /// `smoothing_window` applies Savitzky-Golay smoothing before
    /// interpolation; the window is shrunk to fit short recordings.
    pub fn new(
        time: &[f64],
        accel: &[f64],
        time_unit: TimeUnit,
        accel_unit: AccelUnit,
        smoothing_window: Option<usize>,
    ) -> ComponentResult<Self> {
        ensure_same_len(time, accel, "accelerometer samples")?;
        ensure_all_finite(accel, "accelerometer acceleration")?;
        let t: Vec<f64> = time.iter().map(|v| v * time_unit.to_seconds()).collect();
        let mut a: Vec<f64> = accel.iter().map(|v| v * accel_unit.to_mps2()).collect();

        if let Some(preferred) = smoothing_window {
            let window = fit_window(preferred, a.len());
            if window > SMOOTHING_ORDER {
                a = savgol_smooth(&a, window, SMOOTHING_ORDER)?;
            }
        }

        let curve = LinearCurve::new(&t, &a, Extrapolation::Clamp)?;
        Ok(Self { curve })
    }

    pub fn time(&self) -> &[f64] {
        self.curve.x()
    }

    pub fn acceleration(&self) -> &[f64] {
        self.curve.y()
    }
}

impl Excitation for AccelerometerInput {
    fn get_acceleration(&self, t: f64) -> f64 {
        self.curve.eval(t)
    }
}

/// Serializable excitation selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputExcitation {
    /// Housing at rest.
    #[default]
    None,
    Constant { accel: f64 },
    Accelerometer(AccelerometerInput),
}

impl InputExcitation {
    pub fn constant(accel: f64) -> ComponentResult<Self> {
        if !accel.is_finite() {
            return Err(ComponentError::NonPhysical {
                what: "constant excitation",
            });
        }
        Ok(InputExcitation::Constant { accel })
    }
}

impl Excitation for InputExcitation {
    fn get_acceleration(&self, t: f64) -> f64 {
        match self {
            InputExcitation::None => 0.0,
            InputExcitation::Constant { accel } => *accel,
            InputExcitation::Accelerometer(input) => input.get_acceleration(t),
        }
    }
}

impl From<AccelerometerInput> for InputExcitation {
    fn from(input: AccelerometerInput) -> Self {
        InputExcitation::Accelerometer(input)
    }
}
