//! ADC voltage preprocessing for electrical ground truth.

use crate::error::ComponentResult;
use hv_core::numeric::{ensure_same_len, mean};
use hv_fit::savgol::{fit_window, savgol_smooth};
use serde::{Deserialize, Serialize};

const SMOOTHING_ORDER: usize = 3;

/// Converts raw ADC readings into a zero-mean load voltage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdcProcessor {
    /// Multiplier undoing the measurement voltage divider
    pub voltage_division_ratio: f64,
    pub smooth: bool,
    /// Savitzky-Golay window, shrunk to fit short recordings
    pub smoothing_window: usize,
}

impl Default for AdcProcessor {
    fn default() -> Self {
        Self {
            voltage_division_ratio: 1.0,
            smooth: true,
            smoothing_window: 9,
        }
    }
}

impl AdcProcessor {
    pub fn new(voltage_division_ratio: f64, smooth: bool) -> Self {
        Self {
            voltage_division_ratio,
            smooth,
            ..Self::default()
        }
    }

    /// Returns `(voltage [V], time [s])` for readings timestamped in ms.
    pub fn fit_transform(&self, time_ms: &[f64], voltage: &[f64]) -> ComponentResult<(Vec<f64>, Vec<f64>)> {
        ensure_same_len(time_ms, voltage, "adc samples")?;
        let mut v: Vec<f64> = voltage
            .iter()
            .map(|v| v * self.voltage_division_ratio)
            .collect();

        if self.smooth {
            let window = fit_window(self.smoothing_window, v.len());
            if window > SMOOTHING_ORDER {
                v = savgol_smooth(&v, window, SMOOTHING_ORDER)?;
            }
        }

        let offset = mean(&v);
        v.iter_mut().for_each(|x| *x -= offset);
        let time = time_ms.iter().map(|t| t / 1000.0).collect();
        Ok((v, time))
    }
}
