//! Electrical subsystem: coil flux, coil resistance and load.

use crate::common::check_positive;
use crate::error::{ComponentError, ComponentResult};
use crate::flux::FluxModel;
use crate::load::LoadModel;
use crate::traits::Load;
use hv_core::HarvesterState;
use hv_core::units::Resistance;
use serde::{Deserialize, Serialize};

/// Step used for the on-demand central difference of the flux curve [m].
pub const FLUX_GRADIENT_STEP: f64 = 1e-3;

/// Central difference of `f` at `x`; a non-finite result is reported as 0.
pub fn central_gradient(f: impl Fn(f64) -> f64, x: f64, dx: f64) -> f64 {
    let g = (f(x + dx) - f(x - dx)) / (2.0 * dx);
    if g.is_finite() { g } else { 0.0 }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricalModel {
    name: String,
    flux_model: Option<FluxModel>,
    /// Coil resistance [ohm]; `None` is an open circuit.
    coil_resistance: Option<f64>,
    load_model: Option<LoadModel>,
    precompute_gradient: bool,
}

impl ElectricalModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flux_model: None,
            coil_resistance: None,
            load_model: None,
            precompute_gradient: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install the flux curve and its derivative.
    pub fn set_flux_model(&mut self, flux_model: FluxModel) {
        self.flux_model = Some(flux_model);
    }

    pub fn set_coil_resistance(&mut self, r: Resistance) {
        self.coil_resistance = Some(r.value);
    }

    pub fn try_set_coil_resistance(&mut self, r: Resistance) -> ComponentResult<()> {
        check_positive(r.value, "coil resistance")?;
        self.set_coil_resistance(r);
        Ok(())
    }

    pub fn set_load_model(&mut self, load: impl Into<LoadModel>) {
        self.load_model = Some(load.into());
    }

    /// Use the flux model's stored derivative in [`Self::get_flux_gradient`]
    /// instead of a finite difference.
    pub fn set_precompute_gradient(&mut self, enabled: bool) {
        self.precompute_gradient = enabled;
    }

    pub fn flux_model(&self) -> ComponentResult<&FluxModel> {
        self.flux_model
            .as_ref()
            .ok_or(ComponentError::MissingComponent { what: "flux model" })
    }

    pub fn load_model(&self) -> Option<&LoadModel> {
        self.load_model.as_ref()
    }

    /// Coil resistance [ohm]; infinite when unset.
    pub fn coil_resistance(&self) -> f64 {
        self.coil_resistance.unwrap_or(f64::INFINITY)
    }

    /// dphi/dz at the relative magnet position of `state`.
    pub fn get_flux_gradient(&self, state: &HarvesterState) -> ComponentResult<f64> {
        let flux = self.flux_model()?;
        let z = state.relative_position();
        if self.precompute_gradient {
            return Ok(flux.dflux(z));
        }
        Ok(central_gradient(|x| flux.flux(x), z, FLUX_GRADIENT_STEP))
    }

    /// Open-circuit EMF [V] for a magnet at `position` moving at `velocity`.
    pub fn get_emf(&self, position: f64, velocity: f64) -> ComponentResult<f64> {
        let flux = self.flux_model()?;
        Ok(flux.dflux(position) * velocity)
    }

    /// Load current [A] for open-circuit `emf`; exactly 0 without a load.
    pub fn get_current(&self, emf: f64) -> f64 {
        let Some(load) = &self.load_model else {
            return 0.0;
        };
        let r_load = load.resistance();
        let v_load = emf * r_load / (r_load + self.coil_resistance());
        v_load / r_load
    }

    /// Fraction of the open-circuit EMF that appears across the load.
    pub fn load_voltage_ratio(&self) -> ComponentResult<f64> {
        let load = self
            .load_model
            .as_ref()
            .ok_or(ComponentError::MissingComponent { what: "load model" })?;
        let r_load = load.resistance();
        Ok(r_load / (r_load + self.coil_resistance()))
    }

    pub fn is_persistable(&self) -> bool {
        self.flux_model.as_ref().is_none_or(FluxModel::is_persistable)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn no_load_means_no_current(emf in proptest::num::f64::ANY) {
            let model = ElectricalModel::new("coil");
            prop_assert_eq!(model.get_current(emf), 0.0);
        }
    }
}
