//! Governing equations of the harvester.

use crate::error::SimResult;
use hv_components::{
    Coupling, CouplingModel, Damper, ElectricalModel, Excitation, MechanicalModel,
};
use hv_core::HarvesterState;
use hv_core::units::constants::G0_MPS2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The sub-models the equations read from.
#[derive(Clone, Copy, Debug)]
pub struct Subsystems<'a> {
    pub mechanical: &'a MechanicalModel,
    pub electrical: &'a ElectricalModel,
    pub coupling: &'a CouplingModel,
}

pub type EquationFn =
    Arc<dyn Fn(f64, &HarvesterState, &Subsystems<'_>) -> SimResult<HarvesterState> + Send + Sync>;

/// Selectable right-hand side for the unified model.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoverningEquations {
    /// [`unified_ode`].
    Unified,
    /// User-supplied equations; cannot be persisted.
    #[serde(skip)]
    Custom(EquationFn),
}

impl GoverningEquations {
    pub fn custom(
        f: impl Fn(f64, &HarvesterState, &Subsystems<'_>) -> SimResult<HarvesterState>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        GoverningEquations::Custom(Arc::new(f))
    }

    pub fn eval(&self, t: f64, y: &HarvesterState, models: &Subsystems<'_>) -> SimResult<HarvesterState> {
        match self {
            GoverningEquations::Unified => unified_ode(t, y, models),
            GoverningEquations::Custom(f) => f(t, y, models),
        }
    }

    pub fn is_persistable(&self) -> bool {
        matches!(self, GoverningEquations::Unified)
    }
}

impl fmt::Debug for GoverningEquations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoverningEquations::Unified => f.write_str("Unified"),
            GoverningEquations::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Coupled magnet/coil equations.
///
/// With `z = x3 - x1` and `v = x4 - x2`:
///
/// ```text
/// x1' = x2
/// x2' = a_in(t)
/// x3' = x4
/// x4' = (F_mag(z) - F_stop(z, v) - m g - F_damp(v) - F_coup(I)) / m
/// x5' = emf = dphi/dz(z) * v,   I = current(emf)
/// ```
pub fn unified_ode(t: f64, y: &HarvesterState, models: &Subsystems<'_>) -> SimResult<HarvesterState> {
    let mech = models.mechanical;
    let z = y.relative_position();
    let v = y.relative_velocity();

    let mass = mech.magnet_assembly()?.get_mass();
    let f_mag = mech.magnetic_spring()?.get_force(z);
    let f_stop = mech.mechanical_spring().map_or(0.0, |s| s.get_force(z, v));
    let f_damp = mech.damper()?.get_force(v);

    let emf = models.electrical.get_emf(z, v)?;
    let current = models.electrical.get_current(emf);
    let f_coup = models.coupling.get_mechanical_force(current);

    let accel = (f_mag - f_stop - mass * G0_MPS2 - f_damp - f_coup) / mass;

    Ok(HarvesterState::new(
        y.tube_vel,
        mech.input().get_acceleration(t),
        y.mag_vel,
        accel,
        emf,
    ))
}
