//! YAML description of a complete harvester.
//!
//! ```yaml
//! magnet_mass_kg: 0.0043
//! magnetic_spring:
//!   z: [0.01, 0.02, 0.03]
//!   force: [2.0, 0.5, 0.2]
//!   model: coulombs_modified
//! damper: { kind: constant, damping_coefficient: 0.03 }
//! excitation: { kind: none }
//! flux:
//!   z: [0.0, 0.01, 0.02]
//!   phi: [0.0, 0.001, 0.0]
//!   model: unispline
//! coil_resistance_ohm: 12.5
//! load_resistance_ohm: 30.0
//! coupling: 0.1
//! pipelines:
//!   - { name: floor, component: x3, min: 0.0 }
//! initial_state: [0.0, 0.0, 0.04, 0.0, 0.0]
//! solve: { t_end: 2.0, max_step: 0.001 }
//! ```

use crate::error::{SimError, SimResult};
use crate::governing::GoverningEquations;
use crate::options::SolveOptions;
use crate::pipeline::Pipeline;
use crate::unified::UnifiedModel;
use hv_components::{
    AccelUnit, AccelerometerInput, ConstantCoupling, DamperModel, ElectricalModel, FluxModel,
    FluxModelKind, InputExcitation, MagnetAssembly, MagneticSpring, MechanicalModel,
    MechanicalSpring, PushDirection, SimpleLoad, TimeUnit,
};
use hv_core::{HarvesterState, StateIndex, kg, m, ohm};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarvesterConfig {
    pub magnet_mass_kg: f64,
    pub magnetic_spring: MagneticSpringDef,
    pub damper: DamperModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanical_spring: Option<MechanicalSpringDef>,
    #[serde(default)]
    pub excitation: ExcitationDef,
    pub flux: FluxDef,
    /// Omitted means the coil resistance is unbounded: the circuit is open
    /// and no current flows, whatever the load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coil_resistance_ohm: Option<f64>,
    /// Omitted means open circuit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_resistance_ohm: Option<f64>,
    #[serde(default)]
    pub coupling: f64,
    #[serde(default)]
    pub pipelines: Vec<PipelineDef>,
    pub initial_state: [f64; 5],
    #[serde(default)]
    pub solve: SolveOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MagneticSpringDef {
    pub z: Vec<f64>,
    pub force: Vec<f64>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MechanicalSpringDef {
    pub push_direction: PushDirection,
    pub position_m: f64,
    pub strength: f64,
    #[serde(default = "default_pure")]
    pub pure: bool,
    #[serde(default)]
    pub damping: f64,
}

fn default_pure() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExcitationDef {
    #[default]
    None,
    Constant {
        accel: f64,
    },
    Accelerometer {
        time: Vec<f64>,
        accel: Vec<f64>,
        time_unit: TimeUnit,
        accel_unit: AccelUnit,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        smoothing_window: Option<usize>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluxDef {
    pub z: Vec<f64>,
    pub phi: Vec<f64>,
    pub model: String,
    /// When set together with `magnet_length_mm`, the curve is centred on
    /// its flux peak and shifted as for a flux-database curve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coil_center_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_length_mm: Option<f64>,
    #[serde(default)]
    pub precompute_gradient: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineDef {
    pub name: String,
    /// State symbol, `x1`..`x5`.
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl HarvesterConfig {
    pub fn from_yaml_str(content: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), "loaded harvester config");
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn initial_state(&self) -> HarvesterState {
        HarvesterState::from(self.initial_state)
    }

    fn mechanical(&self) -> SimResult<MechanicalModel> {
        let mut mech = MechanicalModel::new("mechanical");
        mech.set_magnet_assembly(MagnetAssembly::new(kg(self.magnet_mass_kg))?);
        let spring = &self.magnetic_spring;
        mech.set_magnetic_spring(MagneticSpring::new(&spring.z, &spring.force, &spring.model)?);
        mech.set_damper(self.damper.clone());
        if let Some(stop) = &self.mechanical_spring {
            mech.set_mechanical_spring(MechanicalSpring::new(
                stop.push_direction,
                m(stop.position_m),
                stop.strength,
                stop.pure,
                stop.damping,
            )?);
        }
        let input = match &self.excitation {
            ExcitationDef::None => InputExcitation::None,
            ExcitationDef::Constant { accel } => InputExcitation::constant(*accel)?,
            ExcitationDef::Accelerometer {
                time,
                accel,
                time_unit,
                accel_unit,
                smoothing_window,
            } => AccelerometerInput::new(time, accel, *time_unit, *accel_unit, *smoothing_window)?.into(),
        };
        mech.set_input(input);
        Ok(mech)
    }

    fn electrical(&self) -> SimResult<ElectricalModel> {
        let flux = &self.flux;
        let kind = FluxModelKind::lookup(&flux.model)?;
        let model = match (flux.coil_center_m, flux.magnet_length_mm) {
            (Some(center), Some(mm)) => FluxModel::from_database_curve(kind, &flux.z, &flux.phi, center, mm)?,
            (None, None) => FluxModel::from_samples(kind, &flux.z, &flux.phi)?,
            _ => {
                return Err(SimError::Config {
                    message: "flux: coil_center_m and magnet_length_mm must be given together".into(),
                });
            }
        };

        let mut elec = ElectricalModel::new("electrical");
        elec.set_flux_model(model);
        elec.set_precompute_gradient(flux.precompute_gradient);
        if let Some(r) = self.coil_resistance_ohm {
            elec.try_set_coil_resistance(ohm(r))?;
        }
        if let Some(r) = self.load_resistance_ohm {
            elec.set_load_model(SimpleLoad::new(ohm(r))?);
        }
        Ok(elec)
    }

    /// Assemble a ready-to-solve model.
    pub fn build(&self) -> SimResult<UnifiedModel> {
        let mut model = UnifiedModel::new();
        model
            .set_mechanical_model(self.mechanical()?)
            .set_electrical_model(self.electrical()?)
            .set_coupling_model(ConstantCoupling::new(self.coupling))
            .set_governing_equations(GoverningEquations::Unified);
        for def in &self.pipelines {
            let component = StateIndex::from_symbol(&def.component)?;
            model.set_post_processing_pipeline(def.name.clone(), Pipeline::clip(component, def.min, def.max));
        }
        Ok(model)
    }

    /// [`build`](Self::build), then solve with the configured options.
    pub fn run(&self) -> SimResult<UnifiedModel> {
        let mut model = self.build()?;
        model.solve_with(self.initial_state(), &self.solve)?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Method;

    const YAML: &str = r#"
magnet_mass_kg: 0.1
magnetic_spring:
  z: [0.0, 0.05, 0.1, 0.15, 0.2]
  force: [0.981, 0.981, 0.981, 0.981, 0.981]
  model: interp
damper: { kind: constant, damping_coefficient: 0.0 }
flux:
  z: [0.0, 0.05, 0.1, 0.15, 0.2]
  phi: [0.0, 0.01, 0.02, 0.01, 0.0]
  model: interp
coil_resistance_ohm: 10.0
load_resistance_ohm: 30.0
coupling: 0.0
pipelines:
  - { name: floor, component: x3, min: 0.0 }
initial_state: [0.0, 0.0, 0.05, 0.0, 0.0]
solve: { t_end: 0.1, max_step: 0.01, method: rk4 }
"#;

    #[test]
    fn parses_and_builds() {
        let cfg = HarvesterConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(cfg.solve.method, Method::Rk4);
        assert_eq!(cfg.excitation, ExcitationDef::None);
        assert_eq!(cfg.initial_state().mag_pos, 0.05);

        let model = cfg.build().unwrap();
        assert_eq!(model.post_processing_pipeline().len(), 1);
        let elec = model.electrical_model().unwrap();
        assert_eq!(elec.coil_resistance(), 10.0);
        assert!(elec.load_model().is_some());
    }

    #[test]
    fn runs_to_a_solution() {
        let model = HarvesterConfig::from_yaml_str(YAML).unwrap().run().unwrap();
        assert!(model.is_solved());
        assert_eq!(*model.time().unwrap().last().unwrap(), 0.1);
    }

    #[test]
    fn unknown_model_is_a_config_error() {
        let yaml = YAML.replace("model: interp\ndamper", "model: nope\ndamper");
        let err = HarvesterConfig::from_yaml_str(&yaml).unwrap().build().unwrap_err();
        assert!(err.to_string().contains("nope"), "{err}");
    }

    #[test]
    fn bad_pipeline_component_rejected() {
        let yaml = YAML.replace("component: x3", "component: x9");
        let err = HarvesterConfig::from_yaml_str(&yaml).unwrap().build().unwrap_err();
        assert!(err.to_string().contains("x9"), "{err}");
    }

    #[test]
    fn zero_load_resistance_rejected() {
        let yaml = YAML.replace("load_resistance_ohm: 30.0", "load_resistance_ohm: 0.0");
        let err = HarvesterConfig::from_yaml_str(&yaml).unwrap().build().unwrap_err();
        assert!(err.to_string().contains("load resistance"), "{err}");
    }

    #[test]
    fn omitted_coil_resistance_opens_the_circuit() {
        let yaml = YAML.replace("coil_resistance_ohm: 10.0\n", "");
        let model = HarvesterConfig::from_yaml_str(&yaml).unwrap().build().unwrap();
        let electrical = model.electrical_model().unwrap();
        assert_eq!(electrical.coil_resistance(), f64::INFINITY);
        assert_eq!(electrical.get_current(5.0), 0.0);
    }

    #[test]
    fn missing_key_fails_fast() {
        let yaml = YAML.replace("magnet_mass_kg: 0.1\n", "");
        let err = HarvesterConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("magnet_mass_kg"), "{err}");
    }

    #[test]
    fn yaml_round_trip() {
        let cfg = HarvesterConfig::from_yaml_str(YAML).unwrap();
        let back = HarvesterConfig::from_yaml_str(&cfg.to_yaml_string().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
