//! Mechanical subsystem: the parts acting on the magnet assembly.

use crate::damper::DamperModel;
use crate::error::{ComponentError, ComponentResult};
use crate::excitation::InputExcitation;
use crate::magnet_assembly::MagnetAssembly;
use crate::magnetic_spring::MagneticSpring;
use crate::mechanical_spring::MechanicalSpring;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanicalModel {
    name: String,
    magnetic_spring: Option<MagneticSpring>,
    mechanical_spring: Option<MechanicalSpring>,
    damper: Option<DamperModel>,
    input: InputExcitation,
    magnet_assembly: Option<MagnetAssembly>,
}

impl MechanicalModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            magnetic_spring: None,
            mechanical_spring: None,
            damper: None,
            input: InputExcitation::None,
            magnet_assembly: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_magnetic_spring(&mut self, spring: MagneticSpring) {
        self.magnetic_spring = Some(spring);
    }

    pub fn set_mechanical_spring(&mut self, spring: MechanicalSpring) {
        self.mechanical_spring = Some(spring);
    }

    pub fn set_damper(&mut self, damper: impl Into<DamperModel>) {
        self.damper = Some(damper.into());
    }

    pub fn set_input(&mut self, input: impl Into<InputExcitation>) {
        self.input = input.into();
    }

    pub fn set_magnet_assembly(&mut self, assembly: MagnetAssembly) {
        self.magnet_assembly = Some(assembly);
    }

    pub fn magnetic_spring(&self) -> ComponentResult<&MagneticSpring> {
        self.magnetic_spring
            .as_ref()
            .ok_or(ComponentError::MissingComponent {
                what: "magnetic spring",
            })
    }

    /// The end stop is optional.
    pub fn mechanical_spring(&self) -> Option<&MechanicalSpring> {
        self.mechanical_spring.as_ref()
    }

    pub fn damper(&self) -> ComponentResult<&DamperModel> {
        self.damper
            .as_ref()
            .ok_or(ComponentError::MissingComponent { what: "damper" })
    }

    pub fn input(&self) -> &InputExcitation {
        &self.input
    }

    pub fn magnet_assembly(&self) -> ComponentResult<&MagnetAssembly> {
        self.magnet_assembly
            .as_ref()
            .ok_or(ComponentError::MissingComponent {
                what: "magnet assembly",
            })
    }

    /// Check every required part is installed.
    pub fn validate(&self) -> ComponentResult<()> {
        self.magnetic_spring()?;
        self.damper()?;
        self.magnet_assembly()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damper::ConstantDamper;
    use hv_core::kg;

    #[test]
    fn validate_names_first_missing_part() {
        let mut model = MechanicalModel::new("mech");
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("magnetic spring"));

        let z: Vec<f64> = (1..20).map(|i| i as f64 * 1e-3).collect();
        let f: Vec<f64> = z.iter().map(|z| 1e-4 / (z * z)).collect();
        model.set_magnetic_spring(MagneticSpring::new(&z, &f, "interp").unwrap());
        model.set_damper(ConstantDamper::new(0.1));
        let err = model.validate().unwrap_err();
        assert!(err.to_string().contains("magnet assembly"));

        model.set_magnet_assembly(MagnetAssembly::new(kg(0.05)).unwrap());
        model.validate().unwrap();
        assert!(model.mechanical_spring().is_none());
    }
}
