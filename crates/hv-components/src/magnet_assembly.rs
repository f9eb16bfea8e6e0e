//! Moving magnet assembly.

use crate::common::check_positive;
use crate::error::ComponentResult;
use hv_core::units::{Force, Mass, constants::G0_MPS2, newton};
use serde::{Deserialize, Serialize};

/// The magnet stack that travels inside the tube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetAssembly {
    /// Assembly mass [kg]
    mass_kg: f64,
}

impl MagnetAssembly {
    pub fn new(mass: Mass) -> ComponentResult<Self> {
        check_positive(mass.value, "magnet assembly mass")?;
        Ok(Self { mass_kg: mass.value })
    }

    /// Mass in kilograms.
    pub fn get_mass(&self) -> f64 {
        self.mass_kg
    }

    /// Weight under standard gravity.
    pub fn get_weight(&self) -> Force {
        newton(self.mass_kg * G0_MPS2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hv_core::kg;

    #[test]
    fn weight_uses_standard_gravity() {
        let m = MagnetAssembly::new(kg(0.05)).unwrap();
        assert_relative_eq!(m.get_mass(), 0.05);
        assert_relative_eq!(m.get_weight().value, 0.05 * 9.80665, epsilon = 1e-12);
    }

    #[test]
    fn massless_assembly_is_rejected() {
        assert!(MagnetAssembly::new(kg(0.0)).is_err());
    }
}
