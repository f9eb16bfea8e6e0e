//! Viscous dampers.

use crate::traits::Damper;
use serde::{Deserialize, Serialize};

/// Linear viscous damper: `F = c * v`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantDamper {
    /// Damping coefficient [N*s/m]
    pub damping_coefficient: f64,
}

impl ConstantDamper {
    pub fn new(damping_coefficient: f64) -> Self {
        Self {
            damping_coefficient,
        }
    }
}

impl Damper for ConstantDamper {
    fn get_force(&self, velocity: f64) -> f64 {
        self.damping_coefficient * velocity
    }
}

/// Serializable damper selection held by the mechanical model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DamperModel {
    Constant(ConstantDamper),
}

impl Damper for DamperModel {
    fn get_force(&self, velocity: f64) -> f64 {
        match self {
            DamperModel::Constant(d) => d.get_force(velocity),
        }
    }
}

impl From<ConstantDamper> for DamperModel {
    fn from(d: ConstantDamper) -> Self {
        DamperModel::Constant(d)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn force_opposes_velocity(c in 0.0f64..10.0, v in -100.0f64..100.0) {
            let f = ConstantDamper::new(c).get_force(v);
            prop_assert!(f * v >= 0.0);
            prop_assert!((f - c * v).abs() <= 1e-12 * (1.0 + (c * v).abs()));
        }
    }
}
