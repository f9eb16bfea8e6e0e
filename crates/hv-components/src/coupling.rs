//! Electro-mechanical coupling.

use crate::traits::Coupling;
use serde::{Deserialize, Serialize};

/// Constant coupling factor: `F = c * I`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantCoupling {
    /// Coupling constant [N/A]
    pub c: f64,
}

impl ConstantCoupling {
    pub fn new(c: f64) -> Self {
        Self { c }
    }
}

impl Coupling for ConstantCoupling {
    fn get_mechanical_force(&self, current: f64) -> f64 {
        self.c * current
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CouplingModel {
    Constant(ConstantCoupling),
}

impl Coupling for CouplingModel {
    fn get_mechanical_force(&self, current: f64) -> f64 {
        match self {
            CouplingModel::Constant(c) => c.get_mechanical_force(current),
        }
    }
}

impl From<ConstantCoupling> for CouplingModel {
    fn from(c: ConstantCoupling) -> Self {
        CouplingModel::Constant(c)
    }
}
