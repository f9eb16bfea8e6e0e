//! Electrical loads.

use crate::common::check_positive;
use crate::error::{ComponentError, ComponentResult};
use crate::traits::Load;
use hv_core::units::Resistance;
use serde::{Deserialize, Serialize};

/// Purely resistive load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SimpleLoadData", into = "SimpleLoadData")]
pub struct SimpleLoad {
    r: f64,
}

/// Serialized form of a [`SimpleLoad`]; validated on the way back in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SimpleLoadData {
    /// Resistance [ohm]
    r: f64,
}

impl SimpleLoad {
    /// Rejects zero, negative or non-finite resistance.
    pub fn new(r: Resistance) -> ComponentResult<Self> {
        check_positive(r.value, "load resistance")?;
        Ok(Self { r: r.value })
    }
}

impl TryFrom<SimpleLoadData> for SimpleLoad {
    type Error = ComponentError;

    fn try_from(data: SimpleLoadData) -> Result<Self, Self::Error> {
        check_positive(data.r, "load resistance")?;
        Ok(Self { r: data.r })
    }
}

impl From<SimpleLoad> for SimpleLoadData {
    fn from(load: SimpleLoad) -> Self {
        Self { r: load.r }
    }
}

impl Load for SimpleLoad {
    fn resistance(&self) -> f64 {
        self.r
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadModel {
    Simple(SimpleLoad),
}

impl Load for LoadModel {
    fn resistance(&self) -> f64 {
        match self {
            LoadModel::Simple(l) => l.resistance(),
        }
    }
}

impl From<SimpleLoad> for LoadModel {
    fn from(l: SimpleLoad) -> Self {
        LoadModel::Simple(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hv_core::ohm;

    #[test]
    fn resistance_round_trip() {
        let load = LoadModel::from(SimpleLoad::new(ohm(30.0)).unwrap());
        assert_eq!(load.resistance(), 30.0);
    }

    #[test]
    fn non_positive_resistance_is_rejected() {
        assert!(SimpleLoad::new(ohm(0.0)).is_err());
        assert!(SimpleLoad::new(ohm(-5.0)).is_err());
        assert!(SimpleLoad::new(ohm(f64::NAN)).is_err());
        assert!(SimpleLoad::new(ohm(1.0)).is_ok());
    }

    #[test]
    fn zero_resistance_cannot_be_loaded() {
        let err = serde_json::from_str::<LoadModel>(r#"{"kind":"simple","r":0.0}"#).unwrap_err();
        assert!(err.to_string().contains("load resistance"), "{err}");
        let load: LoadModel = serde_json::from_str(r#"{"kind":"simple","r":12.5}"#).unwrap();
        assert_eq!(load.resistance(), 12.5);
    }
}
