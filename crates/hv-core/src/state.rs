//! Named harvester state vector.
//!
//! Layout is fixed across the whole pipeline:
//!
//! | index | symbol | meaning |
//! |-------|--------|---------|
//! | 0 | `x1` | tube (housing) displacement [m] |
//! | 1 | `x2` | tube velocity [m/s] |
//! | 2 | `x3` | magnet assembly displacement [m] |
//! | 3 | `x4` | magnet assembly velocity [m/s] |
//! | 4 | `x5` | coil flux linkage [Wb] |

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Number of state components.
pub const STATE_DIM: usize = 5;

/// Position of a component in the flat state vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateIndex {
    TubePos,
    TubeVel,
    MagPos,
    MagVel,
    FluxLinkage,
}

impl StateIndex {
    pub const ALL: [StateIndex; STATE_DIM] = [
        StateIndex::TubePos,
        StateIndex::TubeVel,
        StateIndex::MagPos,
        StateIndex::MagVel,
        StateIndex::FluxLinkage,
    ];

    pub fn index(self) -> usize {
        match self {
            StateIndex::TubePos => 0,
            StateIndex::TubeVel => 1,
            StateIndex::MagPos => 2,
            StateIndex::MagVel => 3,
            StateIndex::FluxLinkage => 4,
        }
    }

    /// Expression symbol (`x1`..`x5`).
    pub fn symbol(self) -> &'static str {
        match self {
            StateIndex::TubePos => "x1",
            StateIndex::TubeVel => "x2",
            StateIndex::MagPos => "x3",
            StateIndex::MagVel => "x4",
            StateIndex::FluxLinkage => "x5",
        }
    }

    pub fn from_symbol(symbol: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|idx| idx.symbol() == symbol)
            .ok_or_else(|| CoreError::UnknownComponent {
                name: symbol.to_string(),
            })
    }
}

/// The 5-element state integrated by the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvesterState {
    pub tube_pos: f64,
    pub tube_vel: f64,
    pub mag_pos: f64,
    pub mag_vel: f64,
    pub flux_linkage: f64,
}

impl HarvesterState {
    pub fn new(tube_pos: f64, tube_vel: f64, mag_pos: f64, mag_vel: f64, flux_linkage: f64) -> Self {
        Self {
            tube_pos,
            tube_vel,
            mag_pos,
            mag_vel,
            flux_linkage,
        }
    }

    /// Build from a slice, failing unless it has exactly [`STATE_DIM`] elements.
    pub fn from_slice(values: &[f64]) -> CoreResult<Self> {
        let arr: [f64; STATE_DIM] = values.try_into().map_err(|_| CoreError::LengthMismatch {
            what: "state vector",
            expected: STATE_DIM,
            got: values.len(),
        })?;
        Ok(Self::from(arr))
    }

    pub fn to_array(self) -> [f64; STATE_DIM] {
        [
            self.tube_pos,
            self.tube_vel,
            self.mag_pos,
            self.mag_vel,
            self.flux_linkage,
        ]
    }

    pub fn get(&self, idx: StateIndex) -> f64 {
        self.to_array()[idx.index()]
    }

    pub fn set(&mut self, idx: StateIndex, value: f64) {
        match idx {
            StateIndex::TubePos => self.tube_pos = value,
            StateIndex::TubeVel => self.tube_vel = value,
            StateIndex::MagPos => self.mag_pos = value,
            StateIndex::MagVel => self.mag_vel = value,
            StateIndex::FluxLinkage => self.flux_linkage = value,
        }
    }

    /// Magnet position relative to the tube (x3 - x1).
    pub fn relative_position(&self) -> f64 {
        self.mag_pos - self.tube_pos
    }

    /// Magnet velocity relative to the tube (x4 - x2).
    pub fn relative_velocity(&self) -> f64 {
        self.mag_vel - self.tube_vel
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl From<[f64; STATE_DIM]> for HarvesterState {
    fn from(arr: [f64; STATE_DIM]) -> Self {
        let [tube_pos, tube_vel, mag_pos, mag_vel, flux_linkage] = arr;
        Self {
            tube_pos,
            tube_vel,
            mag_pos,
            mag_vel,
            flux_linkage,
        }
    }
}

impl From<HarvesterState> for [f64; STATE_DIM] {
    fn from(state: HarvesterState) -> Self {
        state.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_map_to_positions() {
        for (i, idx) in StateIndex::ALL.iter().enumerate() {
            assert_eq!(idx.index(), i);
            assert_eq!(idx.symbol(), format!("x{}", i + 1));
            assert_eq!(StateIndex::from_symbol(idx.symbol()).unwrap(), *idx);
        }
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let err = StateIndex::from_symbol("x6").unwrap_err();
        assert!(err.to_string().contains("x6"));
    }

    #[test]
    fn wrong_length_slice_fails() {
        let err = HarvesterState::from_slice(&[0.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::LengthMismatch {
                expected: 5,
                got: 4,
                ..
            }
        ));
    }

    #[test]
    fn relative_kinematics() {
        let s = HarvesterState::new(0.01, 0.2, 0.05, 0.5, 0.0);
        approx::assert_relative_eq!(s.relative_position(), 0.04);
        approx::assert_relative_eq!(s.relative_velocity(), 0.3);
    }

    #[test]
    fn set_then_get() {
        let mut s = HarvesterState::default();
        s.set(StateIndex::FluxLinkage, 3.0);
        assert_eq!(s.get(StateIndex::FluxLinkage), 3.0);
        assert_eq!(s.to_array()[4], 3.0);
    }
}
