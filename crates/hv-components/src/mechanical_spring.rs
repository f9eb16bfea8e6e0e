//! End-stop mechanical spring.
//!
//! Models the hard stop at one end of the tube. The spring only acts once
//! the magnet passes `position` in the push direction; outside that region
//! the force is exactly zero.

use crate::common::{check_finite, check_non_negative};
use crate::error::ComponentResult;
use hv_core::units::Length;
use serde::{Deserialize, Serialize};

/// Direction in which the spring pushes the magnet back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushDirection {
    /// Stop below the magnet (engaged when `z < position`).
    Up,
    /// Stop above the magnet (engaged when `z > position`).
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanicalSpring {
    pub push_direction: PushDirection,
    /// Engagement position relative to the tube [m]
    pub position: f64,
    /// Contact stiffness [N/m]
    pub strength: f64,
    /// A pure spring contributes no contact damping.
    pub pure: bool,
    /// Contact damping [N*s/m], ignored when `pure`
    pub damping: f64,
}

impl MechanicalSpring {
    pub fn new(
        push_direction: PushDirection,
        position: Length,
        strength: f64,
        pure: bool,
        damping: f64,
    ) -> ComponentResult<Self> {
        check_finite(position.value, "mechanical spring position")?;
        check_non_negative(strength, "mechanical spring strength")?;
        check_non_negative(damping, "mechanical spring damping")?;
        Ok(Self {
            push_direction,
            position: position.value,
            strength,
            pure,
            damping,
        })
    }

    /// How far the magnet has travelled past the stop (0 when disengaged).
    pub fn penetration(&self, z: f64) -> f64 {
        let pen = match self.push_direction {
            PushDirection::Down => z - self.position,
            PushDirection::Up => self.position - z,
        };
        pen.max(0.0)
    }

    /// Force at relative position `z` and relative velocity `v`.
    ///
    /// Positive values point down (`-z`), matching the sign the governing
    /// equations subtract.
    pub fn get_force(&self, z: f64, v: f64) -> f64 {
        let pen = self.penetration(z);
        if pen <= 0.0 {
            return 0.0;
        }
        let elastic = match self.push_direction {
            PushDirection::Down => self.strength * pen,
            PushDirection::Up => -self.strength * pen,
        };
        if self.pure {
            elastic
        } else {
            elastic + self.damping * v
        }
    }
}
