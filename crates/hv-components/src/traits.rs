//! Core traits for component models.
//!
//! Components are deterministic functions of local kinematics and their
//! fixed parameters, so they can be shared freely across parallel solves.

/// Velocity-dependent dissipative force.
pub trait Damper: Send + Sync {
    /// Force opposing motion at `velocity` [m/s], in newtons.
    ///
    /// Sign convention: positive force opposes positive velocity.
    fn get_force(&self, velocity: f64) -> f64;
}

/// Translation of electrical load current into a mechanical force.
pub trait Coupling: Send + Sync {
    /// Mechanical force [N] produced by coil `current` [A].
    fn get_mechanical_force(&self, current: f64) -> f64;
}

/// Electrical load attached to the coil terminals.
pub trait Load: Send + Sync {
    /// Load resistance [ohm].
    fn resistance(&self) -> f64;
}

/// Base excitation applied to the harvester housing.
pub trait Excitation: Send + Sync {
    /// Housing acceleration [m/s^2] at time `t` [s].
    fn get_acceleration(&self, t: f64) -> f64;
}
