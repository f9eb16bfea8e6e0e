//! hv-components: component library for the electromechanical harvester.
//!
//! Provides models for the pieces the governing equations compose:
//! - Dampers, end-stop mechanical springs and fitted magnetic springs
//! - Magnet assembly mass and base excitation input
//! - Flux linkage models, load and coil resistance (the electrical model)
//! - Electro-mechanical coupling
//! - A flux database built from parametric FEA exports
//!
//! All components are configured once and then only evaluated; none of them
//! is mutated by the solver.
//!
//! # Example
//!
//! ```no_run
//! use hv_components::{ConstantDamper, Damper, ElectricalModel, FluxModel, FluxModelKind, SimpleLoad};
//! use hv_core::{HarvesterState, ohm};
//!
//! let damper = ConstantDamper::new(0.035);
//! let f = damper.get_force(0.2);
//!
//! let z: Vec<f64> = (0..50).map(|i| i as f64 * 1e-3).collect();
//! let phi: Vec<f64> = z.iter().map(|z| (-(z - 0.025).powi(2) / 1e-4).exp()).collect();
//! let flux = FluxModel::from_samples(FluxModelKind::Unispline, &z, &phi).unwrap();
//!
//! let mut electrical = ElectricalModel::new("coil");
//! electrical.set_flux_model(flux);
//! electrical.set_coil_resistance(ohm(12.5));
//! electrical.set_load_model(SimpleLoad::new(ohm(30.0)).unwrap());
//!
//! let state = HarvesterState::new(0.0, 0.0, 0.02, 0.1, 0.0);
//! let emf = electrical.get_emf(state.relative_position(), state.relative_velocity()).unwrap();
//! println!("force {f} N, emf {emf} V, current {} A", electrical.get_current(emf));
//! ```

pub mod adc;
pub mod common;
pub mod coupling;
pub mod damper;
pub mod electrical;
pub mod error;
pub mod excitation;
pub mod flux;
pub mod flux_db;
pub mod load;
pub mod magnet_assembly;
pub mod magnetic_spring;
pub mod mechanical;
pub mod mechanical_spring;
pub mod traits;

// Re-exports
pub use adc::AdcProcessor;
pub use coupling::{ConstantCoupling, CouplingModel};
pub use damper::{ConstantDamper, DamperModel};
pub use electrical::ElectricalModel;
pub use error::{ComponentError, ComponentResult};
pub use excitation::{AccelUnit, AccelerometerInput, InputExcitation, TimeUnit};
pub use flux::{FluxFn, FluxModel, FluxModelKind};
pub use flux_db::{FluxDatabase, FluxKey};
pub use load::{LoadModel, SimpleLoad};
pub use magnet_assembly::MagnetAssembly;
pub use magnetic_spring::MagneticSpring;
pub use mechanical::MechanicalModel;
pub use mechanical_spring::{MechanicalSpring, PushDirection};
pub use traits::{Coupling, Damper, Excitation, Load};
