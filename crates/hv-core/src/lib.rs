//! hv-core: shared foundation for the harvester workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (finiteness checks, gradient, mean)
//! - state (named 5-element harvester state vector)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod state;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use state::{HarvesterState, STATE_DIM, StateIndex};
pub use units::*;
