//! Simulator domain models and the cached pipeline that runs them.
//!
//! Each model owns its typed inputs and outputs and implements
//! [`geox_cache::Computable`], so every stage of a [`Simulation`] goes through
//! the compute cache. Upstream outputs are piped into downstream inputs before
//! the downstream stage is fingerprinted.

#![warn(missing_docs)]

pub mod economics;
pub mod error;
mod math;
pub mod names;
pub mod reservoir;
pub mod simulation;
pub mod surface_plant;
pub mod wellbores;

pub use economics::Economics;
pub use error::ModelError;
pub use reservoir::Reservoir;
pub use simulation::{InputReport, RunReport, Simulation, StageReport};
pub use surface_plant::SurfacePlant;
pub use wellbores::WellBores;
