//! Typed input and output parameters for simulator domain objects.
//!
//! Every domain object owns one [`InputSet`] and one [`OutputSet`]. Parameters
//! carry their value together with static metadata (bounds, units, tooltips)
//! that lives only in memory; the cache persists the value and flags and relies
//! on a freshly constructed template for everything else.

#![warn(missing_docs)]

pub mod apply;
pub mod choice;
pub mod error;
pub mod parameter;
pub mod set;
pub mod units;
pub mod value;

pub use apply::{ApplyOutcome, InputEntry};
pub use choice::{Choice, ChoiceFamily, EconomicModel, EndUseOption, PowerPlantType, ReservoirModel};
pub use error::ParamError;
pub use parameter::{Bounds, OutputParameter, Parameter};
pub use set::{InputSet, Named, OutputSet, ParameterSet};
pub use units::{UnitType, Units};
pub use value::{CoerceError, ParamValue, ValueKind};
