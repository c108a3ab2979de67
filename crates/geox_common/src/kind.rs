//! The closed set of cacheable domain-object kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies which simulator module a cached object belongs to.
///
/// Stored as the owner kind of every cache entry and embedded in payloads so a
/// payload can never be rehydrated into an object of a different kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DomainKind {
    /// Reservoir heat-extraction model.
    Reservoir,
    /// Production and injection wellbore hydraulics.
    WellBores,
    /// Surface conversion plant.
    SurfacePlant,
    /// Levelized cost and project finance.
    Economics,
}

impl DomainKind {
    /// Every kind, in pipeline order.
    pub const ALL: [DomainKind; 4] = [
        DomainKind::Reservoir,
        DomainKind::WellBores,
        DomainKind::SurfacePlant,
        DomainKind::Economics,
    ];

    /// Returns the stable tag written to the backing store.
    pub fn as_str(self) -> &'static str {
        match self {
            DomainKind::Reservoir => "Reservoir",
            DomainKind::WellBores => "WellBores",
            DomainKind::SurfacePlant => "SurfacePlant",
            DomainKind::Economics => "Economics",
        }
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown domain kind '{s}'"))
    }
}
