//! The capability every cacheable domain object implements.

use std::borrow::Cow;
use std::path::PathBuf;

use geox_common::DomainKind;
use geox_params::{InputSet, OutputSet};

use crate::error::CacheError;
use crate::schema::Schema;

/// Bytes that identify the code computing a domain object.
///
/// Any change to the marker changes every fingerprint of that kind, so stale
/// results computed by older code are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeMarker {
    /// Marker text compiled into the binary, typically the model's source.
    Embedded(&'static str),
    /// A file read at fingerprint time.
    File(PathBuf),
}

impl CodeMarker {
    /// Returns the marker bytes.
    pub fn bytes(&self) -> Result<Cow<'static, [u8]>, CacheError> {
        match self {
            CodeMarker::Embedded(text) => Ok(Cow::Borrowed(text.as_bytes())),
            CodeMarker::File(path) => std::fs::read(path).map(Cow::Owned).map_err(|e| {
                CacheError::FingerprintUnavailable {
                    reason: format!("cannot read code marker {}: {e}", path.display()),
                }
            }),
        }
    }
}

/// Stable identity of a domain object: its kind and its code marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The domain-object kind.
    pub kind: DomainKind,
    /// The code/definition marker.
    pub marker: CodeMarker,
}

/// A domain object whose compute is a pure function of its inputs.
pub trait Computable {
    /// Domain failure raised by [`compute`](Computable::compute).
    type Error;

    /// Returns the object's identity.
    fn identity(&self) -> Identity;

    /// Returns the per-kind field descriptors.
    fn schema(&self) -> &Schema;

    /// Returns the current inputs.
    fn inputs(&self) -> &InputSet;

    /// Returns the current outputs.
    fn outputs(&self) -> &OutputSet;

    /// Replaces inputs and outputs with fully rehydrated sets.
    fn restore(&mut self, inputs: InputSet, outputs: OutputSet);

    /// Computes the outputs from the inputs.
    fn compute(&mut self) -> Result<(), Self::Error>;
}
