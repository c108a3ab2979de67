//! Content fingerprints of domain-object inputs.
//!
//! The fingerprint is SHA-256 over the canonical JSON of the input set
//! followed by the raw code-marker bytes. Canonical JSON has sorted keys at
//! every level and uses the shortest round-trip float formatting, so it only
//! depends on parameter values and metadata, never on insertion order.

use sha2::{Digest, Sha256};

use geox_common::Fingerprint;
use geox_params::InputSet;

use crate::domain::Identity;
use crate::error::CacheError;

/// Derives the fingerprint of `inputs` computed by the code behind `identity`.
pub fn compute_fingerprint(identity: &Identity, inputs: &InputSet) -> Result<Fingerprint, CacheError> {
    let canonical = canonical_json(inputs)?;
    let marker = identity.marker.bytes()?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hasher.update(marker.as_ref());
    let digest: [u8; 32] = hasher.finalize().into();
    Ok(Fingerprint::from_digest(digest))
}

/// Serializes `inputs` with sorted keys.
fn canonical_json(inputs: &InputSet) -> Result<Vec<u8>, CacheError> {
    // Round-tripping through Value sorts every object's keys.
    let value = serde_json::to_value(inputs).map_err(|e| CacheError::FingerprintUnavailable {
        reason: e.to_string(),
    })?;
    serde_json::to_vec(&value).map_err(|e| CacheError::FingerprintUnavailable {
        reason: e.to_string(),
    })
}
