//! Failures of the compute cache and its stores.

use std::path::PathBuf;

use geox_common::DomainKind;

/// Everything that can go wrong reading or writing cache entries.
///
/// None of these reach callers of
/// [`Cache::compute_with_cache`](crate::Cache::compute_with_cache): read-path
/// failures become misses and write-path failures become warnings. The enum is
/// used for propagation inside the subsystem and by inspection tooling.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The fingerprint could not be derived.
    #[error("fingerprint unavailable: {reason}")]
    FingerprintUnavailable {
        /// Description of the failure.
        reason: String,
    },

    /// The backing store could not be opened or queried.
    #[error("cache store unavailable: {reason}")]
    StoreUnavailable {
        /// Description of the failure.
        reason: String,
    },

    /// The backing store rejected a write.
    #[error("cache store write failed: {reason}")]
    StoreWriteFailed {
        /// Description of the failure.
        reason: String,
    },

    /// A stored payload could not be turned back into a complete object.
    #[error("incomplete rehydration of {kind}: {reason}")]
    RehydrationIncomplete {
        /// The kind being rehydrated.
        kind: DomainKind,
        /// The first field or check that failed.
        reason: String,
    },

    /// Key material could not be read or created.
    #[error("key provisioning failed at {path}: {reason}")]
    KeyProvisioningFailed {
        /// The key-material file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Encoding, decoding, encryption or compression failed.
    #[error("payload codec failure: {reason}")]
    CodecFailure {
        /// Description of the failure.
        reason: String,
    },

    /// A store file or directory could not be read or written.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Cause reported by the OS.
        source: std::io::Error,
    },
}

impl CacheError {
    pub(crate) fn codec(reason: impl std::fmt::Display) -> Self {
        CacheError::CodecFailure {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn unavailable(reason: impl std::fmt::Display) -> Self {
        CacheError::StoreUnavailable {
            reason: reason.to_string(),
        }
    }
}
