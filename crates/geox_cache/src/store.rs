//! Cache entries, the backend trait, and the fail-open store adapter.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use geox_common::{DomainKind, Fingerprint};

use crate::error::CacheError;

/// One stored result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Primary key.
    pub fingerprint: Fingerprint,
    /// The kind that produced the payload.
    pub owner_kind: DomainKind,
    /// Who computed the result.
    pub principal: String,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// Canonical payload text.
    pub payload: String,
    /// Encrypted and compressed copy of the payload.
    pub secure_payload: Option<Vec<u8>>,
}

/// Result of a backend insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The entry was written.
    Inserted,
    /// An entry for this fingerprint already existed and was kept.
    AlreadyPresent,
}

/// A durable key/value store for cache entries.
///
/// Implementations must never overwrite an existing entry: the first writer
/// for a fingerprint wins and later writers get
/// [`InsertOutcome::AlreadyPresent`].
pub trait CacheBackend {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the entry for `fingerprint`, or `None` if there is no valid one.
    fn fetch(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError>;

    /// Inserts `entry` unless its fingerprint is already present.
    fn insert(&self, entry: &CacheEntry) -> Result<InsertOutcome, CacheError>;
}

/// Acknowledgement returned by [`StoreAdapter::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutAck {
    /// The entry was written.
    Stored,
    /// An entry already existed; nothing was written.
    AlreadyPresent,
    /// Caching is disabled or nothing could be stored.
    NotAttempted,
    /// The store failed; the reason is informational only.
    Failed(String),
}

impl std::fmt::Display for PutAck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PutAck::Stored => f.write_str("stored"),
            PutAck::AlreadyPresent => f.write_str("already present"),
            PutAck::NotAttempted => f.write_str("not attempted"),
            PutAck::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

enum AdapterState {
    Disabled,
    Unavailable(String),
    Ready(Box<dyn CacheBackend>),
}

/// Fail-open front for a [`CacheBackend`].
///
/// Lookups never fail: a missing entry, an unreachable store and a backend
/// error all read as a miss. Puts never fail either; they report a
/// [`PutAck`].
pub struct StoreAdapter {
    state: AdapterState,
}

impl StoreAdapter {
    /// Wraps a ready backend.
    pub fn new(backend: Box<dyn CacheBackend>) -> Self {
        Self {
            state: AdapterState::Ready(backend),
        }
    }

    /// An adapter for a disabled cache.
    pub fn disabled() -> Self {
        Self {
            state: AdapterState::Disabled,
        }
    }

    /// An adapter whose store could not be opened.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: AdapterState::Unavailable(reason.into()),
        }
    }

    /// Returns `false` only when caching is disabled by configuration.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.state, AdapterState::Disabled)
    }

    /// Returns the stored payload for `fingerprint`, if any can be read.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<String> {
        let AdapterState::Ready(backend) = &self.state else {
            return None;
        };
        match backend.fetch(fingerprint) {
            Ok(Some(entry)) => {
                debug!(backend = backend.name(), %fingerprint, "cache entry found");
                Some(entry.payload)
            }
            Ok(None) => {
                debug!(backend = backend.name(), %fingerprint, "cache miss");
                None
            }
            Err(e) => {
                warn!(backend = backend.name(), %fingerprint, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Returns the full entry for `fingerprint`, propagating store errors.
    pub fn fetch_entry(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        match &self.state {
            AdapterState::Disabled => Ok(None),
            AdapterState::Unavailable(reason) => Err(CacheError::unavailable(reason)),
            AdapterState::Ready(backend) => backend.fetch(fingerprint),
        }
    }

    /// Stores `entry` at most once, never propagating errors.
    pub fn put(&self, entry: &CacheEntry) -> PutAck {
        match &self.state {
            AdapterState::Disabled => PutAck::NotAttempted,
            AdapterState::Unavailable(reason) => PutAck::Failed(reason.clone()),
            AdapterState::Ready(backend) => match backend.insert(entry) {
                Ok(InsertOutcome::Inserted) => PutAck::Stored,
                Ok(InsertOutcome::AlreadyPresent) => PutAck::AlreadyPresent,
                Err(e) => PutAck::Failed(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    /// In-memory backend for tests.
    #[derive(Default)]
    pub(crate) struct MemoryBackend {
        pub(crate) entries: RefCell<BTreeMap<Fingerprint, CacheEntry>>,
    }

    impl CacheBackend for MemoryBackend {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn fetch(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
            Ok(self.entries.borrow().get(fingerprint).cloned())
        }

        fn insert(&self, entry: &CacheEntry) -> Result<InsertOutcome, CacheError> {
            let mut entries = self.entries.borrow_mut();
            if entries.contains_key(&entry.fingerprint) {
                return Ok(InsertOutcome::AlreadyPresent);
            }
            entries.insert(entry.fingerprint, entry.clone());
            Ok(InsertOutcome::Inserted)
        }
    }

    /// Backend that fails every call.
    pub(crate) struct FailingBackend;

    impl CacheBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn fetch(&self, _: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
            Err(CacheError::unavailable("connection refused"))
        }

        fn insert(&self, _: &CacheEntry) -> Result<InsertOutcome, CacheError> {
            Err(CacheError::StoreWriteFailed {
                reason: "disk full".to_string(),
            })
        }
    }

    pub(crate) fn entry(byte: u8) -> CacheEntry {
        CacheEntry {
            fingerprint: Fingerprint::from_digest([byte; 32]),
            owner_kind: DomainKind::Economics,
            principal: "tester".to_string(),
            created_at: Utc::now(),
            payload: format!("{{\"n\":{byte}}}"),
            secure_payload: None,
        }
    }

    #[test]
    fn put_then_lookup() {
        let adapter = StoreAdapter::new(Box::new(MemoryBackend::default()));
        let e = entry(1);
        assert_eq!(adapter.put(&e), PutAck::Stored);
        assert_eq!(adapter.lookup(&e.fingerprint), Some(e.payload.clone()));
    }

    #[test]
    fn second_put_is_already_present_and_keeps_first() {
        let adapter = StoreAdapter::new(Box::new(MemoryBackend::default()));
        let first = entry(2);
        let mut second = entry(2);
        second.payload = "later".to_string();
        assert_eq!(adapter.put(&first), PutAck::Stored);
        assert_eq!(adapter.put(&second), PutAck::AlreadyPresent);
        assert_eq!(adapter.lookup(&first.fingerprint), Some(first.payload));
    }

    #[test]
    fn disabled_adapter_never_hits() {
        let adapter = StoreAdapter::disabled();
        let e = entry(3);
        assert!(!adapter.is_enabled());
        assert_eq!(adapter.put(&e), PutAck::NotAttempted);
        assert_eq!(adapter.lookup(&e.fingerprint), None);
    }

    #[test]
    fn failing_backend_reads_as_miss() {
        let adapter = StoreAdapter::new(Box::new(FailingBackend));
        let e = entry(4);
        assert_eq!(adapter.lookup(&e.fingerprint), None);
        assert!(matches!(adapter.put(&e), PutAck::Failed(reason) if reason.contains("disk full")));
        assert!(adapter.fetch_entry(&e.fingerprint).is_err());
    }

    #[test]
    fn unavailable_adapter_is_enabled_but_empty() {
        let adapter = StoreAdapter::unavailable("cannot open");
        let e = entry(5);
        assert!(adapter.is_enabled());
        assert_eq!(adapter.lookup(&e.fingerprint), None);
        assert_eq!(adapter.put(&e), PutAck::Failed("cannot open".to_string()));
    }

    #[test]
    fn ack_display() {
        assert_eq!(PutAck::Stored.to_string(), "stored");
        assert_eq!(PutAck::Failed("x".into()).to_string(), "failed: x");
    }
}
