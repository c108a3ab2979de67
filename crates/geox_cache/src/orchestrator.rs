//! High-level compute-with-cache orchestrator.
//!
//! The [`Cache`] ties together fingerprinting, the store adapter, the payload
//! codec and the rehydrator into the single call every expensive domain
//! object goes through. Caching is fail-open throughout: no failure in this
//! subsystem ever changes or removes a computed result.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use geox_common::Fingerprint;
use geox_config::{BackendKind, CacheConfig};

use crate::codec::{decode, encode};
use crate::domain::{Computable, Identity};
use crate::error::CacheError;
use crate::file_store::FileStore;
use crate::fingerprint::compute_fingerprint;
use crate::rehydrate::rehydrate;
use crate::secure::KeyMaterial;
use crate::sqlite_store::SqliteStore;
use crate::store::{CacheBackend, CacheEntry, PutAck, StoreAdapter};

/// What happened to one `compute_with_cache` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Caching is disabled; compute ran directly.
    Bypassed,
    /// A stored result was rehydrated; compute did not run.
    Hit {
        /// The matched fingerprint.
        fingerprint: Fingerprint,
    },
    /// Compute ran and its result was offered to the store.
    Computed {
        /// The fingerprint, if one could be derived.
        fingerprint: Option<Fingerprint>,
        /// The store's acknowledgement.
        ack: PutAck,
    },
}

impl CacheOutcome {
    /// Returns `true` for [`CacheOutcome::Hit`].
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit { .. })
    }

    /// Returns the fingerprint involved, if any.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            CacheOutcome::Bypassed => None,
            CacheOutcome::Hit { fingerprint } => Some(fingerprint),
            CacheOutcome::Computed { fingerprint, .. } => fingerprint.as_ref(),
        }
    }
}

impl std::fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheOutcome::Bypassed => f.write_str("bypassed"),
            CacheOutcome::Hit { .. } => f.write_str("hit"),
            CacheOutcome::Computed { ack, .. } => write!(f, "computed ({ack})"),
        }
    }
}

/// Compute cache shared by every domain object in a run.
pub struct Cache {
    store: StoreAdapter,
    principal: String,
    key_path: Option<PathBuf>,
    key: OnceCell<Option<KeyMaterial>>,
}

impl Cache {
    /// Creates a cache over `store`.
    ///
    /// Key material at `key_path` is provisioned lazily on the first store;
    /// without a key path no secure payloads are written.
    pub fn new(store: StoreAdapter, principal: impl Into<String>, key_path: Option<PathBuf>) -> Self {
        Self {
            store,
            principal: principal.into(),
            key_path,
            key: OnceCell::new(),
        }
    }

    /// A cache that always bypasses.
    pub fn disabled() -> Self {
        Self::new(StoreAdapter::disabled(), "unknown", None)
    }

    /// Returns `false` when caching is disabled by configuration.
    pub fn is_enabled(&self) -> bool {
        self.store.is_enabled()
    }

    /// Returns the principal recorded on stored entries.
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Runs `object`'s compute unless an equivalent result is stored.
    ///
    /// Only the object's own compute errors are returned; every cache fault
    /// degrades to computing directly.
    pub fn compute_with_cache<C: Computable>(&self, object: &mut C) -> Result<CacheOutcome, C::Error> {
        if !self.store.is_enabled() {
            object.compute()?;
            return Ok(CacheOutcome::Bypassed);
        }

        let identity = object.identity();
        let fingerprint = match compute_fingerprint(&identity, object.inputs()) {
            Ok(fp) => fp,
            Err(e) => {
                warn!(kind = %identity.kind, error = %e, "cannot fingerprint, computing without cache");
                object.compute()?;
                return Ok(CacheOutcome::Computed {
                    fingerprint: None,
                    ack: PutAck::NotAttempted,
                });
            }
        };
        debug!(kind = %identity.kind, %fingerprint, "computed fingerprint");

        if let Some(raw) = self.store.lookup(&fingerprint) {
            match restore_from(object, &raw) {
                Ok(()) => {
                    info!(kind = %identity.kind, %fingerprint, "cache hit");
                    return Ok(CacheOutcome::Hit { fingerprint });
                }
                Err(e) => {
                    warn!(kind = %identity.kind, %fingerprint, error = %e, "stored entry unusable, recomputing");
                }
            }
        }

        object.compute()?;
        let ack = self.store_result(object, &identity, fingerprint);
        Ok(CacheOutcome::Computed {
            fingerprint: Some(fingerprint),
            ack,
        })
    }

    fn store_result<C: Computable>(&self, object: &C, identity: &Identity, fingerprint: Fingerprint) -> PutAck {
        let payload = match encode(identity.kind, object.inputs(), object.outputs()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(kind = %identity.kind, %fingerprint, error = %e, "cannot encode result, not storing");
                return PutAck::NotAttempted;
            }
        };

        let secure_payload = self.key_material().and_then(|key| match key.seal(payload.as_bytes()) {
            Ok(sealed) => Some(sealed),
            Err(e) => {
                warn!(%fingerprint, error = %e, "cannot seal payload, storing plaintext only");
                None
            }
        });

        let entry = CacheEntry {
            fingerprint,
            owner_kind: identity.kind,
            principal: self.principal.clone(),
            created_at: Utc::now(),
            payload,
            secure_payload,
        };
        let ack = self.store.put(&entry);
        match &ack {
            PutAck::Stored => info!(kind = %identity.kind, %fingerprint, "stored result"),
            PutAck::AlreadyPresent => debug!(kind = %identity.kind, %fingerprint, "result already stored"),
            PutAck::NotAttempted => {}
            PutAck::Failed(reason) => warn!(kind = %identity.kind, %fingerprint, %reason, "cannot store result"),
        }
        ack
    }

    /// Returns the key material, provisioning it on first use.
    pub fn key_material(&self) -> Option<&KeyMaterial> {
        self.key
            .get_or_init(|| {
                let path = self.key_path.as_ref()?;
                match KeyMaterial::load_or_create(path) {
                    Ok(key) => Some(key),
                    Err(e) => {
                        warn!(error = %e, "secure payloads disabled");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Returns the stored entry for `fingerprint`, for inspection.
    pub fn inspect(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        self.store.fetch_entry(fingerprint)
    }

    /// Opens an entry's secure payload with this cache's key material.
    ///
    /// Returns `Ok(None)` when the entry carries no secure payload. A missing
    /// key file is an error; it is never created here.
    pub fn open_secure(&self, entry: &CacheEntry) -> Result<Option<String>, CacheError> {
        let Some(sealed) = &entry.secure_payload else {
            return Ok(None);
        };
        let key = match &self.key_path {
            Some(path) => KeyMaterial::load(path)?,
            None => {
                return Err(CacheError::codec("no key material configured"));
            }
        };
        let plain = key.open(sealed)?;
        String::from_utf8(plain)
            .map(Some)
            .map_err(CacheError::codec)
    }
}

/// Decodes and rehydrates `raw` into `object`, all or nothing.
fn restore_from<C: Computable>(object: &mut C, raw: &str) -> Result<(), CacheError> {
    let tree = decode(raw)?;
    let (inputs, outputs) = rehydrate(object.schema(), object.inputs(), object.outputs(), &tree)?;
    object.restore(inputs, outputs);
    Ok(())
}

/// Builds the cache described by `config`, resolving paths against `base`.
///
/// A store that cannot be opened leaves caching enabled but empty, so every
/// object computes and every put reports the failure.
pub fn open_cache(config: &CacheConfig, base: &Path) -> Cache {
    if !config.enabled {
        debug!("compute cache disabled by configuration");
        return Cache::disabled();
    }

    let store_path = config.store_path(base);
    let opened: Result<Box<dyn CacheBackend>, CacheError> = match config.backend {
        BackendKind::File => FileStore::open(&store_path).map(|s| Box::new(s) as Box<dyn CacheBackend>),
        BackendKind::Sqlite => SqliteStore::open(&store_path).map(|s| Box::new(s) as Box<dyn CacheBackend>),
    };
    let store = match opened {
        Ok(backend) => {
            debug!(backend = backend.name(), path = %store_path.display(), "opened compute cache");
            StoreAdapter::new(backend)
        }
        Err(e) => {
            warn!(path = %store_path.display(), error = %e, "cache store unavailable, computing without it");
            StoreAdapter::unavailable(e.to_string())
        }
    };

    Cache::new(store, config.resolved_principal(), Some(config.key_path(base)))
}
