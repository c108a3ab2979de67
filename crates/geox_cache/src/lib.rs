//! Fingerprinted compute memoization for simulator domain objects.
//!
//! Before an expensive, deterministic calculation runs, the [`Cache`] derives
//! a content [`Fingerprint`](geox_common::Fingerprint) from the object's inputs
//! and code marker and looks it up in a durable store. A hit rebuilds the full
//! typed result without recomputation; a miss computes and then stores the
//! result on a best-effort basis. Every failure inside this crate degrades to
//! plain computation.

#![warn(missing_docs)]

pub mod codec;
pub mod domain;
pub mod error;
pub mod file_store;
pub mod fingerprint;
pub mod orchestrator;
pub mod rehydrate;
pub mod schema;
pub mod secure;
pub mod sqlite_store;
pub mod store;

pub use codec::{decode, encode, DecodedTree, Record, PAYLOAD_FORMAT};
pub use domain::{CodeMarker, Computable, Identity};
pub use error::CacheError;
pub use file_store::FileStore;
pub use fingerprint::compute_fingerprint;
pub use orchestrator::{open_cache, Cache, CacheOutcome};
pub use rehydrate::rehydrate;
pub use schema::{FieldRole, FieldSpec, Schema};
pub use secure::KeyMaterial;
pub use sqlite_store::SqliteStore;
pub use store::{CacheBackend, CacheEntry, InsertOutcome, PutAck, StoreAdapter};
