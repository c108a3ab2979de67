//! Shared foundational types used across the geox simulator.
//!
//! This crate provides the content fingerprint used as the cache key and the
//! closed set of domain-object kinds that the cache knows how to rehydrate.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod kind;

pub use fingerprint::{Fingerprint, ParseFingerprintError};
pub use kind::DomainKind;
