//! Canonical textual payloads for domain-object state.
//!
//! A payload is a JSON document
//!
//! ```json
//! {"format": 1, "kind": "Economics", "records": [{"role": "input", "name": "Discount Rate", "value": 0.07, ...}]}
//! ```
//!
//! with one record per parameter carrying its role, name, value and every
//! other attribute. Keys are sorted at every level so identical state always
//! encodes to identical text. Decoding yields a loosely-typed
//! [`DecodedTree`]; turning that back into typed parameters is the
//! rehydrator's job.

use serde::{Deserialize, Serialize};

use geox_common::DomainKind;
use geox_params::{InputSet, OutputSet};

use crate::error::CacheError;
use crate::schema::FieldRole;

/// Current payload format version.
pub const PAYLOAD_FORMAT: u32 = 1;

#[derive(Serialize)]
struct EncodedRecord<'a, P: Serialize> {
    role: FieldRole,
    #[serde(flatten)]
    param: &'a P,
}

#[derive(Serialize)]
struct EncodedDocument {
    format: u32,
    kind: DomainKind,
    records: Vec<serde_json::Value>,
}

/// Encodes a domain object's inputs and outputs as a canonical payload.
pub fn encode(kind: DomainKind, inputs: &InputSet, outputs: &OutputSet) -> Result<String, CacheError> {
    let mut records = Vec::with_capacity(inputs.len() + outputs.len());
    for param in inputs.iter() {
        records.push(record_value(FieldRole::Input, param)?);
    }
    for param in outputs.iter() {
        records.push(record_value(FieldRole::Output, param)?);
    }
    let document = EncodedDocument {
        format: PAYLOAD_FORMAT,
        kind,
        records,
    };
    // Going through Value sorts the top-level keys as well.
    let value = serde_json::to_value(&document).map_err(CacheError::codec)?;
    serde_json::to_string(&value).map_err(CacheError::codec)
}

fn record_value<P: Serialize>(role: FieldRole, param: &P) -> Result<serde_json::Value, CacheError> {
    serde_json::to_value(EncodedRecord { role, param }).map_err(CacheError::codec)
}

/// A decoded payload: kind plus named records, not yet typed.
#[derive(Debug, Clone, Deserialize)]
pub struct DecodedTree {
    /// Payload format version.
    pub format: u32,
    /// The kind that produced the payload.
    pub kind: DomainKind,
    /// One record per persisted parameter.
    pub records: Vec<Record>,
}

/// One persisted parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// Input or output.
    pub role: FieldRole,
    /// Parameter name.
    pub name: String,
    /// Every other attribute, including `value`.
    #[serde(flatten)]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// Returns the stored value.
    pub fn value(&self) -> Option<&serde_json::Value> {
        self.attrs.get("value")
    }

    /// Returns a boolean attribute such as `provided` or `valid`.
    pub fn flag(&self, attr: &str) -> Option<bool> {
        self.attrs.get(attr).and_then(serde_json::Value::as_bool)
    }
}

impl DecodedTree {
    /// Finds the record with this role and name.
    pub fn find(&self, role: FieldRole, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.role == role && r.name == name)
    }
}

/// Decodes a payload into a generic record tree.
pub fn decode(raw: &str) -> Result<DecodedTree, CacheError> {
    let tree: DecodedTree = serde_json::from_str(raw).map_err(CacheError::codec)?;
    if tree.format != PAYLOAD_FORMAT {
        return Err(CacheError::CodecFailure {
            reason: format!(
                "unsupported payload format {} (expected {PAYLOAD_FORMAT})",
                tree.format
            ),
        });
    }
    Ok(tree)
}
