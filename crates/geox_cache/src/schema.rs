//! Per-kind field descriptors used to decode stored payloads.

use serde::{Deserialize, Serialize};

use geox_common::DomainKind;
use geox_params::{InputSet, OutputSet, ValueKind};

/// Whether a field is an input or an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// A user-settable or piped input.
    Input,
    /// A computed output.
    Output,
}

impl std::fmt::Display for FieldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldRole::Input => f.write_str("input"),
            FieldRole::Output => f.write_str("output"),
        }
    }
}

/// One persisted field of a domain object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Parameter name.
    pub name: String,
    /// Input or output.
    pub role: FieldRole,
    /// Declared value kind, used to decode the stored value.
    pub kind: ValueKind,
}

/// The full list of persisted fields for one domain-object kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    kind: DomainKind,
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Builds a schema from a kind's declared inputs and outputs.
    ///
    /// Inputs take their kind from the declared default, so the schema never
    /// depends on whatever value a parameter currently holds.
    pub fn from_sets(kind: DomainKind, inputs: &InputSet, outputs: &OutputSet) -> Self {
        let mut fields = Vec::with_capacity(inputs.len() + outputs.len());
        for p in inputs.iter() {
            fields.push(FieldSpec {
                name: p.name.clone(),
                role: FieldRole::Input,
                kind: p.kind(),
            });
        }
        for p in outputs.iter() {
            fields.push(FieldSpec {
                name: p.name.clone(),
                role: FieldRole::Output,
                kind: p.kind(),
            });
        }
        Self { kind, fields }
    }

    /// The kind this schema describes.
    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    /// Every field, inputs first, each group name-sorted.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geox_params::{OutputParameter, Parameter};

    #[test]
    fn fields_follow_sets() {
        let inputs: InputSet = [
            Parameter::int("Plant Lifetime", 30),
            Parameter::float("Discount Rate", 0.07),
        ]
        .into_iter()
        .collect();
        let outputs: OutputSet = [OutputParameter::float("LCOE")].into_iter().collect();
        let schema = Schema::from_sets(DomainKind::Economics, &inputs, &outputs);

        assert_eq!(schema.kind(), DomainKind::Economics);
        let names: Vec<(&str, FieldRole)> = schema
            .fields()
            .iter()
            .map(|f| (f.name.as_str(), f.role))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Discount Rate", FieldRole::Input),
                ("Plant Lifetime", FieldRole::Input),
                ("LCOE", FieldRole::Output),
            ]
        );
        assert_eq!(schema.fields()[1].kind, ValueKind::Int);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FieldRole::Output).unwrap(),
            "\"output\""
        );
    }
}
