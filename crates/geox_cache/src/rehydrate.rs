//! Rebuilding typed parameter sets from a decoded payload.
//!
//! Every field named by the kind's [`Schema`] must be present in the tree
//! and decode as its declared kind; otherwise nothing is returned. Static
//! attributes (bounds, units, tooltips) always come from the template, only
//! values and the `provided`/`valid` flags come from the payload.

use geox_params::{InputSet, OutputSet};

use crate::codec::DecodedTree;
use crate::error::CacheError;
use crate::schema::{FieldRole, FieldSpec, Schema};

/// Builds fully populated input and output sets from `tree`.
///
/// The templates are left untouched; the caller swaps the returned sets in
/// only when this succeeds.
pub fn rehydrate(
    schema: &Schema,
    template_inputs: &InputSet,
    template_outputs: &OutputSet,
    tree: &DecodedTree,
) -> Result<(InputSet, OutputSet), CacheError> {
    let incomplete = |reason: String| CacheError::RehydrationIncomplete {
        kind: schema.kind(),
        reason,
    };

    if tree.kind != schema.kind() {
        return Err(incomplete(format!("payload belongs to {}", tree.kind)));
    }

    let mut inputs = template_inputs.clone();
    let mut outputs = template_outputs.clone();

    for field in schema.fields() {
        let FieldSpec { name, role, kind } = field;
        let record = tree
            .find(*role, name)
            .ok_or_else(|| incomplete(format!("missing {role} '{name}'")))?;
        let raw = record
            .value()
            .ok_or_else(|| incomplete(format!("{role} '{name}' has no value")))?;
        let value = kind
            .decode_json(raw)
            .map_err(|e| incomplete(format!("{role} '{name}': {e}")))?;

        match role {
            FieldRole::Input => {
                let param = inputs
                    .get_mut(name)
                    .ok_or_else(|| incomplete(format!("no template for input '{name}'")))?;
                param
                    .set_value(value)
                    .map_err(|e| incomplete(e.to_string()))?;
                if let Some(provided) = record.flag("provided") {
                    param.provided = provided;
                }
                if let Some(valid) = record.flag("valid") {
                    param.valid = valid;
                }
            }
            FieldRole::Output => {
                outputs
                    .get_mut(name)
                    .ok_or_else(|| incomplete(format!("no template for output '{name}'")))?
                    .set(value)
                    .map_err(|e| incomplete(e.to_string()))?;
            }
        }
    }

    Ok((inputs, outputs))
}
