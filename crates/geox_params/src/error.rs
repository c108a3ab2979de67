//! Error types for parameter access and input application.

use crate::choice::ChoiceFamily;
use crate::value::ValueKind;

/// Errors raised when reading, setting or applying parameter values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// User text could not be parsed as the parameter's kind.
    #[error("cannot parse '{text}' for parameter '{name}' as {expected}")]
    Parse {
        /// The parameter name.
        name: String,
        /// The offending text.
        text: String,
        /// The kind the parameter declares.
        expected: ValueKind,
    },

    /// A value of the wrong kind was supplied or requested.
    #[error("parameter '{name}' holds {expected}, not {found}")]
    KindMismatch {
        /// The parameter name.
        name: String,
        /// The kind the parameter declares.
        expected: ValueKind,
        /// The kind that was supplied or requested.
        found: ValueKind,
    },

    /// A choice was requested from a parameter that holds another kind.
    #[error("parameter '{name}' holds {found}, not a choice")]
    NotAChoice {
        /// The parameter name.
        name: String,
        /// The kind the parameter declares.
        found: ValueKind,
    },

    /// A unit suffix did not match the parameter's current units.
    #[error("parameter '{name}' is in '{current}', got '{given}' (unit conversion is not supported)")]
    UnitsMismatch {
        /// The parameter name.
        name: String,
        /// The parameter's current units.
        current: String,
        /// The suffix supplied with the value.
        given: String,
    },

    /// No parameter with this name exists in the set.
    #[error("unknown parameter '{name}'")]
    Unknown {
        /// The requested name.
        name: String,
    },

    /// A choice value names no member of its family.
    #[error("'{text}' is not a member of {family}")]
    UnknownChoice {
        /// The family the parameter selects from.
        family: ChoiceFamily,
        /// The offending text.
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse() {
        let err = ParamError::Parse {
            name: "Plant Lifetime".to_string(),
            text: "thirty".to_string(),
            expected: ValueKind::Int,
        };
        assert_eq!(
            err.to_string(),
            "cannot parse 'thirty' for parameter 'Plant Lifetime' as int"
        );
    }

    #[test]
    fn display_unknown() {
        let err = ParamError::Unknown {
            name: "Flux Capacitor".to_string(),
        };
        assert_eq!(err.to_string(), "unknown parameter 'Flux Capacitor'");
    }

    #[test]
    fn display_unknown_choice() {
        let err = ParamError::UnknownChoice {
            family: ChoiceFamily::PowerPlantType,
            text: "Steam Engine".to_string(),
        };
        assert!(err.to_string().contains("PowerPlantType"));
    }

    #[test]
    fn display_units_mismatch() {
        let err = ParamError::UnitsMismatch {
            name: "Reservoir Depth".to_string(),
            current: "km".to_string(),
            given: "ft".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'km'"));
        assert!(msg.contains("'ft'"));
    }
}
