//! Input and output parameter definitions.

use serde::Serialize;

use crate::choice::Choice;
use crate::error::ParamError;
use crate::units::Units;
use crate::value::{ParamValue, ValueKind};

/// Default message reported when a user value is rejected.
pub const DEFAULT_ERR_MESSAGE: &str = "assume default value (see manual)";

/// Validity bounds for a parameter's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Bounds {
    /// Any value of the declared kind is accepted.
    Unbounded,
    /// Inclusive range for floats and every element of a float list.
    Range {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Inclusive allowable range for integers.
    IntRange {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
}

impl Bounds {
    /// Returns `true` if `value` lies within these bounds.
    ///
    /// Bounds that do not apply to the value's kind accept it.
    pub fn admits(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Bounds::Range { min, max }, ParamValue::Float(x)) => *x >= *min && *x <= *max,
            (Bounds::Range { min, max }, ParamValue::FloatList(v)) => {
                v.iter().all(|x| *x >= *min && *x <= *max)
            }
            (Bounds::IntRange { min, max }, ParamValue::Int(i)) => *i >= *min && *i <= *max,
            _ => true,
        }
    }
}

/// A user-settable input of a domain object.
///
/// The value is kind-checked on every write: a parameter declared as a float
/// can never hold a string. Everything except the value and the
/// `provided`/`valid` flags is static metadata fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Unique name within the owning set.
    pub name: String,
    value: ParamValue,
    /// Value assigned at construction.
    pub default_value: ParamValue,
    /// Whether the user must supply this parameter.
    pub required: bool,
    /// Whether the current value came from the user or an upstream stage.
    pub provided: bool,
    /// Whether the current value passed validation.
    pub valid: bool,
    /// Message reported when a user value is rejected.
    pub err_message: String,
    /// Comment that came with the last applied user value.
    pub input_comment: String,
    /// Help text.
    pub tooltip: String,
    /// Unit metadata.
    pub units: Units,
    /// Validity bounds.
    pub bounds: Bounds,
}

impl Parameter {
    fn new(name: &str, default: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            value: default.clone(),
            default_value: default,
            required: false,
            provided: false,
            valid: true,
            err_message: DEFAULT_ERR_MESSAGE.to_string(),
            input_comment: String::new(),
            tooltip: String::new(),
            units: Units::none(),
            bounds: Bounds::Unbounded,
        }
    }

    /// Declares a float parameter.
    pub fn float(name: &str, default: f64) -> Self {
        Self::new(name, ParamValue::Float(default))
    }

    /// Declares an integer parameter.
    pub fn int(name: &str, default: i64) -> Self {
        Self::new(name, ParamValue::Int(default))
    }

    /// Declares a boolean parameter.
    pub fn boolean(name: &str, default: bool) -> Self {
        Self::new(name, ParamValue::Bool(default))
    }

    /// Declares a free-text parameter.
    pub fn text(name: &str, default: &str) -> Self {
        Self::new(name, ParamValue::Str(default.to_string()))
    }

    /// Declares a float-list parameter.
    pub fn float_list(name: &str, default: Vec<f64>) -> Self {
        Self::new(name, ParamValue::FloatList(default))
    }

    /// Declares a choice parameter; its family is taken from `default`.
    pub fn choice(name: &str, default: Choice) -> Self {
        Self::new(name, ParamValue::Choice(default))
    }

    /// Sets an inclusive float range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.bounds = Bounds::Range { min, max };
        self
    }

    /// Sets an inclusive integer range.
    pub fn with_allowed(mut self, min: i64, max: i64) -> Self {
        self.bounds = Bounds::IntRange { min, max };
        self
    }

    /// Sets unit metadata.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Sets the help text.
    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    /// Overrides the rejection message.
    pub fn with_err_message(mut self, message: &str) -> Self {
        self.err_message = message.to_string();
        self
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns the current value.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Returns the declared kind.
    pub fn kind(&self) -> ValueKind {
        self.default_value.kind()
    }

    /// Replaces the value, rejecting values of a different kind.
    ///
    /// Flags are left as they are; callers decide what the write means.
    pub fn set_value(&mut self, value: ParamValue) -> Result<(), ParamError> {
        check_kind(&self.name, self.kind(), &value)?;
        self.value = value;
        Ok(())
    }

    /// Feeds a value computed by an upstream stage into this input.
    pub fn pipe(&mut self, value: ParamValue) -> Result<(), ParamError> {
        self.set_value(value)?;
        self.provided = true;
        self.valid = true;
        Ok(())
    }
}

/// A value computed by a domain object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputParameter {
    /// Unique name within the owning set.
    pub name: String,
    value: ParamValue,
    /// Help text.
    pub tooltip: String,
    /// Unit metadata.
    pub units: Units,
}

impl OutputParameter {
    fn new(name: &str, value: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            value,
            tooltip: String::new(),
            units: Units::none(),
        }
    }

    /// Declares a float output, initially zero.
    pub fn float(name: &str) -> Self {
        Self::new(name, ParamValue::Float(0.0))
    }

    /// Declares a float-list output, initially empty.
    pub fn float_list(name: &str) -> Self {
        Self::new(name, ParamValue::FloatList(Vec::new()))
    }

    /// Declares an integer output, initially zero.
    pub fn int(name: &str) -> Self {
        Self::new(name, ParamValue::Int(0))
    }

    /// Declares a boolean output, initially false.
    pub fn boolean(name: &str) -> Self {
        Self::new(name, ParamValue::Bool(false))
    }

    /// Declares a text output, initially empty.
    pub fn text(name: &str) -> Self {
        Self::new(name, ParamValue::Str(String::new()))
    }

    /// Sets unit metadata.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Sets the help text.
    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    /// Returns the current value.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Returns the declared kind.
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Replaces the value, rejecting values of a different kind.
    pub fn set(&mut self, value: ParamValue) -> Result<(), ParamError> {
        check_kind(&self.name, self.kind(), &value)?;
        self.value = value;
        Ok(())
    }
}

fn check_kind(name: &str, expected: ValueKind, value: &ParamValue) -> Result<(), ParamError> {
    let found = value.kind();
    if found == expected {
        Ok(())
    } else {
        Err(ParamError::KindMismatch {
            name: name.to_string(),
            expected,
            found,
        })
    }
}
