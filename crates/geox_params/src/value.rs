//! Parameter values, their kinds, and the JSON value codec.
//!
//! The persisted form of a value is plain JSON: booleans, integers, strings and
//! float lists map natively. Floats use JSON numbers except for non-finite
//! values, which are written as the strings `"NaN"`, `"inf"` and `"-inf"` so
//! that an undefined result (an IRR with no root, say) still round-trips.
//! Choices are written as `Family:Member` tags.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::choice::{Choice, ChoiceFamily};

/// The value held by a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// Free text.
    Str(String),
    /// A list of floats (time series, per-year values).
    FloatList(Vec<f64>),
    /// A member of a closed choice family.
    Choice(Choice),
}

/// The declared kind of a parameter's value.
///
/// Kinds are fixed when a parameter is declared and act as the decoding schema
/// for persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    /// [`ParamValue::Bool`].
    Bool,
    /// [`ParamValue::Int`].
    Int,
    /// [`ParamValue::Float`].
    Float,
    /// [`ParamValue::Str`].
    Str,
    /// [`ParamValue::FloatList`].
    FloatList,
    /// [`ParamValue::Choice`] restricted to one family.
    Choice(ChoiceFamily),
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Int => f.write_str("int"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Str => f.write_str("string"),
            ValueKind::FloatList => f.write_str("float list"),
            ValueKind::Choice(family) => write!(f, "choice of {family}"),
        }
    }
}

/// A persisted value that does not fit the declared kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("expected {expected}, found {found}")]
pub struct CoerceError {
    /// The kind the schema declared.
    pub expected: ValueKind,
    /// A short rendering of the offending JSON value.
    pub found: String,
}

impl ParamValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            ParamValue::Bool(_) => ValueKind::Bool,
            ParamValue::Int(_) => ValueKind::Int,
            ParamValue::Float(_) => ValueKind::Float,
            ParamValue::Str(_) => ValueKind::Str,
            ParamValue::FloatList(_) => ValueKind::FloatList,
            ParamValue::Choice(c) => ValueKind::Choice(c.family()),
        }
    }

    /// Returns the boolean, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the text, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list, if this is a `FloatList`.
    pub fn as_float_list(&self) -> Option<&[f64]> {
        match self {
            ParamValue::FloatList(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the choice, if this is a `Choice`.
    pub fn as_choice(&self) -> Option<Choice> {
        match self {
            ParamValue::Choice(c) => Some(*c),
            _ => None,
        }
    }

    /// Compares two values, treating floats within `tolerance` (relative to
    /// the larger magnitude, or absolute near zero) and NaN == NaN as equal.
    pub fn approx_eq(&self, other: &ParamValue, tolerance: f64) -> bool {
        match (self, other) {
            (ParamValue::Float(a), ParamValue::Float(b)) => floats_close(*a, *b, tolerance),
            (ParamValue::FloatList(a), ParamValue::FloatList(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| floats_close(*x, *y, tolerance))
            }
            _ => self == other,
        }
    }
}

fn floats_close(a: f64, b: f64, tolerance: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tolerance * scale
}

/// Serializes one float, spelling non-finite values as strings.
fn serialize_float<S: Serializer>(x: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if x.is_finite() {
        serializer.serialize_f64(x)
    } else if x.is_nan() {
        serializer.serialize_str("NaN")
    } else if x > 0.0 {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_str("-inf")
    }
}

struct FloatElem(f64);

impl Serialize for FloatElem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_float(self.0, serializer)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::Int(i) => serializer.serialize_i64(*i),
            ParamValue::Float(x) => serialize_float(*x, serializer),
            ParamValue::Str(s) => serializer.serialize_str(s),
            ParamValue::FloatList(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for x in v {
                    seq.serialize_element(&FloatElem(*x))?;
                }
                seq.end()
            }
            ParamValue::Choice(c) => serializer.serialize_str(&c.tag()),
        }
    }
}

impl ValueKind {
    /// Decodes a persisted JSON value as this kind.
    ///
    /// Integers are accepted where floats are expected; integral floats are
    /// accepted where integers are expected. Nothing else is coerced.
    pub fn decode_json(self, raw: &serde_json::Value) -> Result<ParamValue, CoerceError> {
        let fail = || CoerceError {
            expected: self,
            found: abbreviate(raw),
        };
        match self {
            ValueKind::Bool => raw.as_bool().map(ParamValue::Bool).ok_or_else(fail),
            ValueKind::Int => decode_int(raw).map(ParamValue::Int).ok_or_else(fail),
            ValueKind::Float => decode_float(raw).map(ParamValue::Float).ok_or_else(fail),
            ValueKind::Str => raw
                .as_str()
                .map(|s| ParamValue::Str(s.to_string()))
                .ok_or_else(fail),
            ValueKind::FloatList => {
                let items = raw.as_array().ok_or_else(fail)?;
                items
                    .iter()
                    .map(decode_float)
                    .collect::<Option<Vec<f64>>>()
                    .map(ParamValue::FloatList)
                    .ok_or_else(fail)
            }
            ValueKind::Choice(family) => raw
                .as_str()
                .and_then(|tag| Choice::from_tag(family, tag))
                .map(ParamValue::Choice)
                .ok_or_else(fail),
        }
    }
}

fn decode_int(raw: &serde_json::Value) -> Option<i64> {
    if let Some(i) = raw.as_i64() {
        return Some(i);
    }
    let x = raw.as_f64()?;
    if x.fract() == 0.0 && x >= i64::MIN as f64 && x <= i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

fn decode_float(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "inf" => Some(f64::INFINITY),
            "-inf" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn abbreviate(raw: &serde_json::Value) -> String {
    let mut s = raw.to_string();
    if s.len() > 40 {
        let mut cut = 40;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("...");
    }
    s
}
