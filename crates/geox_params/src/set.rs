//! Name-keyed parameter collections.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::choice::Choice;
use crate::error::ParamError;
use crate::parameter::{OutputParameter, Parameter};
use crate::value::{ParamValue, ValueKind};

/// Common view over input and output parameters.
pub trait Named {
    /// The parameter's unique name.
    fn name(&self) -> &str;
    /// The parameter's current value.
    fn value(&self) -> &ParamValue;
}

impl Named for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &ParamValue {
        Parameter::value(self)
    }
}

impl Named for OutputParameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &ParamValue {
        OutputParameter::value(self)
    }
}

/// A set of uniquely named parameters, iterated in name order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet<P> {
    entries: BTreeMap<String, P>,
}

/// The inputs of a domain object.
pub type InputSet = ParameterSet<Parameter>;

/// The outputs of a domain object.
pub type OutputSet = ParameterSet<OutputParameter>;

impl<P> Default for ParameterSet<P> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<P: Named> ParameterSet<P> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, returning any previous one with the same name.
    pub fn insert(&mut self, param: P) -> Option<P> {
        self.entries.insert(param.name().to_string(), param)
    }

    /// Returns the parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&P> {
        self.entries.get(name)
    }

    /// Returns the parameter called `name` mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut P> {
        self.entries.get_mut(name)
    }

    /// Returns `true` if a parameter called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.entries.values()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value of `name`, or `Unknown`.
    pub fn value_of(&self, name: &str) -> Result<&ParamValue, ParamError> {
        self.get(name)
            .map(Named::value)
            .ok_or_else(|| ParamError::Unknown {
                name: name.to_string(),
            })
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        requested: ValueKind,
        extract: impl FnOnce(&'a ParamValue) -> Option<T>,
    ) -> Result<T, ParamError> {
        let value = self.value_of(name)?;
        extract(value).ok_or_else(|| ParamError::KindMismatch {
            name: name.to_string(),
            expected: value.kind(),
            found: requested,
        })
    }

    /// Reads a float value.
    pub fn float(&self, name: &str) -> Result<f64, ParamError> {
        self.typed(name, ValueKind::Float, ParamValue::as_float)
    }

    /// Reads an integer value.
    pub fn int(&self, name: &str) -> Result<i64, ParamError> {
        self.typed(name, ValueKind::Int, ParamValue::as_int)
    }

    /// Reads a boolean value.
    pub fn boolean(&self, name: &str) -> Result<bool, ParamError> {
        self.typed(name, ValueKind::Bool, ParamValue::as_bool)
    }

    /// Reads a text value.
    pub fn text(&self, name: &str) -> Result<&str, ParamError> {
        self.typed(name, ValueKind::Str, ParamValue::as_str)
    }

    /// Reads a float-list value.
    pub fn float_list(&self, name: &str) -> Result<&[f64], ParamError> {
        self.typed(name, ValueKind::FloatList, ParamValue::as_float_list)
    }

    /// Reads a choice value.
    pub fn choice(&self, name: &str) -> Result<Choice, ParamError> {
        let value = self.value_of(name)?;
        value.as_choice().ok_or_else(|| ParamError::NotAChoice {
            name: name.to_string(),
            found: value.kind(),
        })
    }
}

impl ParameterSet<OutputParameter> {
    /// Sets the value of output `name`.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        self.get_mut(name)
            .ok_or_else(|| ParamError::Unknown {
                name: name.to_string(),
            })?
            .set(value)
    }
}

impl<P: Named> FromIterator<P> for ParameterSet<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = Self::new();
        for param in iter {
            set.insert(param);
        }
        set
    }
}

impl<P: Named + Serialize> Serialize for ParameterSet<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, param) in &self.entries {
            map.serialize_entry(name, param)?;
        }
        map.end()
    }
}
