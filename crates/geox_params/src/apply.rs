//! Applying user-supplied text values to input parameters.
//!
//! Text is parsed according to the parameter's declared kind, checked against
//! its bounds and only then written. A rejected value leaves the parameter
//! exactly as it was.

use crate::choice::Choice;
use crate::error::ParamError;
use crate::parameter::Parameter;
use crate::set::InputSet;
use crate::value::{ParamValue, ValueKind};

/// Result of applying one user value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The value was written and the parameter marked provided and valid.
    Applied,
    /// The value equals the current value; nothing was changed.
    Unchanged,
    /// The value lies outside the parameter's bounds; nothing was changed.
    OutOfRange,
}

/// One user input line: the value text and an optional free-text comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputEntry {
    /// Value text, parsed per the target parameter's kind.
    pub value: String,
    /// Comment kept alongside the value; empty when none was given.
    pub comment: String,
}

impl InputEntry {
    /// An entry with no comment.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            comment: String::new(),
        }
    }

    /// Attaches a comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl From<&str> for InputEntry {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Parameter {
    /// Applies an input entry, recording its comment only when the value
    /// was actually written.
    pub fn apply_entry(&mut self, entry: &InputEntry) -> Result<ApplyOutcome, ParamError> {
        let outcome = self.apply_text(&entry.value)?;
        if outcome == ApplyOutcome::Applied {
            self.input_comment = entry.comment.trim().to_string();
        }
        Ok(outcome)
    }

    /// Parses `text` as this parameter's kind and applies it.
    ///
    /// Numeric text may carry a trailing unit suffix separated by whitespace,
    /// which must equal the parameter's current units.
    pub fn apply_text(&mut self, text: &str) -> Result<ApplyOutcome, ParamError> {
        let parsed = self.parse_text(text)?;
        if parsed == *self.value() {
            return Ok(ApplyOutcome::Unchanged);
        }
        if !self.bounds.admits(&parsed) {
            return Ok(ApplyOutcome::OutOfRange);
        }
        self.pipe(parsed)?;
        Ok(ApplyOutcome::Applied)
    }

    fn parse_text(&self, text: &str) -> Result<ParamValue, ParamError> {
        let text = text.trim();
        let kind = self.kind();
        let body = match kind {
            ValueKind::Int | ValueKind::Float | ValueKind::FloatList => self.strip_units(text)?,
            _ => text,
        };
        let parse_err = || ParamError::Parse {
            name: self.name.clone(),
            text: text.to_string(),
            expected: kind,
        };
        match kind {
            ValueKind::Bool => parse_bool(body).map(ParamValue::Bool).ok_or_else(parse_err),
            ValueKind::Int => parse_int(body).map(ParamValue::Int).ok_or_else(parse_err),
            ValueKind::Float => body
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|_| parse_err()),
            ValueKind::Str => Ok(ParamValue::Str(body.to_string())),
            ValueKind::FloatList => body
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| item.parse::<f64>().ok())
                .collect::<Option<Vec<f64>>>()
                .map(ParamValue::FloatList)
                .ok_or_else(parse_err),
            ValueKind::Choice(family) => Choice::parse(family, body)
                .map(ParamValue::Choice)
                .ok_or_else(|| ParamError::UnknownChoice {
                    family,
                    text: body.to_string(),
                }),
        }
    }

    /// Splits off and checks a trailing unit suffix.
    fn strip_units<'t>(&self, text: &'t str) -> Result<&'t str, ParamError> {
        let Some((body, suffix)) = text.rsplit_once(char::is_whitespace) else {
            return Ok(text);
        };
        let looks_like_unit = suffix
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '%' || c == '$');
        if !looks_like_unit || suffix.eq_ignore_ascii_case("nan") || suffix.eq_ignore_ascii_case("inf") {
            return Ok(text);
        }
        if suffix != self.units.current {
            return Err(ParamError::UnitsMismatch {
                name: self.name.clone(),
                current: self.units.current.clone(),
                given: suffix.to_string(),
            });
        }
        Ok(body.trim_end())
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_int(text: &str) -> Option<i64> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(i);
    }
    let x = text.parse::<f64>().ok()?;
    (x.is_finite() && x.fract() == 0.0).then_some(x as i64)
}

impl InputSet {
    /// Applies `text` to the input called `name`.
    pub fn apply(&mut self, name: &str, text: &str) -> Result<ApplyOutcome, ParamError> {
        self.get_mut(name)
            .ok_or_else(|| ParamError::Unknown {
                name: name.to_string(),
            })?
            .apply_text(text)
    }

    /// Feeds an upstream value into the input called `name`.
    pub fn pipe(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        self.get_mut(name)
            .ok_or_else(|| ParamError::Unknown {
                name: name.to_string(),
            })?
            .pipe(value)
    }
}
