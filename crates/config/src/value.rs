//! Configuration scalar values and type coercion.
//!
//! Responsibilities:
//! - Define the scalar [`Value`] type every provider and the container trade in.
//! - Implement the fixed coercion chain for environment values:
//!   integer -> float -> boolean -> string, in exactly that order.
//! - Provide [`str_to_bool`] with the accepted truth-token sets.
//!
//! Invariants:
//! - The coercion order is a semantic contract: `"42"` becomes an integer,
//!   never a float or string; `"2.3"` a float; `"True"`/`"on"` a boolean.
//!   Downstream code assumes the priority int > float > bool > string.
//! - A token outside both boolean sets is a coercion failure consumed by the
//!   chain (falls through to string), never surfaced to the caller.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat mapping exchanged between providers, sources and the container.
pub type ConfigMap = HashMap<String, Value>;

/// A configuration scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Raised when a string matches neither truth-token set.
///
/// Inside the coercion chain this is an internal signal; the chain catches
/// it and keeps the value as a string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid truth value {0}")]
pub struct InvalidTruthValue(pub String);

/// Parse a boolean from its accepted spellings, case-insensitively.
pub fn str_to_bool(val: &str) -> Result<bool, InvalidTruthValue> {
    match val.to_ascii_lowercase().as_str() {
        "y" | "yes" | "yep" | "yup" | "t" | "true" | "on" | "enable" | "enabled" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "disable" | "disabled" | "0" => Ok(false),
        _ => Err(InvalidTruthValue(val.to_string())),
    }
}

impl Value {
    /// Coerce a raw string through the fixed chain.
    ///
    /// Boolean-like strings such as `"on"` become `Bool` here and are
    /// indistinguishable from an intentional string `"on"`; this ambiguity
    /// is inherited behavior and deliberately not resolved.
    pub fn coerce(raw: &str) -> Value {
        if let Ok(int) = raw.parse::<i64>() {
            return Value::Int(int);
        }
        if let Ok(float) = raw.parse::<f64>() {
            return Value::Float(float);
        }
        match str_to_bool(raw) {
            Ok(flag) => Value::Bool(flag),
            Err(_) => Value::Str(raw.to_string()),
        }
    }

    /// Truthiness for config-script conditions: `None` and zero/empty values
    /// are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(flag) => *flag,
            Value::Int(int) => *int != 0,
            Value::Float(float) => *float != 0.0,
            Value::Str(text) => !text.is_empty(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(float) => Some(*float),
            Value::Int(int) => Some(*int as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Int(int) => write!(f, "{int}"),
            Value::Float(float) => write!(f, "{float}"),
            Value::Str(text) => f.write_str(text),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

impl From<i32> for Value {
    fn from(int: i32) -> Self {
        Value::Int(int.into())
    }
}

impl From<f64> for Value {
    fn from(float: f64) -> Self {
        Value::Float(float)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Str(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Str(text)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::None)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Value::Str(text) if text == other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(int) if int == other)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Value::Float(float) if float == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Value::Bool(flag) if flag == other)
    }
}
