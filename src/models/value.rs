//! Record values and the open-ended record type.
//!
//! Records arrive as arbitrary JSON objects; every field value is one of a
//! small set of scalar shapes. Representing them as a tagged union lets the
//! engines type-check field access at the boundary instead of relying on
//! runtime shape assumptions.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single field value on a record.
///
/// Deserialized untagged, so plain JSON scalars map directly onto the
/// variants. Anything a record may carry that is not a scalar (nested
/// objects, arrays) is rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Strict boolean coercion: native booleans plus the literal strings
    /// `"true"` and `"false"`. Anything else is not a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Text(s) if s == "true" => Some(true),
            Value::Text(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose truthiness for values that failed strict boolean coercion:
    /// null is false, numbers are true unless zero or NaN, strings are true
    /// unless empty.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Boolean coercion used by the boolean filter predicate: strict literal
    /// coercion first, truthiness otherwise. An absent field coerces to
    /// false via [`Value::Null`].
    pub fn coerce_bool(&self) -> bool {
        self.as_bool().unwrap_or_else(|| self.truthy())
    }
}

impl fmt::Display for Value {
    /// String form used for group keys, categorical lookups and labels.
    /// Integral numbers print without a fractional part, matching the
    /// stringification the config documents were written against.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl Value {
    /// Convert a raw JSON value into a record value. Non-scalar shapes are
    /// rejected; callers treat them as absent.
    pub fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            _ => None,
        }
    }
}

/// One input data item with arbitrary named fields.
///
/// Records are immutable from the engine's perspective and are wholesale
/// replaced on every refresh, never patched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub HashMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Record(HashMap::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Field access that folds absence into [`Value::Null`], which is how
    /// every predicate treats a missing field.
    pub fn get_or_null(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.0.get(field).unwrap_or(&NULL)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Record(iter.into_iter().collect())
    }
}
