use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A loosely-typed cell value as emitted by the recognition model.
///
/// Handwritten forms come back with numbers where text is expected and
/// text where numbers are expected, so every record field tolerates both.
/// The `Other` variant absorbs anything outside the expected shapes and
/// is carried through the pipeline untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl Scalar {
    /// Numeric coercion: integers and floats directly, text by parsing.
    /// Anything else is non-numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
            Scalar::Other(_) => None,
        }
    }

    /// Truthiness of a cell: zero, empty text, null, `false` and empty
    /// containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Int(n) => *n != 0,
            Scalar::Float(n) => *n != 0.0,
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Other(Value::Null) => false,
            Scalar::Other(Value::Bool(b)) => *b,
            Scalar::Other(Value::Array(items)) => !items.is_empty(),
            Scalar::Other(Value::Object(map)) => !map.is_empty(),
            Scalar::Other(_) => true,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Text(s) => write!(f, "{s}"),
            Scalar::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}
