use crate::common::*;
use crate::roll::Number;
use serde::Serialize;
use std::fmt;

/// A value flowing through a script.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Number(Number),
    String(String),
    Boolean(bool),
    Undefined,
}

impl Value {
    /// Nonzero numbers, non-empty strings and `true` are truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Number(x) => !x.is_zero(),
            Self::String(s) => !s.is_empty(),
            Self::Boolean(b) => *b,
            Self::Undefined => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Undefined => "undefined",
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => fmt::Display::fmt(x, f),
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => fmt::Display::fmt(b, f),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

impl From<Number> for Value {
    fn from(x: Number) -> Self {
        Self::Number(x)
    }
}

impl From<Int> for Value {
    fn from(x: Int) -> Self {
        Self::Number(x.into())
    }
}

impl From<Float> for Value {
    fn from(x: Float) -> Self {
        Self::Number(x.into())
    }
}

impl From<bool> for Value {
    fn from(x: bool) -> Self {
        Self::Boolean(x)
    }
}

impl From<String> for Value {
    fn from(x: String) -> Self {
        Self::String(x)
    }
}

impl From<&str> for Value {
    fn from(x: &str) -> Self {
        Self::String(x.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::from(3).truthy());
        assert!(!Value::from(0).truthy());
        assert!(!Value::from(0.0).truthy());
        assert!(Value::from("x").truthy());
        assert!(!Value::from("").truthy());
        assert!(!Value::Undefined.truthy());
    }

    #[test]
    fn test_equality_does_not_coerce() {
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::from(1), Value::from(true));
        assert_eq!(Value::from(2), Value::from(2.0));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(Value::from(3)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "number", "value": 3}));
        let json = serde_json::to_value(Value::Undefined).unwrap();
        assert_eq!(json, serde_json::json!({"type": "undefined"}));
    }
}
