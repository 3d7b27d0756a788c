//! Dynamically-typed cell and bind-variable values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single cell, bind variable, or value specification.
///
/// This is the closed set of shapes the wire format can carry. Value
/// specifications reuse it: a `Text` starting with `:` names a bind
/// variable, a `List` carries one entry per row, and `Absent` marks a
/// cell with no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Absent,
}

/// Named bind variables supplied with a query.
pub type BindVars = BTreeMap<String, Value>;

/// One row of resolved cells, aligned to the originating spec's columns.
pub type Row = Vec<Value>;

impl Value {
    /// Short name of the runtime type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Absent => "absent",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Raw bytes of a textual value (`Text` or `Bytes`).
    pub fn as_text_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(s) => Some(s.as_bytes()),
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Bind-variable name when this is a `:name` reference.
    ///
    /// Only `Text` values are references; byte strings are always literals.
    pub fn as_bind_ref(&self) -> Option<&str> {
        match self {
            Value::Text(s) => s.strip_prefix(':'),
            _ => None,
        }
    }

    /// Build a `:name` bind-variable reference.
    pub fn bind_ref(name: &str) -> Self {
        Value::Text(format!(":{}", name))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(u64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_ref_only_for_text() {
        assert_eq!(Value::from(":uid").as_bind_ref(), Some("uid"));
        assert_eq!(Value::bind_ref("amount").as_bind_ref(), Some("amount"));
        assert_eq!(Value::from(&b":uid"[..]).as_bind_ref(), None);
        assert_eq!(Value::from("uid").as_bind_ref(), None);
    }

    #[test]
    fn test_empty_text_is_literal() {
        assert_eq!(Value::from("").as_bind_ref(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Absent);
        assert_eq!(Value::from(Some(7i64)), Value::Int(7));
    }

    #[test]
    fn test_text_bytes_view() {
        assert_eq!(Value::from("ab").as_text_bytes(), Some(&b"ab"[..]));
        assert_eq!(Value::from(vec![0u8, 1]).as_text_bytes(), Some(&[0u8, 1][..]));
        assert_eq!(Value::Int(1).as_text_bytes(), None);
    }
}
