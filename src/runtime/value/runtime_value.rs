//! Dynamic value type exchanged with policy scripts
//!
//! `Value` is the host-side mirror of whatever the embedded runtime hands
//! back. Script values are duck-typed; on this side they are narrowed to a
//! closed set of tags so the marshallers can match exhaustively:
//! - `Null` is the runtime's null-equivalent (explicit clear/unset)
//! - `Int` is signed 64-bit; unsigned record fields are wrapped per width
//! - `Mapping` is insertion-ordered so iteration order is reproducible

use std::fmt;

use indexmap::IndexMap;

/// Insertion-ordered string-keyed mapping
pub type Mapping = IndexMap<String, Value>;

/// Value tag, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Text,
    Sequence,
    Mapping,
}

impl ValueType {
    /// Name as reported in logs
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Text => "text",
            ValueType::Sequence => "sequence",
            ValueType::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dynamic value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Null-equivalent
    #[default]
    Null,

    /// Boolean
    Bool(bool),

    /// Integer
    Int(i64),

    /// Owned text
    Text(String),

    /// Ordered, finite sequence
    Sequence(Vec<Value>),

    /// Ordered mapping from text keys
    Mapping(Mapping),
}

// ============================================================================
// Type Query Methods
// ============================================================================

impl Value {
    /// Get the tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Text(_) => ValueType::Text,
            Value::Sequence(_) => ValueType::Sequence,
            Value::Mapping(_) => ValueType::Mapping,
        }
    }

    /// Tag name, for log messages
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness: null, `false`, `0`, empty text and empty collections are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Text(s) => !s.is_empty(),
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(map) => !map.is_empty(),
        }
    }

    /// Convert to bool
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to i64
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as mapping
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Mutably borrow as mapping
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Take the mapping out, if this is one
    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Textual representation, as a script would print it
    ///
    /// Text is returned without quoting; null is the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
            Value::Sequence(items) => {
                write!(
                    f,
                    "[{}]",
                    items
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Mapping(map) => {
                write!(
                    f,
                    "#{{{}}}",
                    map.iter()
                        .map(|(k, v)| format!("{:?}: {}", k, v))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}
