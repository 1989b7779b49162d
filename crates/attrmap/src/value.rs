//! Dynamic values stored in an attribute map
//!
//! [`Value`] is the closed set of things an [`AttrMap`](crate::AttrMap)
//! entry can hold: scalars, sequences, and nested maps. Nested mappings
//! are always represented as `Value::Map`, never as raw JSON objects, so
//! every branch of a converted tree answers the full map API.

use serde_json::Number;

use crate::map::AttrMap;

/// A value held by an attribute map entry
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit no-value; distinguishable from an absent key
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar (integer or float, JSON semantics)
    Number(Number),
    /// String scalar
    String(String),
    /// Ordered sequence of values
    Sequence(Vec<Value>),
    /// Nested attribute map
    Map(AttrMap),
}

/// Coarse classification of a [`Value`], used in errors and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Null`]
    Null,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Number`]
    Number,
    /// [`Value::String`]
    String,
    /// [`Value::Sequence`]
    Sequence,
    /// [`Value::Map`]
    Map,
}

impl Value {
    /// Kind of this value
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Map(_) => ValueKind::Map,
        }
    }

    /// True for [`Value::Null`]
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Boolean payload, if this is a bool
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if this is a number representable as `i64`
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Float payload, if this is a number
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// String payload, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Sequence payload, if this is a sequence
    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Nested map, if this is a map
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&AttrMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Mutable nested map, if this is a map
    #[inline]
    #[must_use]
    pub fn as_map_mut(&mut self) -> Option<&mut AttrMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Map => "map",
        };
        f.write_str(name)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    #[inline]
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u32> for Value {
    #[inline]
    fn from(n: u32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON number form and become `Null`
    #[inline]
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<Number> for Value {
    #[inline]
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    #[inline]
    fn from(seq: Vec<Value>) -> Self {
        Value::Sequence(seq)
    }
}

impl From<AttrMap> for Value {
    #[inline]
    fn from(map: AttrMap) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Sequence(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_reporting() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(true).kind(), ValueKind::Bool);
        assert_eq!(Value::from(1i64).kind(), ValueKind::Number);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::from(vec![Value::Null]).kind(), ValueKind::Sequence);
        assert_eq!(Value::from(AttrMap::new()).kind(), ValueKind::Map);
    }

    #[test]
    fn scalar_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(42i64).as_i64(), Some(42));
        assert_eq!(Value::from(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::Null.as_str(), None);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert!(Value::from(f64::NAN).is_null());
        assert!(Value::from(f64::INFINITY).is_null());
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3i64)), Value::from(3i64));
    }

    #[test]
    fn collect_into_sequence() {
        let seq: Value = [1i64, 2, 3].into_iter().collect();
        assert_eq!(
            seq.as_sequence().map(<[Value]>::len),
            Some(3)
        );
    }
}
