//! Conversion between attribute maps and plain mappings
//!
//! Plain nested mappings arrive as [`serde_json::Value`] trees and are
//! deep-converted: every object (including objects nested inside arrays)
//! becomes an [`AttrMap`], and every key is already a string. The inverse
//! conversion unwraps nested maps back to plain objects and is exact:
//! converting a tree in and out yields an equal tree.
//!
//! The manual [`Serialize`]/[`Deserialize`] impls make `AttrMap` usable
//! with any serde format, not just JSON.

use std::fmt;
use std::sync::Arc;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

use crate::error::MapError;
use crate::map::{AttrMap, DefaultSupplier};
use crate::value::{Value, ValueKind};

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(arr) => Value::Sequence(arr.into_iter().map(Value::from).collect()),
            JsonValue::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Number(n) => JsonValue::Number(n),
            Value::String(s) => JsonValue::String(s),
            Value::Sequence(seq) => {
                JsonValue::Array(seq.into_iter().map(JsonValue::from).collect())
            }
            Value::Map(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<JsonValue> for AttrMap {
    type Error = MapError;

    /// Deep-convert a plain mapping; the top level must be an object
    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        match json {
            JsonValue::Object(obj) => Ok(obj
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect()),
            other => Err(MapError::NotAMapping {
                kind: json_kind(&other),
            }),
        }
    }
}

impl From<AttrMap> for JsonValue {
    #[inline]
    fn from(map: AttrMap) -> Self {
        JsonValue::from(Value::Map(map))
    }
}

impl AttrMap {
    /// Recursively unwrap to a plain mapping
    ///
    /// Exact inverse of [`TryFrom<JsonValue>`]: converting in and back
    /// out yields an equal tree. The default supplier does not survive
    /// the round trip.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::from(self.clone())
    }

    /// Deep-convert a plain mapping, with every nested map inheriting
    /// the given default supplier
    ///
    /// # Errors
    /// Returns [`MapError::NotAMapping`] if `json` is not an object.
    pub fn from_json_with_default<F>(json: JsonValue, supplier: F) -> Result<Self, MapError>
    where
        F: Fn(&AttrMap, &str) -> Value + Send + Sync + 'static,
    {
        let mut map = Self::try_from(json)?;
        let supplier: DefaultSupplier = Arc::new(supplier);
        map.adopt_default(&supplier);
        Ok(map)
    }
}

/// Kind of a plain JSON value, for conversion errors
fn json_kind(json: &JsonValue) -> ValueKind {
    match json {
        JsonValue::Null => ValueKind::Null,
        JsonValue::Bool(_) => ValueKind::Bool,
        JsonValue::Number(_) => ValueKind::Number,
        JsonValue::String(_) => ValueKind::String,
        JsonValue::Array(_) => ValueKind::Sequence,
        JsonValue::Object(_) => ValueKind::Map,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(seq) => seq.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for AttrMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            state.serialize_entry(key, value)?;
        }
        state.end()
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any attribute map value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(Number::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut seq = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(value) = access.next_element::<Value>()? {
            seq.push(value);
        }
        Ok(Value::Sequence(seq))
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Value, A::Error> {
        collect_map(access).map(Value::Map)
    }
}

struct AttrMapVisitor;

impl<'de> Visitor<'de> for AttrMapVisitor {
    type Value = AttrMap;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an attribute map")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<AttrMap, A::Error> {
        collect_map(access)
    }
}

fn collect_map<'de, A: MapAccess<'de>>(mut access: A) -> Result<AttrMap, A::Error> {
    let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
    while let Some(entry) = access.next_entry::<String, Value>()? {
        entries.push(entry);
    }
    Ok(entries.into_iter().collect())
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for AttrMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AttrMapVisitor)
    }
}
