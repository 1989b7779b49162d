//! The attribute map core
//!
//! [`AttrMap`] stores normalized string keys mapped to dynamic
//! [`Value`]s, in insertion order. Nested mappings are themselves
//! `AttrMap`s, so a converted JSON tree answers the same API at every
//! level. An optional per-instance default supplier produces substitute
//! values for confirmed-absent keys and is inherited by nested maps
//! created through conversion, never through ambient global state.

use std::fmt;
use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::MapError;
use crate::key::AsMapKey;
use crate::value::Value;

/// Caller-provided function invoked on confirmed key absence
///
/// Receives the map and the normalized key, and produces the substitute
/// value. It is never invoked for stored keys, including keys storing an
/// explicit [`Value::Null`], and it must not mutate the map (it only
/// receives a shared reference).
pub type DefaultSupplier = Arc<dyn Fn(&AttrMap, &str) -> Value + Send + Sync>;

/// Ordered map from normalized string keys to dynamic values
///
/// All key forms with a string representation address the same entry
/// after normalization ("indifferent access"): string slices, owned
/// strings, [`Symbol`](crate::Symbol)s, integers, and string- or
/// number-valued [`Value`]s.
///
/// # Example
/// ```
/// use attrmap::{AttrMap, Value};
/// use serde_json::json;
///
/// let mut map = AttrMap::try_from(json!({
///     "name": "deploy",
///     "limits": { "cpu": 2 },
/// }))
/// .unwrap();
///
/// assert_eq!(map.get("name"), Some(&Value::from("deploy")));
///
/// // Nested objects arrive as maps, not raw JSON.
/// let limits = map.get("limits").and_then(Value::as_map).unwrap();
/// assert_eq!(limits.get("cpu").and_then(Value::as_i64), Some(2));
///
/// map.set("retries", 3i64).unwrap();
/// assert!(map.has("retries"));
/// ```
#[derive(Clone, Default)]
pub struct AttrMap {
    entries: IndexMap<String, Value>,
    default: Option<DefaultSupplier>,
}

impl AttrMap {
    /// Create an empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with a default supplier
    ///
    /// The supplier is invoked by [`get_or_default`](Self::get_or_default)
    /// and by accessor dispatch rule 5 on confirmed absence, and is
    /// inherited by nested maps created through conversion.
    ///
    /// # Example
    /// ```
    /// use attrmap::{AttrMap, Value};
    ///
    /// let map = AttrMap::with_default(|_, _| Value::Sequence(Vec::new()));
    /// assert_eq!(map.get_or_default("anything"), Some(Value::Sequence(Vec::new())));
    /// assert!(!map.has("anything"));
    /// ```
    #[must_use]
    pub fn with_default<F>(supplier: F) -> Self
    where
        F: Fn(&AttrMap, &str) -> Value + Send + Sync + 'static,
    {
        Self {
            entries: IndexMap::new(),
            default: Some(Arc::new(supplier)),
        }
    }

    /// Whether a default supplier is configured
    #[inline]
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Get a stored value
    ///
    /// Consults stored entries only: a stored [`Value::Null`] returns
    /// `Some(&Value::Null)`, an absent key returns `None` even when a
    /// default supplier is configured. Dynamic keys with no string form
    /// read as absent; only [`set`](Self::set) reports them as errors.
    #[must_use]
    pub fn get<K: AsMapKey>(&self, key: K) -> Option<&Value> {
        let key = key.as_map_key().ok()?;
        self.entries.get(key.as_ref())
    }

    /// Get a mutable reference to a stored value
    #[must_use]
    pub fn get_mut<K: AsMapKey>(&mut self, key: K) -> Option<&mut Value> {
        let key = key.as_map_key().ok()?;
        self.entries.get_mut(key.as_ref())
    }

    /// Get a stored value, or the default-supplier result on confirmed
    /// absence
    ///
    /// A stored value, including an explicit [`Value::Null`], always
    /// wins over the supplier; "present but null" and "absent" are
    /// distinct states. Returns `None` only when the key is absent and no
    /// supplier is configured.
    #[must_use]
    pub fn get_or_default<K: AsMapKey>(&self, key: K) -> Option<Value> {
        let key = key.as_map_key().ok()?;
        if let Some(stored) = self.entries.get(key.as_ref()) {
            return Some(stored.clone());
        }
        self.default
            .as_ref()
            .map(|supplier| supplier(self, key.as_ref()))
    }

    /// Store a value under a normalized key, returning the prior value
    ///
    /// Nested maps inside `value` that lack a default supplier inherit
    /// this map's supplier. Storing under a key that collides with a
    /// structural method name is always permitted: the collision check
    /// only emits a `debug` event and never fails, no matter how often it
    /// fires for the same key.
    ///
    /// # Errors
    /// Returns [`MapError::InvalidKey`] if `key` is a dynamic value with
    /// no string form.
    pub fn set<K: AsMapKey>(
        &mut self,
        key: K,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, MapError> {
        let key = key.as_map_key()?.into_owned();
        let mut value = value.into();
        if let Some(supplier) = &self.default {
            value.adopt_default(supplier);
        }
        if Self::is_structural_capability(&key) {
            debug!(key = %key, "stored key shadows a structural method name");
        }
        Ok(self.entries.insert(key, value))
    }

    /// Whether a value is stored under this key
    ///
    /// Independent of the default supplier, and true for stored
    /// [`Value::Null`].
    #[must_use]
    pub fn has<K: AsMapKey>(&self, key: K) -> bool {
        key.as_map_key()
            .is_ok_and(|key| self.entries.contains_key(key.as_ref()))
    }

    /// Remove a stored value, returning it
    pub fn remove<K: AsMapKey>(&mut self, key: K) -> Option<Value> {
        let key = key.as_map_key().ok()?;
        self.entries.shift_remove(key.as_ref())
    }

    /// Number of stored entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries, keeping the default supplier
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Stored keys, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Stored values, in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Stored entries, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Stored entries with mutable values, in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Recursively merge another map into this one, consuming it
    ///
    /// For each of `other`'s entries: when both sides hold maps, they
    /// merge recursively; any other pairing is resolved by overwriting
    /// with `other`'s value. Values move (untouched branches are never
    /// re-converted or cloned), so time is linear in the entries touched.
    /// Type mismatches never fail.
    ///
    /// # Example
    /// ```
    /// use attrmap::AttrMap;
    /// use serde_json::json;
    ///
    /// let mut base = AttrMap::try_from(json!({"a": {"b": 1}})).unwrap();
    /// let overlay = AttrMap::try_from(json!({"a": {"c": 2}})).unwrap();
    /// base.deep_merge(overlay);
    ///
    /// assert_eq!(base, AttrMap::try_from(json!({"a": {"b": 1, "c": 2}})).unwrap());
    /// ```
    pub fn deep_merge(&mut self, other: AttrMap) {
        trace!(incoming = other.len(), "deep merge");
        for (key, incoming) in other.entries {
            match self.entries.entry(key) {
                Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                    (Value::Map(existing), Value::Map(incoming)) => {
                        existing.deep_merge(incoming);
                    }
                    (slot, incoming) => *slot = incoming,
                },
                Entry::Vacant(slot) => {
                    slot.insert(incoming);
                }
            }
        }
    }

    /// Clone-based convenience over [`deep_merge`](Self::deep_merge)
    #[must_use]
    pub fn deep_merged(&self, other: &AttrMap) -> AttrMap {
        let mut merged = self.clone();
        merged.deep_merge(other.clone());
        merged
    }

    /// Attach a supplier to this map and its descendants, unless one is
    /// already configured. A map carrying its own supplier keeps it, and
    /// its descendants already inherited that one.
    pub(crate) fn adopt_default(&mut self, supplier: &DefaultSupplier) {
        if self.default.is_some() {
            return;
        }
        self.default = Some(Arc::clone(supplier));
        for value in self.entries.values_mut() {
            value.adopt_default(supplier);
        }
    }

    /// The configured default supplier, if any
    pub(crate) fn default_supplier(&self) -> Option<&DefaultSupplier> {
        self.default.as_ref()
    }
}

impl Value {
    /// Recurse [`AttrMap::adopt_default`] through sequences and maps
    pub(crate) fn adopt_default(&mut self, supplier: &DefaultSupplier) {
        match self {
            Value::Map(map) => map.adopt_default(supplier),
            Value::Sequence(seq) => {
                for value in seq {
                    value.adopt_default(supplier);
                }
            }
            _ => {}
        }
    }
}

/// Equality compares normalized keys and values only, insensitive to
/// insertion order; the default supplier is excluded.
impl PartialEq for AttrMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for AttrMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            default: None,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for AttrMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            // Route through set so supplier adoption and shadow logging apply.
            let _ = self.set(key.into(), value);
        }
    }
}

impl IntoIterator for AttrMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttrMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Symbol;
    use serde_json::json;

    #[test]
    fn empty_map() {
        let map = AttrMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.get("anything"), None);
        assert!(!map.has("anything"));
    }

    #[test]
    fn indifferent_key_forms_address_one_entry() {
        let mut map = AttrMap::new();
        map.set(Symbol("p"), "test").unwrap();

        assert_eq!(map.get("p"), Some(&Value::from("test")));
        assert_eq!(map.get("p".to_string()), Some(&Value::from("test")));
        assert_eq!(map.get(Symbol("p")), Some(&Value::from("test")));
        assert_eq!(map.len(), 1);

        map.set(1u64, "one").unwrap();
        assert_eq!(map.get("1"), Some(&Value::from("one")));
    }

    #[test]
    fn stored_null_is_distinct_from_absent() {
        let mut map = AttrMap::with_default(|_, _| Value::from("default"));
        map.set("key", Value::Null).unwrap();

        assert!(map.has("key"));
        assert_eq!(map.get("key"), Some(&Value::Null));
        // Present-but-null wins over the supplier.
        assert_eq!(map.get_or_default("key"), Some(Value::Null));
        // Confirmed absence invokes the supplier.
        assert_eq!(map.get_or_default("missing"), Some(Value::from("default")));
        assert!(!map.has("missing"));
    }

    #[test]
    fn supplier_sees_map_and_key() {
        let map = AttrMap::with_default(|map, key| {
            Value::from(format!("{key}:{}", map.len()))
        });
        assert_eq!(map.get_or_default("k"), Some(Value::from("k:0")));
    }

    #[test]
    fn absent_without_supplier_is_none() {
        let map = AttrMap::new();
        assert_eq!(map.get_or_default("missing"), None);
    }

    #[test]
    fn invalid_dynamic_key_reads_as_absent_but_fails_set() {
        let mut map = AttrMap::new();
        let bad = Value::Bool(true);

        assert_eq!(map.get(&bad), None);
        assert!(!map.has(&bad));
        assert_eq!(map.remove(&bad), None);

        let err = map.set(&bad, 1i64).unwrap_err();
        assert_eq!(
            err,
            MapError::InvalidKey {
                kind: crate::ValueKind::Bool
            }
        );
    }

    #[test]
    fn set_returns_prior_value() {
        let mut map = AttrMap::new();
        assert_eq!(map.set("k", 1i64).unwrap(), None);
        assert_eq!(map.set("k", 2i64).unwrap(), Some(Value::from(1i64)));
    }

    #[test]
    fn shadowing_key_can_be_assigned_repeatedly() {
        let mut map = AttrMap::new();
        // "len" collides with a structural method name; the collision
        // check logs and must never fail, however often it fires.
        for _ in 0..3 {
            map.set("len", Value::Sequence(Vec::new())).unwrap();
            map.set("sort", Value::Sequence(Vec::new())).unwrap();
        }
        assert!(map.has("len"));
        assert!(map.has("sort"));
    }

    #[test]
    fn equality_ignores_insertion_order_and_supplier() {
        let mut a = AttrMap::new();
        a.set("x", 1i64).unwrap();
        a.set("y", 2i64).unwrap();

        let mut b = AttrMap::with_default(|_, _| Value::Null);
        b.set("y", 2i64).unwrap();
        b.set("x", 1i64).unwrap();

        assert_eq!(a, b);

        b.set("z", 3i64).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn remove_and_clear() {
        let mut map = AttrMap::with_default(|_, _| Value::Null);
        map.set("a", 1i64).unwrap();
        map.set("b", 2i64).unwrap();

        assert_eq!(map.remove("a"), Some(Value::from(1i64)));
        map.clear();
        assert!(map.is_empty());
        // The supplier survives clear.
        assert!(map.has_default());
    }

    #[test]
    fn deep_merge_combines_nested_maps() {
        let mut base = AttrMap::try_from(json!({"a": {"b": 1}})).unwrap();
        let overlay = AttrMap::try_from(json!({"a": {"c": 2}})).unwrap();
        base.deep_merge(overlay);

        let expected = AttrMap::try_from(json!({"a": {"b": 1, "c": 2}})).unwrap();
        assert_eq!(base, expected);
    }

    #[test]
    fn deep_merge_overwrites_on_type_mismatch() {
        let mut base = AttrMap::try_from(json!({"a": {"b": 1}, "s": "old"})).unwrap();
        let overlay = AttrMap::try_from(json!({"a": 7, "s": {"n": true}})).unwrap();
        base.deep_merge(overlay);

        let expected = AttrMap::try_from(json!({"a": 7, "s": {"n": true}})).unwrap();
        assert_eq!(base, expected);
    }

    #[test]
    fn deep_merged_leaves_operands_intact() {
        let base = AttrMap::try_from(json!({"a": 1})).unwrap();
        let overlay = AttrMap::try_from(json!({"b": 2})).unwrap();
        let merged = base.deep_merged(&overlay);

        assert_eq!(base.len(), 1);
        assert_eq!(overlay.len(), 1);
        assert_eq!(merged, AttrMap::try_from(json!({"a": 1, "b": 2})).unwrap());
    }

    #[test]
    fn nested_maps_inherit_the_supplier_on_set() {
        let mut map = AttrMap::with_default(|_, _| Value::from("inherited"));
        map.set("nested", AttrMap::new()).unwrap();

        let nested = map.get("nested").and_then(Value::as_map).unwrap();
        assert!(nested.has_default());
        assert_eq!(nested.get_or_default("k"), Some(Value::from("inherited")));
    }

    #[test]
    fn nested_map_with_own_supplier_keeps_it() {
        let mut parent = AttrMap::with_default(|_, _| Value::from("parent"));
        let child = AttrMap::with_default(|_, _| Value::from("child"));
        parent.set("c", child).unwrap();

        let child = parent.get("c").and_then(Value::as_map).unwrap();
        assert_eq!(child.get_or_default("k"), Some(Value::from("child")));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut map = AttrMap::new();
        map.set("z", 1i64).unwrap();
        map.set("a", 2i64).unwrap();
        map.set("m", 3i64).unwrap();

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn from_iterator_and_extend() {
        let mut map: AttrMap = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        map.extend([("c", 3i64)]);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("c").and_then(Value::as_i64), Some(3));
    }
}
