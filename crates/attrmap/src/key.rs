//! Key normalization for indifferent access
//!
//! Every key stored in an [`AttrMap`](crate::AttrMap) is a normalized
//! string. Lookups accept any key form with a string representation
//! (string slices, owned strings, [`Symbol`]s, integers, and string- or
//! number-valued [`Value`]s) and normalize it before comparison, so
//! `Symbol("p")`, `"p"`, and a dynamic `Value::String("p")` all address
//! the same entry.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MapError;
use crate::value::Value;

/// Bare accessor names: lowercase-leading identifiers
static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// A symbol-like key form
///
/// Symbols normalize to the same stored key as the equivalent string, so
/// a map built from symbol keys compares equal to one built from string
/// keys.
///
/// # Example
/// ```
/// use attrmap::{AttrMap, Symbol};
///
/// let mut by_symbol = AttrMap::new();
/// by_symbol.set(&Symbol("p"), "test").unwrap();
///
/// let mut by_string = AttrMap::new();
/// by_string.set("p", "test").unwrap();
///
/// assert_eq!(by_symbol, by_string);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol<'a>(pub &'a str);

/// Key forms accepted by map operations
///
/// Implementors produce the normalized string key, or
/// [`MapError::InvalidKey`] for dynamic values with no string form
/// (null, booleans, sequences, maps).
pub trait AsMapKey {
    /// Normalize this key form to its stored string representation
    ///
    /// # Errors
    /// Returns [`MapError::InvalidKey`] if the form has no string
    /// representation.
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError>;
}

impl AsMapKey for str {
    #[inline]
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        Ok(Cow::Borrowed(self))
    }
}

impl AsMapKey for String {
    #[inline]
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl AsMapKey for Symbol<'_> {
    #[inline]
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        Ok(Cow::Borrowed(self.0))
    }
}

impl AsMapKey for u64 {
    #[inline]
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        Ok(Cow::Owned(self.to_string()))
    }
}

impl AsMapKey for i64 {
    #[inline]
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        Ok(Cow::Owned(self.to_string()))
    }
}

impl AsMapKey for usize {
    #[inline]
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        Ok(Cow::Owned(self.to_string()))
    }
}

impl AsMapKey for Value {
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        match self {
            Value::String(s) => Ok(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Ok(Cow::Owned(n.to_string())),
            other => Err(MapError::InvalidKey { kind: other.kind() }),
        }
    }
}

impl<K: AsMapKey + ?Sized> AsMapKey for &K {
    #[inline]
    fn as_map_key(&self) -> Result<Cow<'_, str>, MapError> {
        (**self).as_map_key()
    }
}

/// Check whether a name matches the bare accessor pattern used by
/// dispatch rule 5 (lowercase-leading identifier)
#[inline]
#[must_use]
pub(crate) fn is_bare_identifier(name: &str) -> bool {
    BARE_IDENTIFIER.is_match(name)
}
