//! Dynamic accessor dispatch
//!
//! Member-style access against map contents is resolved by an explicit,
//! priority-ordered rule table instead of a reflective missing-member
//! hook, so the order is auditable and testable on its own:
//!
//! 1. `<base>=` with exactly one argument: write.
//! 2. `<base>?` with no arguments: existence query.
//! 3. `<base>!` with no arguments: initializing read (insert an empty
//!    nested map if absent, then read).
//! 4. Stored key: read.
//! 5. Bare lowercase-leading identifier with a default supplier
//!    configured: read the supplier result.
//! 6. Name in the fixed structural method table: route to the builtin;
//!    anything else is [`MapError::UnknownMember`]. Dispatch never
//!    silently returns a placeholder.
//!
//! Data wins over structural names for dispatch (rules 4 and 5 beat
//! rule 6), but capability probes must never see data:
//! [`AttrMap::supports_accessor`] answers "would dispatch produce a
//! result" without consulting the structural table, and
//! [`AttrMap::is_structural_capability`] answers "is this a true builtin"
//! without consulting stored keys. Conflating the two lets a stored key
//! spoof a capability contract, which is exactly what this split
//! prevents.

use tracing::trace;

use crate::error::MapError;
use crate::key::is_bare_identifier;
use crate::map::AttrMap;
use crate::value::Value;

/// Fixed table of structural method names, sorted for binary search
///
/// These are operations intrinsic to the map type itself: every public
/// method that takes a map receiver. Associated constructors and
/// receiver-less queries are not member accesses and are not listed.
/// Membership is never affected by stored data.
pub const STRUCTURAL_METHODS: &[&str] = &[
    "clear",
    "deep_merge",
    "deep_merged",
    "dispatch",
    "get",
    "get_mut",
    "get_or_default",
    "has",
    "has_default",
    "is_empty",
    "iter",
    "iter_mut",
    "keys",
    "len",
    "remove",
    "set",
    "supports_accessor",
    "to_json",
    "values",
];

/// A parsed accessor invocation
///
/// [`Accessor::parse`] classifies a name and argument list into the form
/// the dispatch table matches on. Arity is part of the match: a name
/// shaped like a write but called without exactly one argument is not a
/// write, it continues down the table as a plain call.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// `<base>=` with one argument
    Write {
        /// Target key
        key: String,
        /// Value to store
        value: Value,
    },
    /// `<base>?` with no arguments
    Query {
        /// Queried key
        key: String,
    },
    /// `<base>!` with no arguments
    InitRead {
        /// Key to read, initializing to an empty map when absent
        key: String,
    },
    /// A bare name with no arguments
    Read {
        /// Accessor name
        name: String,
    },
    /// Any other shape (read form with arguments, write form with the
    /// wrong arity); a stored key or the structural table can satisfy
    /// it, the default supplier cannot
    Call {
        /// Accessor name as given
        name: String,
        /// Number of arguments supplied
        argc: usize,
    },
}

impl Accessor {
    /// Classify an accessor name and its arguments
    #[must_use]
    pub fn parse(name: &str, mut args: Vec<Value>) -> Self {
        if let Some(base) = name.strip_suffix('=') {
            if !base.is_empty() && args.len() == 1 {
                return Accessor::Write {
                    key: base.to_string(),
                    value: args.remove(0),
                };
            }
        } else if let Some(base) = name.strip_suffix('?') {
            if !base.is_empty() && args.is_empty() {
                return Accessor::Query {
                    key: base.to_string(),
                };
            }
        } else if let Some(base) = name.strip_suffix('!') {
            if !base.is_empty() && args.is_empty() {
                return Accessor::InitRead {
                    key: base.to_string(),
                };
            }
        } else if args.is_empty() {
            return Accessor::Read {
                name: name.to_string(),
            };
        }
        Accessor::Call {
            name: name.to_string(),
            argc: args.len(),
        }
    }
}

/// Outcome of dispatching an accessor
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// A read produced this value (rules 3, 4, 5)
    Read(Value),
    /// An existence query (rule 2)
    Exists(bool),
    /// A write, carrying the prior value (rule 1)
    Wrote(Option<Value>),
    /// The name resolved to a structural method (rule 6); the caller
    /// routes to the real method
    Builtin(&'static str),
}

impl AttrMap {
    /// Dispatch a parsed accessor through the rule table
    ///
    /// # Example
    /// ```
    /// use attrmap::{Accessor, AttrMap, Dispatched, Value};
    ///
    /// let mut map = AttrMap::new();
    ///
    /// map.dispatch(Accessor::parse("name=", vec![Value::from("x")])).unwrap();
    /// assert_eq!(
    ///     map.dispatch(Accessor::parse("name", vec![])).unwrap(),
    ///     Dispatched::Read(Value::from("x")),
    /// );
    /// assert_eq!(
    ///     map.dispatch(Accessor::parse("name?", vec![])).unwrap(),
    ///     Dispatched::Exists(true),
    /// );
    /// ```
    ///
    /// # Errors
    /// [`MapError::InvalidKey`] from a write with a non-normalizable key
    /// never occurs here (parsed keys are strings), but
    /// [`MapError::UnknownMember`] is returned when every rule falls
    /// through, including the structural table.
    pub fn dispatch(&mut self, accessor: Accessor) -> Result<Dispatched, MapError> {
        match accessor {
            Accessor::Write { key, value } => {
                trace!(key = %key, "dispatch: write");
                let prior = self.set(key.as_str(), value)?;
                Ok(Dispatched::Wrote(prior))
            }
            Accessor::Query { key } => {
                trace!(key = %key, "dispatch: existence query");
                Ok(Dispatched::Exists(self.has(key.as_str())))
            }
            Accessor::InitRead { key } => {
                trace!(key = %key, "dispatch: initializing read");
                if !self.has(key.as_str()) {
                    self.set(key.as_str(), AttrMap::new())?;
                }
                let value = self
                    .get(key.as_str())
                    .cloned()
                    .unwrap_or_default();
                Ok(Dispatched::Read(value))
            }
            Accessor::Read { name } => {
                // Rule 4: stored data wins, even over structural names.
                if let Some(stored) = self.get(name.as_str()) {
                    trace!(name = %name, "dispatch: stored key");
                    return Ok(Dispatched::Read(stored.clone()));
                }
                // Rule 5: bare identifiers go through the supplier.
                if is_bare_identifier(&name) {
                    if let Some(supplier) = self.default_supplier() {
                        trace!(name = %name, "dispatch: default supplier");
                        return Ok(Dispatched::Read(supplier(self, &name)));
                    }
                }
                builtin_fallthrough(name)
            }
            Accessor::Call { name, argc } => {
                // Rule 4 has no arity condition: a stored key satisfies
                // any shape, including suffix-shaped names that missed
                // their arity check.
                if let Some(stored) = self.get(name.as_str()) {
                    trace!(name = %name, argc, "dispatch: stored key");
                    return Ok(Dispatched::Read(stored.clone()));
                }
                // A supplier read is an argumentless accessor, so rule 5
                // does not apply to call shapes.
                trace!(name = %name, argc, "dispatch: call shape");
                builtin_fallthrough(name)
            }
        }
    }

    /// Whether accessor dispatch would produce a result for this name
    /// via rules 1 through 5
    ///
    /// True for write/query/initializing-read forms, stored keys, and
    /// bare identifiers when a default supplier is configured. Never
    /// consults the structural table: this is not a capability probe,
    /// and external protocol checks must use
    /// [`is_structural_capability`](Self::is_structural_capability)
    /// instead.
    #[must_use]
    pub fn supports_accessor(&self, name: &str) -> bool {
        if let Some(base) = name.strip_suffix(['=', '?', '!']) {
            return !base.is_empty();
        }
        if self.has(name) {
            return true;
        }
        is_bare_identifier(name) && self.has_default()
    }

    /// Whether a name is a true structural capability of the map type
    ///
    /// Consults only the fixed structural table; stored data can never
    /// make this true. A capability probe must use this query, never
    /// [`supports_accessor`](Self::supports_accessor).
    #[inline]
    #[must_use]
    pub fn is_structural_capability(name: &str) -> bool {
        STRUCTURAL_METHODS.binary_search(&name).is_ok()
    }
}

/// Rule 6: resolve against the structural table or fail
fn builtin_fallthrough(name: String) -> Result<Dispatched, MapError> {
    match STRUCTURAL_METHODS.binary_search(&name.as_str()) {
        Ok(index) => Ok(Dispatched::Builtin(STRUCTURAL_METHODS[index])),
        Err(_) => Err(MapError::UnknownMember { name }),
    }
}
