//! Error types for attribute map operations

use crate::value::ValueKind;

/// Errors produced by attribute map operations
///
/// Everything not covered here is a total function over valid inputs:
/// lookups signal absence with `Option`, and [`deep_merge`] resolves every
/// type mismatch with its overwrite policy instead of failing.
///
/// [`deep_merge`]: crate::AttrMap::deep_merge
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// Key has no string or symbol-like representation
    #[error("key of kind `{kind}` has no string form")]
    InvalidKey {
        /// Kind of the value offered as a key
        kind: ValueKind,
    },

    /// Accessor dispatch fell through every rule, including the structural
    /// method table
    #[error("no member `{name}`: not a stored key, no default supplier, not a structural method")]
    UnknownMember {
        /// The accessor name that failed to resolve
        name: String,
    },

    /// Conversion input was not a mapping at the top level
    #[error("expected a mapping, found {kind}")]
    NotAMapping {
        /// Kind of the value that was offered
        kind: ValueKind,
    },
}
