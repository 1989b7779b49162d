//! attrmap - dynamic attribute maps with indifferent key access
//!
//! An [`AttrMap`] is an ordered mapping from normalized string keys to
//! dynamic [`Value`]s that supports:
//!
//! - **Indifferent access**: string, [`Symbol`], and numeric key forms
//!   normalize to the same stored key before comparison.
//! - **Keyed access**: [`get`](AttrMap::get), [`set`](AttrMap::set),
//!   [`has`](AttrMap::has), with "present but null" distinct from
//!   "absent".
//! - **Accessor dispatch**: member-style reads, writes (`name=`),
//!   existence queries (`name?`), and initializing reads (`name!`),
//!   resolved through an explicit priority-ordered rule table
//!   ([`dispatch`](AttrMap::dispatch)).
//! - **Collision safety**: stored data shadows structural method names
//!   for dispatch, but [`AttrMap::is_structural_capability`] consults
//!   only the fixed builtin table and can never be spoofed by data.
//! - **Deep conversion**: nested plain mappings (JSON objects, also
//!   inside arrays) become nested `AttrMap`s, and
//!   [`to_json`](AttrMap::to_json) is the exact inverse.
//! - **Default suppliers**: a per-instance function invoked on confirmed
//!   absence, inherited by nested maps created through conversion.
//!
//! # Example
//!
//! ```rust
//! use attrmap::{Accessor, AttrMap, Dispatched, Value};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), attrmap::MapError> {
//! let mut config = AttrMap::try_from(json!({
//!     "service": { "name": "ingest", "workers": 4 },
//! }))?;
//!
//! let service = config.get("service").and_then(Value::as_map).unwrap();
//! assert_eq!(service.get("workers").and_then(Value::as_i64), Some(4));
//!
//! // Accessor-style write and read.
//! config.dispatch(Accessor::parse("region=", vec![Value::from("eu-1")]))?;
//! assert_eq!(
//!     config.dispatch(Accessor::parse("region", vec![]))?,
//!     Dispatched::Read(Value::from("eu-1")),
//! );
//!
//! // Back to a plain mapping.
//! assert_eq!(config.to_json()["region"], json!("eu-1"));
//! # Ok(())
//! # }
//! ```
//!
//! The map is single-threaded and synchronous; it is `Send + Sync`
//! compatible so an embedding system can wrap it in its own lock, but it
//! provides no internal synchronization.

// Core modules
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod key;
pub mod map;
pub mod value;

// Re-exports for convenience
pub use dispatch::{Accessor, Dispatched, STRUCTURAL_METHODS};
pub use error::MapError;
pub use key::{AsMapKey, Symbol};
pub use map::{AttrMap, DefaultSupplier};
pub use value::{Value, ValueKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn symbol_and_string_construction_compare_equal() {
        let mut by_symbol = AttrMap::new();
        by_symbol.set(Symbol("p"), "test").unwrap();

        let by_string = AttrMap::try_from(json!({"p": "test"})).unwrap();
        assert_eq!(by_symbol, by_string);
    }

    #[test]
    fn accessor_flow_over_converted_data() {
        let mut map = AttrMap::try_from(json!({"a": {"b": 1}})).unwrap();

        let Dispatched::Read(Value::Map(a)) =
            map.dispatch(Accessor::parse("a", vec![])).unwrap()
        else {
            panic!("expected a nested map");
        };
        assert_eq!(a.get("b").and_then(Value::as_i64), Some(1));

        map.dispatch(Accessor::parse("c!", vec![])).unwrap();
        assert!(map.get("c").and_then(Value::as_map).is_some());
    }
}
