//! Conversion round-trip properties over randomized JSON trees

use attrmap::AttrMap;
use proptest::prelude::*;
use serde_json::Value as JsonValue;

/// Bounded random JSON values: scalars at the leaves, arrays and objects
/// above them. Floats are left out so value equality stays exact.
fn arb_json() -> impl Strategy<Value = JsonValue> {
    let leaf = prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::Bool),
        any::<i64>().prop_map(|n| JsonValue::Number(n.into())),
        "[a-z0-9_]{0,8}".prop_map(JsonValue::String),
    ];
    leaf.prop_recursive(3, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
            prop::collection::btree_map("[a-z_]{1,6}", inner, 0..4)
                .prop_map(|entries| JsonValue::Object(entries.into_iter().collect())),
        ]
    })
}

/// Random JSON with an object at the top level
fn arb_object() -> impl Strategy<Value = JsonValue> {
    prop::collection::btree_map("[a-z_]{1,6}", arb_json(), 0..6)
        .prop_map(|entries| JsonValue::Object(entries.into_iter().collect()))
}

proptest! {
    #[test]
    fn json_to_map_to_json_is_identity(object in arb_object()) {
        let map = AttrMap::try_from(object.clone()).unwrap();
        prop_assert_eq!(map.to_json(), object);
    }

    #[test]
    fn map_to_json_to_map_is_identity(object in arb_object()) {
        let map = AttrMap::try_from(object).unwrap();
        let back = AttrMap::try_from(map.to_json()).unwrap();
        prop_assert_eq!(back, map);
    }

    #[test]
    fn serde_text_roundtrip(object in arb_object()) {
        let map = AttrMap::try_from(object).unwrap();
        let text = serde_json::to_string(&map).unwrap();
        let back: AttrMap = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(back, map);
    }
}
