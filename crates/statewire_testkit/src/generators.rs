//! Property-based test generators using proptest.

use proptest::prelude::*;
use serde_json::Value;
use statewire_core::PropertyPath;

/// Strategy for generating valid property-name segments.
pub fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,7}").expect("Invalid regex")
}

/// Strategy for generating non-root property paths up to four levels
/// deep.
pub fn path_strategy() -> impl Strategy<Value = PropertyPath> {
    prop::collection::vec(segment_strategy(), 1..=4).prop_map(|segments| {
        segments
            .iter()
            .fold(PropertyPath::root(), |path, s| path.child(s))
    })
}

/// Strategy for generating primitive JSON leaf values.
pub fn leaf_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::from(n)),
        segment_strategy().prop_map(Value::String),
    ]
}

/// Strategy for generating JSON trees with object nesting.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_value_strategy().prop_recursive(3, 16, 4, |inner| {
        prop::collection::btree_map(segment_strategy(), inner, 1..4).prop_map(|map| {
            Value::Object(map.into_iter().collect())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn paths_round_trip_through_display(path in path_strategy()) {
            let rendered = path.to_string();
            prop_assert_eq!(PropertyPath::parse(&rendered), path);
        }

        #[test]
        fn segments_are_never_empty(path in path_strategy()) {
            prop_assert!(path.segments().all(|s| !s.is_empty()));
            prop_assert!(!path.is_root());
        }

        #[test]
        fn leaf_values_are_primitive(value in leaf_value_strategy()) {
            prop_assert!(!value.is_object() && !value.is_array());
        }
    }
}
