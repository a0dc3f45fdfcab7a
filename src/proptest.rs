//! Proptest strategies for paths, text values and JSON documents.
//!
//! Proptests check *properties* that must hold for arbitrary data. These
//! strategies generate the inputs the path-addressed API works with.
//!
//! This can be enabled by adding the `proptest` feature to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! xmlpath = { version = "0.1", features = ["proptest"] }
//! ```
//!
//! See the [`proptest`](https://docs.rs/proptest/latest/proptest/)
//! documentation for more information.

use proptest::prelude::*;
use serde_json::{Map, Number, Value as JsonValue};

const ELEMENT_NAMES: &[&str] = &["a", "b", "c", "item", "entry"];
const ATTRIBUTE_NAMES: &[&str] = &["id", "name", "kind"];
const XML_STRING: &str = "[\u{000a}\u{0009}\u{0020}-\u{D7FF}\u{E000}-\u{FFFD}]*";
const JSON_KEY: &str = "[ a-zA-Z0-9_<>&.:\u{AA}\u{B2}\u{B5}\u{B7}\u{BD}\u{E9}\u{660}\u{4E00}-\u{4E0F}-]{0,8}";

/// A step that can be created: an element name or an `@`-prefixed
/// attribute name, without a qualifier.
pub fn arb_step() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(ELEMENT_NAMES).prop_map(|name| name.to_string()),
        prop::sample::select(ATTRIBUTE_NAMES).prop_map(|name| format!("@{}", name)),
    ]
}

/// A relative path of one to five element steps, optionally ending in an
/// attribute step. Every step can be created.
///
/// ```notrust
/// use xmlpath::proptest::arb_path;
/// use xmlpath::Document;
///
/// proptest! {
///   #[test]
///   fn test_created_path_is_found(path in arb_path()) {
///     let mut doc = Document::new();
///     let root = doc.root();
///     let created = doc.select_single_node(root, &path, true);
///     prop_assert!(created.is_some());
///     prop_assert_eq!(doc.select_single_node(root, &path, false), created);
///   }
/// }
/// ```
pub fn arb_path() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(ELEMENT_NAMES), 1..6),
        prop::option::of(prop::sample::select(ATTRIBUTE_NAMES)),
    )
        .prop_map(|(elements, attribute)| {
            let mut steps = elements
                .into_iter()
                .map(|name| name.to_string())
                .collect::<Vec<_>>();
            if let Some(attribute) = attribute {
                steps.push(format!("@{}", attribute));
            }
            steps.join("/")
        })
}

/// Text made of characters allowed in XML.
pub fn arb_text() -> impl Strategy<Value = String> {
    XML_STRING
}

fn arb_json_leaf() -> impl Strategy<Value = JsonValue> {
    prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::Bool),
        any::<i64>().prop_map(|i| JsonValue::Number(Number::from(i))),
        XML_STRING.prop_map(JsonValue::String),
    ]
}

/// A JSON object nested up to four levels deep, with keys that are not all
/// usable as element names.
pub fn arb_json() -> impl Strategy<Value = JsonValue> {
    let value = arb_json_leaf().prop_recursive(
        4,  // levels deep
        64, // maximum size of 64 values
        6,  // up to 6 items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(JsonValue::Array),
                prop::collection::vec((JSON_KEY, inner), 0..6)
                    .prop_map(|entries| JsonValue::Object(entries.into_iter().collect())),
            ]
        },
    );
    prop::collection::vec((JSON_KEY, value), 0..6)
        .prop_map(|entries| JsonValue::Object(entries.into_iter().collect::<Map<_, _>>()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, StepInfo, StepKind};

    proptest! {
        #[test]
        fn test_generated_steps_are_creatable(step in arb_step()) {
            let info = StepInfo::new(&step);
            prop_assert_ne!(info.kind(), StepKind::Other);
            prop_assert!(!info.has_qualifier());
        }

        #[test]
        fn test_text_on_created_path(path in arb_path(), text in arb_text()) {
            let mut doc = Document::new();
            let root = doc.root();
            prop_assert!(doc.set_string_value(root, &path, &text).is_some());
            prop_assert_eq!(doc.get_string_value(root, &path, None), Some(text));
        }

        #[test]
        fn test_json_import_succeeds(json in arb_json()) {
            let mut doc = Document::new();
            prop_assert!(doc.load_from_json(&json.to_string(), "root"));
            let serialized = doc.to_string(doc.root()).unwrap();
            prop_assert!(Document::parse(&serialized).is_ok(), "cannot parse {}", serialized);
        }
    }
}
