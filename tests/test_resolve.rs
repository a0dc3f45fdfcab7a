use proptest::prelude::*;
use xmlpath::{Document, ValueType};

const ELEMENT_NAMES: &[&str] = &["a", "b", "c", "item"];
const ATTRIBUTE_NAMES: &[&str] = &["id", "name"];

fn arb_path() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(ELEMENT_NAMES), 1..5),
        prop::option::of(prop::sample::select(ATTRIBUTE_NAMES)),
        any::<bool>(),
    )
        .prop_map(|(elements, attribute, absolute)| {
            let mut path = elements.join("/");
            if let Some(attribute) = attribute {
                path = format!("{}/@{}", path, attribute);
            }
            if absolute {
                format!("/{}", path)
            } else {
                path
            }
        })
}

proptest! {
    #[test]
    fn test_created_path_is_found_again(path in arb_path()) {
        let mut doc = Document::new();
        let root = doc.root();
        let created = doc.select_single_node(root, &path, true);
        prop_assert!(created.is_some(), "nothing created for {}", path);
        prop_assert_eq!(doc.select_single_node(root, &path, false), created);
    }

    #[test]
    fn test_creating_twice_adds_nothing(path in arb_path()) {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.select_single_node(root, &path, true);
        let serialized = doc.to_string(root).unwrap();
        let second = doc.select_single_node(root, &path, true);
        prop_assert_eq!(first, second);
        prop_assert_eq!(doc.to_string(root).unwrap(), serialized);
    }

    #[test]
    fn test_creation_under_element_context(path in arb_path()) {
        let mut doc = Document::parse("<ctx/>").unwrap();
        let ctx = doc.document_element().unwrap();
        let relative = path.trim_start_matches('/');
        let created = doc.select_single_node(ctx, relative, true);
        prop_assert!(created.is_some());
        prop_assert_eq!(doc.select_single_node(ctx, relative, false), created);
    }
}

#[test]
fn test_nested_chain_has_no_siblings() {
    let mut doc = Document::parse("<r/>").unwrap();
    let r = doc.document_element().unwrap();
    doc.select_single_node(r, "a/b/c", true).unwrap();
    doc.select_single_node(r, "a/b/c", true).unwrap();
    assert_eq!(doc.select_nodes(r, ".//*").len(), 3);
    assert_eq!(doc.select_nodes(r, "a").len(), 1);
    assert_eq!(doc.select_nodes(r, "a/b").len(), 1);
    assert_eq!(doc.select_nodes(r, "a/b/c").len(), 1);
}

#[test]
fn test_first_match_in_document_order() {
    let mut doc = Document::parse("<r><a><b>1</b></a><b>2</b></r>").unwrap();
    let root = doc.root();
    let found = doc.select_single_node(root, "//b", false).unwrap();
    assert_eq!(doc.text_content(found), "1");
}

#[test]
fn test_qualifier_never_mutates() {
    let mut doc = Document::parse("<r><foo/></r>").unwrap();
    let r = doc.document_element().unwrap();
    for segment in ["foo[1]", "foo[@id='x']", "[1]", "text()", "node()", "self::foo", ""] {
        assert_eq!(doc.append_new_step_node(r, segment), None, "{}", segment);
    }
    assert_eq!(doc.to_string(r).unwrap(), "<r><foo/></r>");
}

#[test]
fn test_qualifier_on_ancestor_step_is_resolved() {
    let mut doc = Document::parse("<r><foo/><foo/></r>").unwrap();
    let root = doc.root();
    let created = doc.select_single_node(root, "/r/foo[2]/bar", true).unwrap();
    assert_eq!(
        doc.to_string(root).unwrap(),
        "<r><foo/><foo><bar/></foo></r>"
    );
    assert_eq!(doc.select_single_node(root, "/r/foo[2]/bar", false), Some(created));
}

#[test]
fn test_attribute_step_creates_attribute() {
    let mut doc = Document::parse("<r/>").unwrap();
    let root = doc.root();
    let attribute = doc.select_single_node(root, "/r/@id", true).unwrap();
    assert_eq!(doc.value_type(attribute), ValueType::Attribute);
    assert_eq!(doc.to_string(root).unwrap(), r#"<r id=""/>"#);
}

#[test]
fn test_attribute_on_root_refused() {
    let mut doc = Document::new();
    let root = doc.root();
    assert_eq!(doc.select_single_node(root, "@id", true), None);
    assert_eq!(doc.to_string(root).unwrap(), "");
}

#[test]
fn test_select_single_element_creates() {
    let mut doc = Document::new();
    let root = doc.root();
    let element = doc.select_single_element(root, "/a/b", true).unwrap();
    assert_eq!(doc.local_name(element), Some("b"));
    assert!(doc.select_single_element(root, "/a/b/@x", true).is_none());
    // the attribute was created even though it is not returned
    assert_eq!(doc.to_string(root).unwrap(), r#"<a><b x=""/></a>"#);
}

#[test]
fn test_select_nodes_is_read_only() {
    let doc = Document::parse("<r><a/><a/></r>").unwrap();
    let root = doc.root();
    assert_eq!(doc.select_nodes(root, "/r/a").len(), 2);
    assert!(doc.select_nodes(root, "/r/b").is_empty());
    assert!(doc.select_nodes(root, "/r/a[").is_empty());
    assert!(doc.select_nodes(root, "count(/r/a)").is_empty());
}

#[test]
fn test_find_single_node() {
    let doc = Document::parse("<r><a/></r>").unwrap();
    let root = doc.root();
    assert!(doc.find_single_node(root, "/r/a").is_some());
    assert!(doc.find_single_node(root, "/r/b").is_none());
}

#[test]
fn test_namespaced_creation() {
    let mut doc = Document::parse(r#"<r xmlns:p="urn:p"/>"#).unwrap();
    let root = doc.root();
    let created = doc.select_single_node(root, "/r/p:a/p:b", true).unwrap();
    assert_eq!(doc.namespace_uri(created), Some("urn:p"));
    assert_eq!(
        doc.to_string(root).unwrap(),
        r#"<r xmlns:p="urn:p"><p:a><p:b/></p:a></r>"#
    );
}

#[test]
fn test_unknown_prefix_refused() {
    let mut doc = Document::parse("<r/>").unwrap();
    let root = doc.root();
    assert_eq!(doc.select_single_node(root, "/r/q:a", true), None);
    assert_eq!(doc.to_string(root).unwrap(), "<r/>");
}
