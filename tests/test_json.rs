use insta::assert_snapshot;
use serde_json::json;
use xmlpath::{Document, DEFAULT_ROOT_NAME, INVALID_NAME, NAME_ATTRIBUTE, NULL_ATTRIBUTE};

#[test]
fn test_import_mixed_structure() {
    let mut doc = Document::new();
    assert!(doc.load_from_json(
        r#"{"a": 1, "b": {"c": "x"}, "d": null, "e": [1, 2]}"#,
        DEFAULT_ROOT_NAME
    ));
    let root = doc.root();
    assert_eq!(doc.get_string_value(root, "/root/a", None), Some("1".to_string()));
    assert_eq!(doc.get_string_value(root, "/root/b/c", None), Some("x".to_string()));
    assert_eq!(
        doc.get_string_value(root, &format!("/root/d/@{}", NULL_ATTRIBUTE), None),
        Some("true".to_string())
    );
    assert_eq!(doc.select_nodes(root, "/root/d/node()").len(), 0);
    let e = doc.select_nodes(root, "/root/e");
    assert_eq!(e.len(), 2);
    assert_eq!(doc.text_content(e[0]), "1");
    assert_eq!(doc.text_content(e[1]), "2");
    assert_snapshot!(
        doc.to_string(root).unwrap(),
        @r###"<root><a>1</a><b><c>x</c></b><d null="true"/><e>1</e><e>2</e></root>"###
    );
}

#[test]
fn test_import_sanitizes_keys() {
    let mut doc = Document::new();
    assert!(doc.load_from_json(
        r#"{"My Key": "1", "123abc": "2", "---": "3", "valid_name": "4"}"#,
        "my root"
    ));
    let root = doc.root();
    assert_eq!(
        doc.get_string_value(root, &format!("/my-root/{}/@{}", INVALID_NAME, NAME_ATTRIBUTE), None),
        Some("---".to_string())
    );
    assert_snapshot!(
        doc.to_string(root).unwrap(),
        @r###"<my-root><My-Key>1</My-Key><abc>2</abc><InvalidName name="---">3</InvalidName><valid_name>4</valid_name></my-root>"###
    );
}

#[test]
fn test_import_non_ascii_keys_reparse() {
    let mut doc = Document::new();
    assert!(doc.load_from_json(
        r#"{"\u00b5s": 1, "a\u00b2": 2, "\u00aa": 3, "caf\u00e9": 4}"#,
        DEFAULT_ROOT_NAME
    ));
    let serialized = doc.to_string(doc.root()).unwrap();
    assert_snapshot!(
        serialized,
        @r###"<root><s>1</s><a>2</a><InvalidName name="ª">3</InvalidName><café>4</café></root>"###
    );
    let reparsed = Document::parse(&serialized).unwrap();
    assert_eq!(reparsed.to_string(reparsed.root()).unwrap(), serialized);
}

#[test]
fn test_import_replaces_previous_content() {
    let mut doc = Document::parse("<old><x/></old>").unwrap();
    assert!(doc.load_from_json(r#"{"new": true}"#, "fresh"));
    assert_eq!(doc.to_string(doc.root()).unwrap(), "<fresh><new>true</new></fresh>");
}

#[test]
fn test_import_keeps_registered_namespaces() {
    let mut doc = Document::new();
    doc.register_namespace("x", "urn:x");
    assert!(doc.load_from_json("{}", DEFAULT_ROOT_NAME));
    assert_eq!(doc.namespaces().get("x"), Some("urn:x"));
}

#[test]
fn test_import_rejects_scalars() {
    for json in ["1", "\"text\"", "null", "true", "", "{\"a\":"] {
        let mut doc = Document::new();
        assert!(!doc.load_from_json(json, DEFAULT_ROOT_NAME), "{}", json);
    }
}

#[test]
fn test_import_then_typed_access() {
    let mut doc = Document::new();
    assert!(doc.load_from_json(
        r#"{"server": {"port": 8080, "debug": false, "ratio": 0.75}}"#,
        "config"
    ));
    let root = doc.root();
    assert_eq!(doc.get_int_value(root, "/config/server/port", 0), 8080);
    assert!(!doc.get_bool_value(root, "/config/server/debug", true));
    assert_eq!(doc.get_float_value(root, "/config/server/ratio", 0.0), 0.75);
}

#[test]
fn test_children_as_map_inverts_import() {
    let mut doc = Document::new();
    let json = json!({"a": "1", "b": {"c": "x", "d": ["2", "3"]}});
    assert!(doc.load_from_json(&json.to_string(), DEFAULT_ROOT_NAME));
    let root_element = doc.document_element().unwrap();
    assert_eq!(doc.children_as_map(root_element), json);
}

#[test]
fn test_children_as_map_ignores_text_and_attributes() {
    let doc = Document::parse(r#"<r x="1">loose<a>1</a><!--c--></r>"#).unwrap();
    let r = doc.document_element().unwrap();
    assert_eq!(doc.children_as_map(r), json!({"a": "1"}));
}
