use xmlpath::{Document, Error, DEFAULT_ROOT_NAME};

fn main() -> Result<(), Error> {
    let mut doc = Document::parse(r#"<config xmlns:db="urn:example:db"><name>demo</name></config>"#)?;
    let root = doc.root();

    // missing nodes are created on the way
    doc.set_int_value(root, "/config/db:pool/db:size", 8);
    doc.set_bool_value(root, "/config/debug", true);
    doc.set_string_value(root, "/config/db:pool/@driver", "pg");

    assert_eq!(doc.get_int_value(root, "/config/db:pool/db:size", 1), 8);
    assert!(doc.get_bool_value(root, "/config/debug", false));
    assert_eq!(
        doc.get_string_value(root, "/config/missing", Some("fallback")),
        Some("fallback".to_string())
    );
    println!("{}", doc.to_string(root)?);

    let mut imported = Document::new();
    imported.load_from_json(r#"{"users": [{"id": 1}, {"id": 2}]}"#, DEFAULT_ROOT_NAME);
    let imported_root = imported.root();
    assert_eq!(imported.get_int_value(imported_root, "count(/root/users)", 0), 2);
    println!("{}", imported.to_string(imported_root)?);
    Ok(())
}
