use rstest::rstest;
use xmlpath::Document;

#[rstest]
#[case(r#"<root><a>1</a><b>2</b></root>"#)]
#[case(r#"<foo:root xmlns:foo="http://example.com"><foo:a>1</foo:a><foo:b>2</foo:b></foo:root>"#)]
#[case(r#"<root xmlns:foo="http://example.com"><a>1</a><foo:b>2</foo:b></root>"#)]
#[case(r#"<root xmlns="http://example.com"><a>1</a><b>2</b></root>"#)]
#[case(r#"<root a="1" b="2"><c d="&quot;x&quot;"/></root>"#)]
#[case(r#"<root><!--comment--><?target data?><![CDATA[<raw>]]>&amp;&lt;&gt;</root>"#)]
#[case(r#"<root>&nbsp;</root>"#)]
fn roundtrip(#[case] xml: &str) {
    let doc = Document::parse(xml).unwrap();
    assert_eq!(doc.to_string(doc.root()).unwrap(), xml);
}

#[test]
fn roundtrip_drops_declaration() {
    let doc = Document::parse(r#"<?xml version="1.0" encoding="UTF-8"?><root/>"#).unwrap();
    assert_eq!(doc.to_string(doc.root()).unwrap(), "<root/>");
}

#[test]
fn roundtrip_character_references() {
    let doc = Document::parse("<root>&#65;&#x42;</root>").unwrap();
    assert_eq!(doc.to_string(doc.root()).unwrap(), "<root>AB</root>");
}

#[test]
fn roundtrip_bytes_with_encoding() {
    let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><root>caf\xe9</root>";
    let doc = Document::parse_bytes(bytes).unwrap();
    assert_eq!(doc.to_string(doc.root()).unwrap(), "<root>caf\u{e9}</root>");
}
