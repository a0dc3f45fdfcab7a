use log::error;
use serde_json::{Map, Value as JsonValue};

use crate::document::{Document, Node};
use crate::encoding::decode_utf8_lossy_stripped;
use crate::error::Error;
use crate::nameaccess::{is_ncname_char, is_ncname_start_char};

/// Element used for a key that has no usable characters left as a name.
pub const INVALID_NAME: &str = "InvalidName";
/// Document element used when the requested root name is unusable.
pub const INVALID_ROOT_NAME: &str = "InvalidRootName";
/// Attribute holding the original key of an [`INVALID_NAME`] element.
pub const NAME_ATTRIBUTE: &str = "name";
/// Attribute set to `true` on elements imported from `null`.
pub const NULL_ATTRIBUTE: &str = "null";
/// Attribute set to `empty` on elements imported from `[]`.
pub const ARRAY_ATTRIBUTE: &str = "array";
/// Element used for the entries of an array that has no key of its own.
pub const ITEM_NAME: &str = "item";
/// The customary document element name for imported JSON.
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Turn an arbitrary key into an element name.
///
/// Spaces become hyphens, characters other than letters, digits, `-` and
/// `_` are dropped, as are letters and digits XML does not allow in names.
/// Leading characters are then removed until the name starts with a letter
/// XML accepts as the first character. The result may be empty.
///
/// ```rust
/// use xmlpath::make_safe_name;
///
/// assert_eq!(make_safe_name("My Key"), "My-Key");
/// assert_eq!(make_safe_name("123abc"), "abc");
/// assert_eq!(make_safe_name("---"), "");
/// ```
pub fn make_safe_name(name: &str) -> String {
    let name = name
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| *c == '-' || *c == '_' || (c.is_alphanumeric() && is_ncname_char(*c)))
        .collect::<String>();
    name.trim_start_matches(|c: char| c == '_' || !is_ncname_start_char(c))
        .to_string()
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Conversion between JSON and element trees.
impl Document {
    /// Replace the content of this document with elements built from JSON.
    ///
    /// The document element is named after `root_name`. Object keys become
    /// child elements; array entries become repeated elements with the
    /// same name. Scalars become text, `null` sets a `null="true"`
    /// attribute and an empty array sets `array="empty"`.
    ///
    /// Returns false if the JSON is invalid or is not an object or array.
    /// An import that fails halfway leaves what was built so far in place.
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let mut doc = Document::new();
    /// assert!(doc.load_from_json(r#"{"a": 1, "b": {"c": "x"}, "d": null, "e": [1, 2]}"#, "root"));
    /// assert_eq!(
    ///     doc.to_string(doc.root()).unwrap(),
    ///     r#"<root><a>1</a><b><c>x</c></b><d null="true"/><e>1</e><e>2</e></root>"#
    /// );
    /// ```
    pub fn load_from_json(&mut self, json: &str, root_name: &str) -> bool {
        let root_element = match self.seed_json_root(root_name) {
            Ok(element) => element,
            Err(e) => {
                error!("cannot create document element for {:?}: {}", root_name, e);
                return false;
            }
        };
        let value = match serde_json::from_str::<JsonValue>(json) {
            Ok(value) => value,
            Err(e) => {
                error!("{}", Error::from(e));
                return false;
            }
        };
        let result = match &value {
            JsonValue::Object(map) => self.import_map(root_element, map),
            JsonValue::Array(items) => self.import_items(root_element, ITEM_NAME, items),
            _ => Err(Error::JsonNotContainer),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Like [`Document::load_from_json`], for bytes that may contain invalid
    /// UTF-8; invalid sequences are dropped.
    pub fn load_from_json_bytes(&mut self, json: &[u8], root_name: &str) -> bool {
        let json = decode_utf8_lossy_stripped(json);
        self.load_from_json(&json, root_name)
    }

    fn seed_json_root(&mut self, root_name: &str) -> Result<Node, Error> {
        let root = self.root();
        self.clear(root)?;
        let safe_name = make_safe_name(root_name);
        let element = if safe_name.is_empty() {
            let element = self.create_named_element(root, INVALID_ROOT_NAME)?;
            self.set_attribute(element, NAME_ATTRIBUTE, root_name)?;
            element
        } else {
            self.create_named_element(root, &safe_name)?
        };
        self.append(root, element)?;
        Ok(element)
    }

    fn import_map(&mut self, element: Node, map: &Map<String, JsonValue>) -> Result<(), Error> {
        for (key, value) in map {
            match value {
                JsonValue::Array(items) if !items.is_empty() => {
                    self.import_items(element, key, items)?
                }
                _ => self.import_entry(element, key, value)?,
            }
        }
        Ok(())
    }

    fn import_items(&mut self, element: Node, key: &str, items: &[JsonValue]) -> Result<(), Error> {
        for item in items {
            self.import_entry(element, key, item)?;
        }
        Ok(())
    }

    fn import_entry(&mut self, parent: Node, key: &str, value: &JsonValue) -> Result<(), Error> {
        let child = self.json_child(parent, key)?;
        match value {
            JsonValue::Object(map) => self.import_map(child, map),
            JsonValue::Array(items) if items.is_empty() => {
                self.set_attribute(child, ARRAY_ATTRIBUTE, "empty")?;
                Ok(())
            }
            JsonValue::Array(items) => self.import_items(child, ITEM_NAME, items),
            JsonValue::Null => {
                self.set_attribute(child, NULL_ATTRIBUTE, "true")?;
                Ok(())
            }
            scalar => match scalar_text(scalar) {
                Some(text) if !text.is_empty() => self.append_text(child, &text),
                _ => Ok(()),
            },
        }
    }

    fn json_child(&mut self, parent: Node, key: &str) -> Result<Node, Error> {
        let safe_name = make_safe_name(key);
        let child = if safe_name.is_empty() {
            let child = self.create_named_element(parent, INVALID_NAME)?;
            self.set_attribute(child, NAME_ATTRIBUTE, key)?;
            child
        } else {
            self.create_named_element(parent, &safe_name)?
        };
        self.append(parent, child)?;
        Ok(child)
    }

    /// The element children of `node` as a JSON object.
    ///
    /// Children with element children of their own become nested objects,
    /// other children their text. Repeated names collect into an array.
    ///
    /// ```rust
    /// use xmlpath::Document;
    /// use serde_json::json;
    ///
    /// let doc = Document::parse("<r><a>1</a><b><c>x</c></b><a>2</a></r>")?;
    /// let r = doc.document_element().unwrap();
    /// assert_eq!(doc.children_as_map(r), json!({"a": ["1", "2"], "b": {"c": "x"}}));
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn children_as_map(&self, node: Node) -> JsonValue {
        let mut map = Map::new();
        for child in self.children(node).filter(|n| self.is_element(*n)) {
            let key = self.qualified_name(child).unwrap_or_default();
            let has_elements = self.children(child).any(|n| self.is_element(n));
            let value = if has_elements {
                self.children_as_map(child)
            } else {
                JsonValue::String(self.text_content(child))
            };
            match map.get_mut(&key) {
                Some(JsonValue::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = JsonValue::Array(vec![first, value]);
                }
                None => {
                    map.insert(key, value);
                }
            }
        }
        JsonValue::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("My Key", "My-Key")]
    #[case("123abc", "abc")]
    #[case("---", "")]
    #[case("valid_name", "valid_name")]
    #[case("a.b:c", "abc")]
    #[case("_-1x", "x")]
    #[case("", "")]
    #[case("\u{B5}s", "s")]
    #[case("a\u{B2}", "a")]
    #[case("x\u{BD}", "x")]
    #[case("\u{AA}x", "x")]
    #[case("\u{B5}", "")]
    #[case("\u{E9}t\u{E9}", "\u{E9}t\u{E9}")]
    #[case("\u{660}a", "\u{660}a")]
    fn test_make_safe_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(make_safe_name(name), expected);
    }

    #[test]
    fn test_invalid_keys_are_kept() {
        let mut doc = Document::new();
        assert!(doc.load_from_json(r#"{"123": "x", "<&>": "y"}"#, "data"));
        assert_eq!(
            doc.to_string(doc.root()).unwrap(),
            r#"<data><InvalidName name="123">x</InvalidName><InvalidName name="&lt;&amp;&gt;">y</InvalidName></data>"#
        );
    }

    #[test]
    fn test_invalid_root_name() {
        let mut doc = Document::new();
        assert!(doc.load_from_json("{}", "42"));
        assert_eq!(
            doc.to_string(doc.root()).unwrap(),
            r#"<InvalidRootName name="42"/>"#
        );
    }

    #[test]
    fn test_arrays() {
        let mut doc = Document::new();
        assert!(doc.load_from_json(r#"{"e": [], "m": [[1, 2], {"k": true}]}"#, "root"));
        assert_eq!(
            doc.to_string(doc.root()).unwrap(),
            r#"<root><e array="empty"/><m><item>1</item><item>2</item></m><m><k>true</k></m></root>"#
        );
    }

    #[test]
    fn test_top_level_array() {
        let mut doc = Document::new();
        assert!(doc.load_from_json("[1, \"two\"]", "list"));
        assert_eq!(
            doc.to_string(doc.root()).unwrap(),
            "<list><item>1</item><item>two</item></list>"
        );
    }

    #[test]
    fn test_number_text_is_preserved() {
        let mut doc = Document::new();
        assert!(doc.load_from_json(r#"{"big": 123456789012345678901234567890, "f": 1.50}"#, "root"));
        let root = doc.root();
        assert_eq!(
            doc.get_string_value(root, "/root/big", None),
            Some("123456789012345678901234567890".to_string())
        );
        assert_eq!(doc.get_string_value(root, "/root/f", None), Some("1.50".to_string()));
    }

    #[test]
    fn test_not_a_container() {
        let mut doc = Document::new();
        assert!(!doc.load_from_json("42", "root"));
        assert!(!doc.load_from_json("{not json", "root"));
        // the document element is still seeded
        assert_eq!(doc.to_string(doc.root()).unwrap(), "<root/>");
    }

    #[test]
    fn test_invalid_utf8_bytes() {
        let mut doc = Document::new();
        assert!(doc.load_from_json_bytes(b"{\"a\": \"x\xffy\"}", "root"));
        assert_eq!(doc.to_string(doc.root()).unwrap(), "<root><a>xy</a></root>");
    }

    #[test]
    fn test_children_as_map() {
        let doc = Document::parse("<r><a>1</a><a>2</a><a>3</a><b/></r>").unwrap();
        let r = doc.document_element().unwrap();
        assert_eq!(
            doc.children_as_map(r),
            json!({"a": ["1", "2", "3"], "b": ""})
        );
    }
}
