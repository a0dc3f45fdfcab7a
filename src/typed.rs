use std::fmt::{Display, Formatter};

use log::error;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::document::{Document, Node};
use crate::error::Error;
use crate::xmlvalue::ValueType;
use crate::xpath::{format_number, XPathValue};

/// A value that can be stored as text with [`Document::set_value`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            ScalarValue::Int(i) => write!(f, "{}", i),
            ScalarValue::Float(n) => write!(f, "{}", format_number(*n)),
            ScalarValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Int(i)
    }
}

impl From<i32> for ScalarValue {
    fn from(i: i32) -> Self {
        ScalarValue::Int(i.into())
    }
}

impl From<u32> for ScalarValue {
    fn from(i: u32) -> Self {
        ScalarValue::Int(i.into())
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Float(n)
    }
}

impl From<f32> for ScalarValue {
    fn from(n: f32) -> Self {
        ScalarValue::Float(n.into())
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::String(s)
    }
}

// Optional surrounding whitespace, an optional sign, a decimal number with
// an optional fraction and exponent. No hex, no `inf` or `nan`.
pub(crate) fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let bytes = s.as_bytes();
    let mut i = 0;
    let integral = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    i += integral;
    let mut fraction = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        fraction = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        i += fraction;
    }
    if integral == 0 && fraction == 0 {
        return false;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exponent = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        if exponent == 0 {
            return false;
        }
        i += exponent;
    }
    i == bytes.len()
}

// integer value of a numeric string, truncating any fraction
fn to_int(s: &str) -> Option<i64> {
    if !is_numeric(s) {
        return None;
    }
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|n| n as i64))
}

fn to_float(s: &str) -> Option<f64> {
    if !is_numeric(s) {
        return None;
    }
    s.trim().parse::<f64>().ok()
}

fn to_bool(s: &str) -> bool {
    let s = s.trim().to_lowercase();
    s == "true" || s == "yes" || to_int(&s).is_some_and(|i| i != 0)
}

/// Typed reading and writing of the text at a path.
///
/// ```rust
/// use xmlpath::Document;
///
/// let mut doc = Document::new();
/// let root = doc.root();
/// doc.set_int_value(root, "/settings/retries", 3);
/// doc.set_bool_value(root, "/settings/@enabled", true);
/// assert_eq!(doc.get_int_value(root, "/settings/retries", 0), 3);
/// assert!(doc.get_bool_value(root, "/settings/@enabled", false));
/// assert_eq!(doc.get_float_value(root, "/settings/timeout", 2.5), 2.5);
/// assert_eq!(
///     doc.to_string(root)?,
///     r#"<settings enabled="true"><retries>3</retries></settings>"#
/// );
/// # Ok::<(), xmlpath::Error>(())
/// ```
impl Document {
    /// The text at `path`.
    ///
    /// When `path` selects nodes, the text content of all of them is
    /// concatenated. Other results are converted to a string. `default` is
    /// returned when `path` selects no nodes or cannot be evaluated.
    pub fn get_string_value(
        &self,
        context: Node,
        path: &str,
        default: Option<&str>,
    ) -> Option<String> {
        match self.evaluate(context, path) {
            Ok(XPathValue::NodeSet(nodes)) if nodes.is_empty() => default.map(str::to_string),
            Ok(XPathValue::NodeSet(nodes)) => {
                Some(nodes.iter().map(|n| self.text_content(*n)).collect())
            }
            Ok(value) => Some(value.to_string_value(self)),
            Err(e) => {
                error!("{}", e);
                default.map(str::to_string)
            }
        }
    }

    /// The text at `path` as a boolean.
    ///
    /// `true`, `yes` (in any case) and non-zero numbers are true, any other
    /// text is false.
    pub fn get_bool_value(&self, context: Node, path: &str, default: bool) -> bool {
        match self.get_string_value(context, path, None) {
            Some(s) => to_bool(&s),
            None => default,
        }
    }

    /// The text at `path` as an integer; a fraction is truncated.
    ///
    /// Text that is not numeric is logged and gives `default`.
    pub fn get_int_value(&self, context: Node, path: &str, default: i64) -> i64 {
        match self.get_string_value(context, path, None) {
            Some(s) => to_int(&s).unwrap_or_else(|| {
                error!("{} at {}", Error::NotNumeric(s), path);
                default
            }),
            None => default,
        }
    }

    /// The text at `path` as a float.
    ///
    /// Text that is not numeric is logged and gives `default`.
    pub fn get_float_value(&self, context: Node, path: &str, default: f64) -> f64 {
        match self.get_string_value(context, path, None) {
            Some(s) => to_float(&s).unwrap_or_else(|| {
                error!("{} at {}", Error::NotNumeric(s), path);
                default
            }),
            None => default,
        }
    }

    /// Set the text at `path`, creating the path if needed.
    ///
    /// The text children of an element are replaced by a single text node
    /// placed first; other children stay. An attribute gets `value` as its
    /// value. Returns the node written to.
    pub fn set_string_value(&mut self, context: Node, path: &str, value: &str) -> Option<Node> {
        let node = self.select_single_node(context, path, true)?;
        match self.replace_text(node, value) {
            Ok(()) => Some(node),
            Err(e) => {
                error!("cannot set value at {}: {}", path, e);
                None
            }
        }
    }

    fn replace_text(&mut self, node: Node, value: &str) -> Result<(), Error> {
        match self.value_type(node) {
            ValueType::Element => {
                let texts = self
                    .children(node)
                    .filter(|n| self.value(*n).is_text_like())
                    .collect::<Vec<_>>();
                for text in texts {
                    self.remove(text)?;
                }
                if !value.is_empty() {
                    let text = self.new_text(value);
                    self.prepend(node, text)?;
                }
            }
            ValueType::Attribute => {
                if let Some(attribute) = self.attribute_mut(node) {
                    attribute.set(value);
                }
            }
            ValueType::Text | ValueType::CData => {
                if let Some(text) = self.text_mut(node) {
                    text.set(value);
                }
            }
            other => {
                return Err(Error::InvalidOperation(format!(
                    "cannot set the text of a {:?} node",
                    other
                )));
            }
        }
        Ok(())
    }

    /// Set `true` or `false` at `path`.
    pub fn set_bool_value(&mut self, context: Node, path: &str, value: bool) -> Option<Node> {
        self.set_value(context, path, value)
    }

    pub fn set_int_value(&mut self, context: Node, path: &str, value: i64) -> Option<Node> {
        self.set_value(context, path, value)
    }

    /// Set a float at `path`; integral values are written without a
    /// fraction.
    pub fn set_float_value(&mut self, context: Node, path: &str, value: f64) -> Option<Node> {
        self.set_value(context, path, value)
    }

    /// Set a value of any supported type at `path`.
    pub fn set_value(
        &mut self,
        context: Node,
        path: &str,
        value: impl Into<ScalarValue>,
    ) -> Option<Node> {
        let text = value.into().to_string();
        self.set_string_value(context, path, &text)
    }
}
