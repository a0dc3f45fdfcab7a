use crate::document::{Document, Node};
use crate::xmlvalue::{Attribute, Element, Text, Value, ValueType};

/// Obtain XML values and their types.
///
/// These are handy if you only need to match against a single value or know
/// the value type already. If you want to handle all value types, use a
/// `match` statement on [`Value`](crate::xmlvalue::Value) instead.
impl Document {
    /// Access to the XML value for this node.
    #[inline]
    pub fn value(&self, node: Node) -> &Value {
        self.arena[node.get()].get()
    }

    /// Mutable access to the XML value for this node.
    #[inline]
    pub fn value_mut(&mut self, node: Node) -> &mut Value {
        self.arena[node.get()].get_mut()
    }

    /// Get the [`ValueType`](crate::xmlvalue::ValueType) of a node.
    pub fn value_type(&self, node: Node) -> ValueType {
        self.value(node).value_type()
    }

    /// Return true if node is the document root.
    pub fn is_root(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Root
    }

    /// Return true if node is an element.
    pub fn is_element(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Element
    }

    /// Return true if node is an attribute.
    pub fn is_attribute(&self, node: Node) -> bool {
        self.value_type(node) == ValueType::Attribute
    }

    /// Return true if node is text or a CDATA section.
    pub fn is_text(&self, node: Node) -> bool {
        self.value(node).is_text_like()
    }

    /// If this node's value is an element, return a reference to it.
    pub fn element(&self, node: Node) -> Option<&Element> {
        if let Value::Element(element) = self.value(node) {
            Some(element)
        } else {
            None
        }
    }

    /// If this node's value is an element, return a mutable reference to it.
    pub fn element_mut(&mut self, node: Node) -> Option<&mut Element> {
        if let Value::Element(element) = self.value_mut(node) {
            Some(element)
        } else {
            None
        }
    }

    /// If this node's value is an attribute, return a reference to it.
    pub fn attribute(&self, node: Node) -> Option<&Attribute> {
        if let Value::Attribute(attribute) = self.value(node) {
            Some(attribute)
        } else {
            None
        }
    }

    /// If this node's value is an attribute, return a mutable reference to it.
    pub fn attribute_mut(&mut self, node: Node) -> Option<&mut Attribute> {
        if let Value::Attribute(attribute) = self.value_mut(node) {
            Some(attribute)
        } else {
            None
        }
    }

    /// If this node's value is text or CDATA, return a reference to it.
    pub fn text(&self, node: Node) -> Option<&Text> {
        match self.value(node) {
            Value::Text(text) | Value::CData(text) => Some(text),
            _ => None,
        }
    }

    /// If this node's value is text or CDATA, return a reference to the string.
    pub fn text_str(&self, node: Node) -> Option<&str> {
        self.text(node).map(|t| t.get())
    }

    /// If this node's value is text or CDATA, return a mutable reference to it.
    pub fn text_mut(&mut self, node: Node) -> Option<&mut Text> {
        match self.value_mut(node) {
            Value::Text(text) | Value::CData(text) => Some(text),
            _ => None,
        }
    }

    /// The text content of a node, the XPath string-value.
    ///
    /// For the root and elements this is the concatenation of all
    /// descendant text and CDATA, in document order. For attributes it is
    /// the value; for text, comments and processing instructions their
    /// content. Unexpanded entity references contribute nothing.
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let doc = Document::parse("<a>one<b>two</b><![CDATA[three]]></a>")?;
    /// let a = doc.document_element().unwrap();
    /// assert_eq!(doc.text_content(a), "onetwothree");
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn text_content(&self, node: Node) -> String {
        match self.value(node) {
            Value::Root | Value::Element(_) => self
                .descendants(node)
                .filter_map(|n| self.text_str(n))
                .collect(),
            Value::Attribute(attribute) => attribute.get().to_string(),
            Value::Text(text) | Value::CData(text) => text.get().to_string(),
            Value::Comment(comment) => comment.get().to_string(),
            Value::ProcessingInstruction(pi) => pi.data().unwrap_or_default().to_string(),
            Value::EntityRef(_) => String::new(),
        }
    }
}
