use crate::interned::{NameId, NamespaceId, PrefixId};

/// The type of the XML node.
///
/// Access it using [`Value::value_type`] or
/// [`Document::value_type`](crate::Document::value_type).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ValueType {
    /// Document root that holds everything.
    /// Note that this not the same as the document
    /// element.
    Root,
    /// Element; it has a name, attributes and namespace declarations.
    Element,
    /// Attribute; its parent is the element it belongs to.
    Attribute,
    /// Text.
    Text,
    /// CDATA section.
    CData,
    /// Comment.
    Comment,
    /// Reference to an entity that isn't expanded, like `&nbsp;`.
    EntityRef,
    /// Processing instruction.
    ProcessingInstruction,
}

/// An XML value.
///
/// Access it using [`Document::value`](crate::Document::value) or
/// mutably using [`Document::value_mut`](crate::Document::value_mut).
#[derive(Debug, Clone)]
pub enum Value {
    /// Document root that holds everything. Note that this not the same as the document
    /// element.
    Root,
    /// Element; it has a name and namespace declarations. Its attributes
    /// are separate nodes.
    Element(Element),
    /// Attribute node.
    Attribute(Attribute),
    /// Text. You can get and set the text value.
    Text(Text),
    /// CDATA section. Behaves as text for path queries.
    CData(Text),
    /// Comment.
    Comment(Comment),
    /// Unexpanded entity reference.
    EntityRef(EntityRef),
    /// Processing instruction.
    ProcessingInstruction(ProcessingInstruction),
}

impl Value {
    /// Returns the type of the XML value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Root => ValueType::Root,
            Value::Element(_) => ValueType::Element,
            Value::Attribute(_) => ValueType::Attribute,
            Value::Text(_) => ValueType::Text,
            Value::CData(_) => ValueType::CData,
            Value::Comment(_) => ValueType::Comment,
            Value::EntityRef(_) => ValueType::EntityRef,
            Value::ProcessingInstruction(_) => ValueType::ProcessingInstruction,
        }
    }

    // attributes live in the child list of their element, but they are
    // not normal children
    pub(crate) fn is_normal(&self) -> bool {
        !matches!(self, Value::Attribute(_))
    }

    pub(crate) fn is_text_like(&self) -> bool {
        matches!(self, Value::Text(_) | Value::CData(_))
    }
}

/// Namespace declarations made on an element: prefix to namespace.
pub type Prefixes = Vec<(PrefixId, NamespaceId)>;

/// XML element value.
///
/// Example: `<foo/>` or `<x:foo xmlns:x="http://example.com"/>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) name_id: NameId,
    pub(crate) prefix_id: PrefixId,
    pub(crate) prefixes: Prefixes,
}

impl Element {
    pub(crate) fn new(name_id: NameId, prefix_id: PrefixId) -> Self {
        Element {
            name_id,
            prefix_id,
            prefixes: Prefixes::new(),
        }
    }

    /// The name of the element.
    pub fn name(&self) -> NameId {
        self.name_id
    }

    /// The prefix the element was created or parsed with.
    pub fn prefix(&self) -> PrefixId {
        self.prefix_id
    }

    /// Declare a prefix on this element, replacing an existing declaration
    /// of the same prefix.
    pub fn set_prefix(&mut self, prefix_id: PrefixId, namespace_id: NamespaceId) {
        if let Some(entry) = self.prefixes.iter_mut().find(|(p, _)| *p == prefix_id) {
            entry.1 = namespace_id;
        } else {
            self.prefixes.push((prefix_id, namespace_id));
        }
    }

    /// Get the namespace for a prefix, if declared on this element.
    ///
    /// This does not check for ancestor namespace declarations.
    pub fn get_namespace(&self, prefix_id: PrefixId) -> Option<NamespaceId> {
        self.prefixes
            .iter()
            .find(|(p, _)| *p == prefix_id)
            .map(|(_, n)| *n)
    }

    /// The namespace declarations made on this element.
    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }
}

/// XML attribute value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub(crate) name_id: NameId,
    pub(crate) prefix_id: PrefixId,
    pub(crate) value: String,
}

impl Attribute {
    pub(crate) fn new(name_id: NameId, prefix_id: PrefixId, value: String) -> Self {
        Attribute {
            name_id,
            prefix_id,
            value,
        }
    }

    /// The name of the attribute.
    pub fn name(&self) -> NameId {
        self.name_id
    }

    /// The prefix the attribute was created or parsed with.
    pub fn prefix(&self) -> PrefixId {
        self.prefix_id
    }

    /// The attribute value.
    pub fn get(&self) -> &str {
        &self.value
    }

    /// Replace the attribute value.
    pub fn set<S: Into<String>>(&mut self, value: S) {
        self.value = value.into();
    }
}

/// XML text value, also used for CDATA sections.
///
/// Example: `Bar` in `<foo>Bar</foo>`.
#[derive(Debug, Clone)]
pub struct Text {
    pub(crate) text: String,
}

impl Text {
    pub(crate) fn new(text: String) -> Self {
        Text { text }
    }

    /// Get the text value.
    pub fn get(&self) -> &str {
        &self.text
    }

    /// Set the text value.
    pub fn set<S: Into<String>>(&mut self, text: S) {
        self.text = text.into();
    }
}

/// XML comment.
///
/// Example: `<!-- foo -->`.
#[derive(Debug, Clone)]
pub struct Comment {
    pub(crate) text: String,
}

impl Comment {
    pub(crate) fn new(text: String) -> Self {
        Comment { text }
    }

    /// Get the comment text.
    pub fn get(&self) -> &str {
        &self.text
    }
}

/// Entity reference that was not expanded, like `&nbsp;`.
#[derive(Debug, Clone)]
pub struct EntityRef {
    pub(crate) name: String,
}

impl EntityRef {
    pub(crate) fn new(name: String) -> Self {
        EntityRef { name }
    }

    /// The entity name, without `&` and `;`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// XML processing instruction value.
///
/// Example: `<?foo?>` or `<?foo bar?>`.
#[derive(Debug, Clone)]
pub struct ProcessingInstruction {
    pub(crate) target: String,
    pub(crate) data: Option<String>,
}

impl ProcessingInstruction {
    pub(crate) fn new(target: String, data: Option<String>) -> Self {
        ProcessingInstruction { target, data }
    }

    /// Get processing instruction target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get processing instruction data.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}
