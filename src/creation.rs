use crate::document::{Document, Node};
use crate::interned::{NameId, PrefixId};
use crate::xmlvalue::{
    Attribute, Comment, Element, EntityRef, ProcessingInstruction, Text, Value,
};

/// Creation of unattached nodes.
///
/// A created node belongs to the document but has no parent until it is
/// placed with one of the [manipulation](crate::Document::append) methods.
impl Document {
    pub(crate) fn new_node(&mut self, value: Value) -> Node {
        Node::new(self.arena.new_node(value))
    }

    /// Create a new, unattached text node.
    pub fn new_text(&mut self, text: &str) -> Node {
        self.new_node(Value::Text(Text::new(text.to_string())))
    }

    /// Create a new, unattached CDATA section.
    pub fn new_cdata(&mut self, text: &str) -> Node {
        self.new_node(Value::CData(Text::new(text.to_string())))
    }

    /// Create a new, unattached element node with the given name and the
    /// prefix it should be written with.
    ///
    /// Use [`Document::create_element`] to create an element from a
    /// qualified name string instead.
    pub fn new_element(&mut self, name_id: NameId, prefix_id: PrefixId) -> Node {
        self.new_node(Value::Element(Element::new(name_id, prefix_id)))
    }

    /// Create a new, unattached attribute node.
    ///
    /// Attach it to an element with [`Document::append`].
    pub fn new_attribute(&mut self, name_id: NameId, prefix_id: PrefixId, value: &str) -> Node {
        self.new_node(Value::Attribute(Attribute::new(
            name_id,
            prefix_id,
            value.to_string(),
        )))
    }

    /// Create a new, unattached comment node.
    pub fn new_comment(&mut self, comment: &str) -> Node {
        self.new_node(Value::Comment(Comment::new(comment.to_string())))
    }

    /// Create a new, unattached entity reference, `name` without `&` and `;`.
    pub fn new_entity_ref(&mut self, name: &str) -> Node {
        self.new_node(Value::EntityRef(EntityRef::new(name.to_string())))
    }

    /// Create a new, unattached processing instruction.
    pub fn new_processing_instruction(&mut self, target: &str, data: Option<&str>) -> Node {
        self.new_node(Value::ProcessingInstruction(ProcessingInstruction::new(
            target.to_string(),
            data.map(|s| s.to_string()),
        )))
    }
}
