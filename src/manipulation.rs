use crate::document::{Document, Node};
use crate::error::Error;
use crate::xmlvalue::{Value, ValueType};

/// Manipulation of the tree structure.
///
/// This maintains an XML structure:
/// - There is at most one document element under the root node.
/// - Text, CDATA and entity references cannot exist directly under the root.
/// - You cannot add a node to a node that is not an element or the
///   root node.
/// - Attributes can only be added to elements; adding an attribute replaces
///   an existing attribute with the same name.
///
/// It also ensures that text nodes are consolidated:
/// two text nodes never appear consecutively. If you
/// add a text node after or before another text node,
/// the text is appended to the existing text node,
/// and the added text node is removed. This also
/// happens if you remove a node causing two text
/// nodes to be adjacent; the second text node is
/// removed.
impl Document {
    /// Append a child to the end of the children of the given parent.
    ///
    /// It is now the new last node of the parent. Attribute nodes are added
    /// to the attributes of the parent instead.
    pub fn append(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        if self.is_attribute(child) {
            return self.add_attribute_node(parent, child);
        }
        self.add_structure_check(Some(parent), child, None)?;
        self.remove_structure_check(child)?;
        self.detach_consolidate(child)?;
        if self.add_consolidate_text_nodes(child, self.last_child(parent), None) {
            return Ok(());
        }
        parent.get().checked_append(child.get(), self.arena_mut())?;
        Ok(())
    }

    /// Append a text node to a parent node given text.
    pub fn append_text(&mut self, parent: Node, text: &str) -> Result<(), Error> {
        let text_node = self.new_text(text);
        self.append(parent, text_node)
    }

    /// Prepend a child to the beginning of the children of the given parent.
    ///
    /// It is now the new first node of the parent, though it still comes
    /// after the attributes.
    pub fn prepend(&mut self, parent: Node, child: Node) -> Result<(), Error> {
        if self.is_attribute(child) {
            return self.add_attribute_node(parent, child);
        }
        self.add_structure_check(Some(parent), child, None)?;
        self.remove_structure_check(child)?;
        self.detach_consolidate(child)?;
        if self.add_consolidate_text_nodes(child, None, self.first_child(parent)) {
            return Ok(());
        }
        if let Some(last_attribute) = self.last_attribute(parent) {
            last_attribute
                .get()
                .checked_insert_after(child.get(), self.arena_mut())?;
        } else {
            parent
                .get()
                .checked_prepend(child.get(), self.arena_mut())?;
        }
        Ok(())
    }

    /// Insert a new sibling after a reference node.
    pub fn insert_after(&mut self, reference_node: Node, new_sibling: Node) -> Result<(), Error> {
        self.sibling_check(reference_node, new_sibling)?;
        self.add_structure_check(self.parent(reference_node), new_sibling, None)?;
        self.remove_structure_check(new_sibling)?;
        self.detach_consolidate(new_sibling)?;
        if self.add_consolidate_text_nodes(
            new_sibling,
            Some(reference_node),
            self.next_sibling(reference_node),
        ) {
            return Ok(());
        }
        reference_node
            .get()
            .checked_insert_after(new_sibling.get(), self.arena_mut())?;
        Ok(())
    }

    /// Insert a new sibling before a reference node.
    pub fn insert_before(&mut self, reference_node: Node, new_sibling: Node) -> Result<(), Error> {
        self.sibling_check(reference_node, new_sibling)?;
        self.add_structure_check(self.parent(reference_node), new_sibling, None)?;
        self.remove_structure_check(new_sibling)?;
        self.detach_consolidate(new_sibling)?;
        if self.add_consolidate_text_nodes(
            new_sibling,
            self.previous_sibling(reference_node),
            Some(reference_node),
        ) {
            return Ok(());
        }
        reference_node
            .get()
            .checked_insert_before(new_sibling.get(), self.arena_mut())?;
        Ok(())
    }

    /// Replace a node with another one; the replaced node is removed.
    ///
    /// This is the way to swap out the document element.
    pub fn replace(&mut self, old: Node, new: Node) -> Result<(), Error> {
        self.sibling_check(old, new)?;
        self.add_structure_check(self.parent(old), new, Some(old))?;
        self.remove_structure_check(new)?;
        self.detach_consolidate(new)?;
        old.get().checked_insert_before(new.get(), self.arena_mut())?;
        self.remove(old)
    }

    /// Detach a node (and its descendants) from the tree.
    ///
    /// It now becomes an unattached fragment, still owned by the document.
    pub fn detach(&mut self, node: Node) -> Result<(), Error> {
        self.remove_structure_check(node)?;
        self.detach_consolidate(node)
    }

    /// Remove a node (and its descendants) from the document.
    pub fn remove(&mut self, node: Node) -> Result<(), Error> {
        self.remove_structure_check(node)?;
        let prev_node = self.previous_sibling(node);
        let next_node = self.next_sibling(node);
        node.get().remove_subtree(self.arena_mut());
        self.remove_consolidate_text_nodes(prev_node, next_node);
        Ok(())
    }

    /// Make a deep copy of a node, its attributes and its descendants.
    ///
    /// The copy is unattached.
    pub fn clone_node(&mut self, node: Node) -> Result<Node, Error> {
        if self.is_root(node) {
            return Err(Error::InvalidOperation("Cannot clone document root".into()));
        }
        let copy = self.new_node(self.value(node).clone());
        let originals = node.get().children(self.arena()).collect::<Vec<_>>();
        for original in originals {
            let child_copy = self.clone_node(Node::new(original))?;
            copy.get().checked_append(child_copy.get(), self.arena_mut())?;
        }
        Ok(copy)
    }

    fn add_attribute_node(&mut self, element: Node, attribute: Node) -> Result<(), Error> {
        if !self.is_element(element) {
            return Err(Error::NotElement(element));
        }
        let name_id = self.attribute(attribute).map(|a| a.name_id);
        let existing = self
            .attribute_nodes(element)
            .find(|n| *n != attribute && self.attribute(*n).map(|a| a.name_id) == name_id);
        if let Some(existing) = existing {
            existing.get().remove_subtree(self.arena_mut());
        }
        attribute.get().detach(self.arena_mut());
        if let Some(last_attribute) = self.last_attribute(element) {
            last_attribute
                .get()
                .checked_insert_after(attribute.get(), self.arena_mut())?;
        } else {
            element
                .get()
                .checked_prepend(attribute.get(), self.arena_mut())?;
        }
        Ok(())
    }

    fn sibling_check(&self, reference_node: Node, new_sibling: Node) -> Result<(), Error> {
        if self.is_attribute(reference_node) || self.is_attribute(new_sibling) {
            return Err(Error::InvalidOperation(
                "Attributes have no siblings; use append".into(),
            ));
        }
        if reference_node == new_sibling {
            return Err(Error::InvalidOperation(
                "Cannot insert a node next to itself".into(),
            ));
        }
        Ok(())
    }

    fn add_structure_check(
        &self,
        parent: Option<Node>,
        child: Node,
        replacing: Option<Node>,
    ) -> Result<(), Error> {
        let parent = parent.ok_or_else(|| {
            Error::InvalidOperation("Cannot create siblings for document root".into())
        })?;
        if !matches!(
            self.value_type(parent),
            ValueType::Element | ValueType::Root
        ) {
            return Err(Error::InvalidOperation(
                "Cannot add children to non-element and non-root node".into(),
            ));
        }
        // runs before the child is detached
        if self.ancestors(parent).any(|n| n == child) {
            return Err(Error::InvalidOperation(
                "Cannot add a node inside itself".into(),
            ));
        }
        match self.value_type(child) {
            ValueType::Root => {
                return Err(Error::InvalidOperation("Cannot move document root".into()));
            }
            ValueType::Element => {
                if self.is_root(parent) {
                    let other_element = self.children(parent).any(|n| {
                        n != child && Some(n) != replacing && self.is_element(n)
                    });
                    if other_element {
                        return Err(Error::InvalidOperation(
                            "Cannot add extra element under document root".into(),
                        ));
                    }
                }
            }
            ValueType::Text | ValueType::CData | ValueType::EntityRef => {
                if self.is_root(parent) {
                    return Err(Error::InvalidOperation(
                        "Cannot add text under document root".into(),
                    ));
                }
            }
            ValueType::Attribute => {
                return Err(Error::InvalidOperation(
                    "Attributes are not children".into(),
                ));
            }
            ValueType::ProcessingInstruction | ValueType::Comment => {
                // these can exist everywhere
            }
        }
        Ok(())
    }

    fn remove_structure_check(&self, node: Node) -> Result<(), Error> {
        if self.is_root(node) {
            return Err(Error::InvalidOperation(
                "Cannot remove document root".into(),
            ));
        }
        Ok(())
    }

    // detach from the current position, merging the text nodes that
    // become adjacent
    fn detach_consolidate(&mut self, node: Node) -> Result<(), Error> {
        if self.parent(node).is_none() {
            return Ok(());
        }
        let prev_node = self.previous_sibling(node);
        let next_node = self.next_sibling(node);
        node.get().detach(self.arena_mut());
        self.remove_consolidate_text_nodes(prev_node, next_node);
        Ok(())
    }

    fn add_consolidate_text_nodes(
        &mut self,
        node: Node,
        prev_node: Option<Node>,
        next_node: Option<Node>,
    ) -> bool {
        let added_text = if let Value::Text(t) = self.value(node) {
            t.get().to_string()
        } else {
            return false;
        };

        // due to consolidation, two text nodes can never be adjacent,
        // so consolidate with the previous node or next node is fine
        if let Some(prev_node) = prev_node {
            if let Value::Text(prev) = self.value_mut(prev_node) {
                let mut s = prev.get().to_string();
                s.push_str(&added_text);
                prev.set(s);
                // remove the text node we wanted to insert as it's now consolidated
                node.get().remove(self.arena_mut());
                return true;
            }
        }
        if let Some(next_node) = next_node {
            if let Value::Text(next) = self.value_mut(next_node) {
                let mut s = added_text;
                s.push_str(next.get());
                next.set(s);
                node.get().remove(self.arena_mut());
                return true;
            }
        }
        false
    }

    fn remove_consolidate_text_nodes(
        &mut self,
        prev_node: Option<Node>,
        next_node: Option<Node>,
    ) -> bool {
        let (prev_node, next_node) = match (prev_node, next_node) {
            (Some(prev_node), Some(next_node)) => (prev_node, next_node),
            _ => return false,
        };
        let to_add = match (self.value(prev_node), self.value(next_node)) {
            (Value::Text(_), Value::Text(next)) => next.get().to_string(),
            _ => return false,
        };
        if let Value::Text(prev) = self.value_mut(prev_node) {
            let mut s = prev.get().to_string();
            s.push_str(&to_add);
            prev.set(s);
        }
        next_node.get().remove(self.arena_mut());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_consolidates_text() {
        let mut doc = Document::parse("<a>one</a>").unwrap();
        let a = doc.document_element().unwrap();
        doc.append_text(a, "two").unwrap();
        assert_eq!(doc.children(a).count(), 1);
        assert_eq!(doc.text_content(a), "onetwo");
    }

    #[test]
    fn test_remove_consolidates_text() {
        let mut doc = Document::parse("<a>one<b/>two</a>").unwrap();
        let a = doc.document_element().unwrap();
        let b = doc.children(a).nth(1).unwrap();
        doc.remove(b).unwrap();
        assert_eq!(doc.children(a).count(), 1);
        assert_eq!(doc.to_string(doc.root()).unwrap(), "<a>onetwo</a>");
    }

    #[test]
    fn test_second_document_element_rejected() {
        let mut doc = Document::parse("<a/>").unwrap();
        let b = doc.create_element("b").unwrap();
        let root = doc.root();
        assert!(doc.append(root, b).is_err());
    }

    #[test]
    fn test_replace_document_element() {
        let mut doc = Document::parse("<a/>").unwrap();
        let a = doc.document_element().unwrap();
        let b = doc.create_element("b").unwrap();
        doc.replace(a, b).unwrap();
        assert_eq!(doc.document_element(), Some(b));
        assert_eq!(doc.to_string(doc.root()).unwrap(), "<b/>");
    }

    #[test]
    fn test_prepend_goes_after_attributes() {
        let mut doc = Document::parse(r#"<a x="1"><b/></a>"#).unwrap();
        let a = doc.document_element().unwrap();
        let c = doc.create_element("c").unwrap();
        doc.prepend(a, c).unwrap();
        assert_eq!(doc.first_child(a), Some(c));
        assert_eq!(doc.attribute_nodes(a).count(), 1);
        assert_eq!(doc.to_string(a).unwrap(), r#"<a x="1"><c/><b/></a>"#);
    }

    #[test]
    fn test_append_attribute_replaces_same_name() {
        let mut doc = Document::parse(r#"<a x="1"/>"#).unwrap();
        let a = doc.document_element().unwrap();
        let name = doc.add_name("x");
        let prefix = doc.empty_prefix();
        let attribute = doc.new_attribute(name, prefix, "2");
        doc.append(a, attribute).unwrap();
        assert_eq!(doc.attribute_nodes(a).collect::<Vec<_>>(), vec![attribute]);
        assert_eq!(doc.to_string(a).unwrap(), r#"<a x="2"/>"#);
    }

    #[test]
    fn test_clone_node_is_deep_and_detached() {
        let mut doc = Document::parse(r#"<a><b y="1">text</b></a>"#).unwrap();
        let a = doc.document_element().unwrap();
        let b = doc.first_child(a).unwrap();
        let copy = doc.clone_node(b).unwrap();
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.to_string(copy).unwrap(), r#"<b y="1">text</b>"#);
    }

    #[test]
    fn test_append_into_own_descendant_keeps_tree() {
        let mut doc = Document::parse("<a><b/>t</a>").unwrap();
        let a = doc.document_element().unwrap();
        let b = doc.first_child(a).unwrap();
        assert!(doc.append(b, a).is_err());
        assert!(doc.prepend(b, a).is_err());
        assert!(doc.append(a, a).is_err());
        assert_eq!(doc.document_element(), Some(a));
        assert_eq!(doc.to_string(doc.root()).unwrap(), "<a><b/>t</a>");
    }

    #[test]
    fn test_insert_next_to_own_descendant_keeps_tree() {
        let mut doc = Document::parse("<r><a><b/><c/></a></r>").unwrap();
        let r = doc.document_element().unwrap();
        let a = doc.first_child(r).unwrap();
        let b = doc.first_child(a).unwrap();
        let c = doc.last_child(a).unwrap();
        assert!(doc.insert_after(b, a).is_err());
        assert!(doc.insert_before(c, a).is_err());
        assert!(doc.insert_after(b, b).is_err());
        assert!(doc.replace(b, a).is_err());
        assert!(doc.replace(b, b).is_err());
        assert_eq!(doc.to_string(r).unwrap(), "<r><a><b/><c/></a></r>");
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(doc.remove(root).is_err());
    }
}
