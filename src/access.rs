use indextree::NodeEdge as IndexTreeNodeEdge;

use crate::document::{Document, Node};
use crate::xmlvalue::ValueType;

/// Node edges.
///
/// Used by [`Document::traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEdge {
    /// The start edge of a node. In case of an element
    /// this is the start tag.
    Start(Node),
    /// The end edge of a node. In case of an element
    /// this is the end tag.
    End(Node),
}

/// Accessing the tree structure.
///
/// Attributes are nodes too: their parent is the element they belong to,
/// but they are not part of [`Document::children`], the sibling iterators or
/// [`Document::descendants`]. Use [`Document::attribute_nodes`] to reach
/// them.
impl Document {
    /// Obtain the document element: the single element under the root.
    pub fn document_element(&self) -> Option<Node> {
        self.children(self.root)
            .find(|child| self.value_type(*child) == ValueType::Element)
    }

    /// The topmost ancestor of a node.
    ///
    /// This is the root for attached nodes, and the top of the fragment for
    /// nodes that were created or detached.
    pub fn top(&self, node: Node) -> Node {
        self.ancestors(node).last().unwrap_or(node)
    }

    /// Return true if the node is reachable from the document root.
    pub fn is_attached(&self, node: Node) -> bool {
        self.top(node) == self.root
    }

    /// Return true if the node has been removed from the document.
    pub fn is_removed(&self, node: Node) -> bool {
        self.arena()[node.get()].is_removed()
    }

    /// Get parent node.
    ///
    /// Returns [`None`] if this is the root node or an unattached node.
    /// The parent of an attribute is its element.
    pub fn parent(&self, node: Node) -> Option<Node> {
        self.arena()[node.get()].parent().map(Node::new)
    }

    fn is_normal_id(&self, node_id: &indextree::NodeId) -> bool {
        self.arena()[*node_id].get().is_normal()
    }

    /// Children of a node, attributes excluded.
    pub fn children(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get()
            .children(self.arena())
            .skip_while(move |n| !self.is_normal_id(n))
            .map(Node::new)
    }

    /// Attribute nodes of an element, in the order they were added.
    pub fn attribute_nodes(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get()
            .children(self.arena())
            .take_while(move |n| !self.is_normal_id(n))
            .map(Node::new)
    }

    /// Get first child, attributes excluded.
    pub fn first_child(&self, node: Node) -> Option<Node> {
        self.children(node).next()
    }

    /// Get last child, attributes excluded.
    pub fn last_child(&self, node: Node) -> Option<Node> {
        let last_child = self.arena()[node.get()].last_child()?;
        if self.is_normal_id(&last_child) {
            Some(Node::new(last_child))
        } else {
            None
        }
    }

    // the last attribute node; new attributes are inserted after it
    pub(crate) fn last_attribute(&self, node: Node) -> Option<Node> {
        self.attribute_nodes(node).last()
    }

    /// Get next sibling.
    ///
    /// Attributes only have attributes as siblings, normal nodes only
    /// normal nodes.
    pub fn next_sibling(&self, node: Node) -> Option<Node> {
        let current_normal = self.is_normal_id(&node.get());
        let next_sibling = self.arena()[node.get()].next_sibling()?;
        if self.is_normal_id(&next_sibling) != current_normal {
            return None;
        }
        Some(Node::new(next_sibling))
    }

    /// Get previous sibling, with the same restriction as
    /// [`Document::next_sibling`].
    pub fn previous_sibling(&self, node: Node) -> Option<Node> {
        let current_normal = self.is_normal_id(&node.get());
        let previous_sibling = self.arena()[node.get()].previous_sibling()?;
        if self.is_normal_id(&previous_sibling) != current_normal {
            return None;
        }
        Some(Node::new(previous_sibling))
    }

    /// Iterator over ancestor nodes, including this one, up to the top.
    pub fn ancestors(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().ancestors(self.arena()).map(Node::new)
    }

    /// Iterator over the descendants of a node, including the node itself,
    /// in document order. Attributes are not included.
    pub fn descendants(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get()
            .descendants(self.arena())
            .filter(move |n| self.is_normal_id(n))
            .map(Node::new)
    }

    /// Iterator over this node and its following siblings.
    pub fn following_siblings(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        let current_normal = self.is_normal_id(&node.get());
        node.get()
            .following_siblings(self.arena())
            .filter(move |n| self.is_normal_id(n) == current_normal)
            .map(Node::new)
    }

    /// Iterator over this node and its preceding siblings, nearest first.
    pub fn preceding_siblings(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        let current_normal = self.is_normal_id(&node.get());
        node.get()
            .preceding_siblings(self.arena())
            .filter(move |n| self.is_normal_id(n) == current_normal)
            .map(Node::new)
    }

    /// All nodes after this one in document order, excluding its own
    /// descendants and any attributes.
    pub fn following(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        let mut result = Vec::new();
        let mut current = Some(node);
        // an attribute is followed by the content of its element
        if self.value_type(node) == ValueType::Attribute {
            if let Some(parent) = self.parent(node) {
                result.extend(self.descendants(parent).skip(1));
                current = Some(parent);
            }
        }
        while let Some(ancestor) = current {
            let mut sibling = ancestor;
            while let Some(next) = self.next_sibling(sibling) {
                result.extend(self.descendants(next));
                sibling = next;
            }
            current = self.parent(ancestor);
        }
        result.into_iter()
    }

    /// All nodes before this one in reverse document order, excluding its
    /// ancestors and any attributes.
    pub fn preceding(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        let mut result = Vec::new();
        let mut current = Some(node);
        if self.value_type(node) == ValueType::Attribute {
            current = self.parent(node);
        }
        while let Some(ancestor) = current {
            let mut sibling = ancestor;
            while let Some(previous) = self.previous_sibling(sibling) {
                // descendants is not double ended, so reverse a copy
                let descendants = self.descendants(previous).collect::<Vec<_>>();
                result.extend(descendants.into_iter().rev());
                sibling = previous;
            }
            current = self.parent(ancestor);
        }
        result.into_iter()
    }

    /// Traverse over node edges.
    ///
    /// This can be used to write a serializer. Elements produce a start and
    /// an end edge; attribute nodes are skipped.
    pub fn traverse(&self, node: Node) -> impl Iterator<Item = NodeEdge> + '_ {
        node.get()
            .traverse(self.arena())
            .filter_map(move |edge| match edge {
                IndexTreeNodeEdge::Start(node_id) if self.is_normal_id(&node_id) => {
                    Some(NodeEdge::Start(Node::new(node_id)))
                }
                IndexTreeNodeEdge::End(node_id) if self.is_normal_id(&node_id) => {
                    Some(NodeEdge::End(Node::new(node_id)))
                }
                _ => None,
            })
    }

    /// Every node under `node` (itself included) in document order:
    /// an element is followed by its attributes, then by its content.
    pub(crate) fn document_order(&self, node: Node) -> impl Iterator<Item = Node> + '_ {
        node.get().descendants(self.arena()).map(Node::new)
    }
}
