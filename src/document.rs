use indextree::{Arena, NodeId};

use crate::interned::{NameTable, NamespaceId, NamespaceTable, PrefixId, PrefixTable};
use crate::registry::NamespaceRegistry;
use crate::xmlvalue::Value;

pub(crate) type XmlArena = Arena<Value>;

pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A node in the XML tree.
/// This is a lightweight value and can be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(NodeId);

impl Node {
    #[inline]
    pub(crate) fn new(node_id: NodeId) -> Self {
        Node(node_id)
    }

    #[inline]
    pub(crate) fn get(&self) -> NodeId {
        self.0
    }
}

/// An XML document: the tree, the names used in it and its
/// [`NamespaceRegistry`].
///
/// All nodes belong to the document that created them. A node that is
/// detached (or freshly created) stays owned by the document until it is
/// attached again or removed; it can never be attached in two places.
///
/// The document is implemented in several sections focusing on different
/// aspects: tree access, manipulation, names, parsing, serialization, path
/// resolution, typed values and JSON import.
pub struct Document {
    pub(crate) arena: XmlArena,
    pub(crate) root: Node,
    pub(crate) namespace_lookup: NamespaceTable,
    pub(crate) prefix_lookup: PrefixTable,
    pub(crate) name_lookup: NameTable,
    pub(crate) no_namespace_id: NamespaceId,
    pub(crate) empty_prefix_id: PrefixId,
    pub(crate) xml_namespace_id: NamespaceId,
    pub(crate) xml_prefix_id: PrefixId,
    pub(crate) registry: NamespaceRegistry,
}

impl Document {
    /// Create a new, empty document: a root node without a document element.
    pub fn new() -> Self {
        let mut namespace_lookup = NamespaceTable::new();
        let no_namespace_id = namespace_lookup.intern(String::new());
        let xml_namespace_id = namespace_lookup.intern(XML_NAMESPACE.to_string());
        let mut prefix_lookup = PrefixTable::new();
        let empty_prefix_id = prefix_lookup.intern(String::new());
        let xml_prefix_id = prefix_lookup.intern("xml".to_string());
        let mut arena = XmlArena::new();
        let root = Node::new(arena.new_node(Value::Root));
        Document {
            arena,
            root,
            namespace_lookup,
            prefix_lookup,
            name_lookup: NameTable::new(),
            no_namespace_id,
            empty_prefix_id,
            xml_namespace_id,
            xml_prefix_id,
            registry: NamespaceRegistry::new(),
        }
    }

    /// The document root node. This is not the document element.
    #[inline]
    pub fn root(&self) -> Node {
        self.root
    }

    /// Bind `prefix` to `uri` for every path evaluated against this document.
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let mut doc = Document::parse(r#"<a xmlns="http://example.com/a"><b>x</b></a>"#)?;
    /// doc.register_namespace("ex", "http://example.com/a");
    /// let root = doc.root();
    /// assert_eq!(doc.get_string_value(root, "/ex:a/ex:b", None), Some("x".to_string()));
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn register_namespace(&mut self, prefix: &str, uri: &str) {
        self.registry.register(prefix, uri);
    }

    /// The prefix bindings registered on this document.
    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.registry
    }

    #[inline]
    pub(crate) fn arena(&self) -> &XmlArena {
        &self.arena
    }

    #[inline]
    pub(crate) fn arena_mut(&mut self) -> &mut XmlArena {
        &mut self.arena
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
