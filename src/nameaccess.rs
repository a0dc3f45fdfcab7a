use xmlparser::XmlCharExt;

use crate::document::{Document, Node, XML_NAMESPACE};
use crate::error::Error;
use crate::interned::{Name, NameId, NamespaceId, PrefixId};
use crate::xmlvalue::{Prefixes, Value};

/// A resolved qualified name: the interned name plus the prefix it is
/// written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedName {
    pub(crate) name_id: NameId,
    pub(crate) prefix_id: PrefixId,
    pub(crate) namespace_id: NamespaceId,
}

/// Return true if `c` can start an XML name that has no colon.
pub(crate) fn is_ncname_start_char(c: char) -> bool {
    c != ':' && c.is_xml_name_start()
}

/// Return true if `c` can appear in an XML name that has no colon.
pub(crate) fn is_ncname_char(c: char) -> bool {
    c != ':' && c.is_xml_name()
}

/// Return true if `s` is usable as an XML name without a colon.
pub(crate) fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_ncname_start_char(c) => chars.all(is_ncname_char),
        _ => false,
    }
}

/// Split `prefix:local` into its parts; the prefix is empty when absent.
pub(crate) fn split_qname(qname: &str) -> (&str, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qname),
    }
}

/// Creation and lookup of names, namespaces and prefixes.
impl Document {
    /// Look up name without a namespace.
    pub fn name(&self, local: &str) -> Option<NameId> {
        self.name_ns(local, self.no_namespace_id)
    }

    /// Add name without a namespace.
    /// If the name already exists, return its id.
    pub fn add_name(&mut self, local: &str) -> NameId {
        self.add_name_ns(local, self.no_namespace_id)
    }

    /// Look up name with a namespace.
    pub fn name_ns(&self, local: &str, namespace_id: NamespaceId) -> Option<NameId> {
        self.name_lookup.get(&Name::new(local, namespace_id))
    }

    /// Add name with a namespace.
    /// If the name already exists, return its id.
    pub fn add_name_ns(&mut self, local: &str, namespace_id: NamespaceId) -> NameId {
        self.name_lookup.intern(Name::new(local, namespace_id))
    }

    /// Look up namespace.
    pub fn namespace(&self, uri: &str) -> Option<NamespaceId> {
        self.namespace_lookup.get(uri)
    }

    /// Add namespace.
    /// If the namespace already exists, return its id.
    pub fn add_namespace(&mut self, uri: &str) -> NamespaceId {
        self.namespace_lookup.intern(uri.to_string())
    }

    /// Look up prefix.
    pub fn prefix(&self, prefix: &str) -> Option<PrefixId> {
        self.prefix_lookup.get(prefix)
    }

    /// Add prefix.
    /// If the prefix already exists, return its id.
    pub fn add_prefix(&mut self, prefix: &str) -> PrefixId {
        self.prefix_lookup.intern(prefix.to_string())
    }

    /// The id used for names that are in no namespace.
    pub fn no_namespace(&self) -> NamespaceId {
        self.no_namespace_id
    }

    /// The id of the empty prefix.
    pub fn empty_prefix(&self) -> PrefixId {
        self.empty_prefix_id
    }

    /// The local part of a name.
    pub fn local_name_str(&self, name_id: NameId) -> &str {
        &self.name_lookup.value(name_id).local
    }

    /// The namespace of a name.
    pub fn namespace_for_name(&self, name_id: NameId) -> NamespaceId {
        self.name_lookup.value(name_id).namespace_id
    }

    /// The URI of a namespace; empty for no namespace.
    pub fn namespace_str(&self, namespace_id: NamespaceId) -> &str {
        self.namespace_lookup.value(namespace_id)
    }

    /// The string of a prefix; empty for the empty prefix.
    pub fn prefix_str(&self, prefix_id: PrefixId) -> &str {
        self.prefix_lookup.value(prefix_id)
    }

    // name and prefix of elements and attributes
    pub(crate) fn node_name(&self, node: Node) -> Option<(NameId, PrefixId)> {
        match self.value(node) {
            Value::Element(element) => Some((element.name_id, element.prefix_id)),
            Value::Attribute(attribute) => Some((attribute.name_id, attribute.prefix_id)),
            _ => None,
        }
    }

    /// The local name of an element or attribute, or the target of a
    /// processing instruction.
    pub fn local_name(&self, node: Node) -> Option<&str> {
        match self.value(node) {
            Value::ProcessingInstruction(pi) => Some(pi.target()),
            _ => self
                .node_name(node)
                .map(|(name_id, _)| self.local_name_str(name_id)),
        }
    }

    /// The namespace URI of an element or attribute, `None` if it has no
    /// namespace.
    pub fn namespace_uri(&self, node: Node) -> Option<&str> {
        let (name_id, _) = self.node_name(node)?;
        let namespace_id = self.namespace_for_name(name_id);
        if namespace_id == self.no_namespace_id {
            None
        } else {
            Some(self.namespace_str(namespace_id))
        }
    }

    /// The name as written: `prefix:local`, or `local` without a prefix.
    /// Processing instructions give their target.
    pub fn qualified_name(&self, node: Node) -> Option<String> {
        if let Value::ProcessingInstruction(pi) = self.value(node) {
            return Some(pi.target().to_string());
        }
        let (name_id, prefix_id) = self.node_name(node)?;
        let local = self.local_name_str(name_id);
        if prefix_id == self.empty_prefix_id {
            Some(local.to_string())
        } else {
            Some(format!("{}:{}", self.prefix_str(prefix_id), local))
        }
    }

    // the nearest element at or above a node; attributes and text look
    // at their parent element
    fn scope_element(&self, node: Node) -> Option<Node> {
        self.ancestors(node).find(|n| self.is_element(*n))
    }

    /// Find the namespace bound to a prefix at this node.
    ///
    /// Declarations on the node and its ancestors are consulted, as is the
    /// prefix an element itself was created with. The `xml` prefix is always
    /// bound. An undeclaration (`xmlns=""`) gives the no-namespace id.
    pub fn lookup_namespace(&self, node: Node, prefix_id: PrefixId) -> Option<NamespaceId> {
        if prefix_id == self.xml_prefix_id {
            return Some(self.xml_namespace_id);
        }
        let start = self.scope_element(node)?;
        for ancestor in self.ancestors(start) {
            if let Some(element) = self.element(ancestor) {
                if let Some(namespace_id) = element.get_namespace(prefix_id) {
                    return Some(namespace_id);
                }
                if element.prefix_id == prefix_id {
                    let namespace_id = self.namespace_for_name(element.name_id);
                    if namespace_id != self.no_namespace_id {
                        return Some(namespace_id);
                    }
                }
            }
        }
        None
    }

    /// Find the namespace URI bound to `prefix` at this node.
    ///
    /// Use `""` for the default namespace. Returns `None` when the prefix is
    /// not bound, or bound to no namespace.
    pub fn lookup_namespace_uri(&self, node: Node, prefix: &str) -> Option<&str> {
        let prefix_id = self.prefix(prefix)?;
        let namespace_id = self.lookup_namespace(node, prefix_id)?;
        if namespace_id == self.no_namespace_id {
            None
        } else {
            Some(self.namespace_str(namespace_id))
        }
    }

    /// Find a non-empty prefix bound to `uri` at this node.
    pub fn lookup_prefix(&self, node: Node, uri: &str) -> Option<&str> {
        let namespace_id = self.namespace(uri)?;
        let start = self.scope_element(node)?;
        for ancestor in self.ancestors(start) {
            if let Some(element) = self.element(ancestor) {
                for (prefix_id, declared) in element.prefixes() {
                    if *declared == namespace_id
                        && *prefix_id != self.empty_prefix_id
                        && self.lookup_namespace(node, *prefix_id) == Some(namespace_id)
                    {
                        return Some(self.prefix_str(*prefix_id));
                    }
                }
            }
        }
        None
    }

    /// Return true if `uri` is the default namespace at this node.
    pub fn is_default_namespace(&self, node: Node, uri: &str) -> bool {
        self.lookup_namespace_uri(node, "") == Some(uri)
    }

    /// All prefix bindings in scope at a node, nearest declarations winning.
    pub fn in_scope_prefixes(&self, node: Node) -> Prefixes {
        let mut result = Prefixes::new();
        let start = match self.scope_element(node) {
            Some(start) => start,
            None => return result,
        };
        for ancestor in self.ancestors(start) {
            if let Some(element) = self.element(ancestor) {
                for (prefix_id, namespace_id) in element.prefixes() {
                    if !result.iter().any(|(p, _)| p == prefix_id) {
                        result.push((*prefix_id, *namespace_id));
                    }
                }
            }
        }
        result
    }

    // registry first, so creation agrees with path evaluation, then the
    // declarations in scope at the context node
    pub(crate) fn resolve_prefix_uri(&self, context: Node, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE.to_string());
        }
        if let Some(uri) = self.registry.get(prefix) {
            return Some(uri.to_string());
        }
        self.lookup_namespace_uri(context, prefix)
            .map(|uri| uri.to_string())
    }

    /// Resolve a qualified name for a node to be created under `context`.
    ///
    /// Unprefixed names are in no namespace.
    pub(crate) fn resolve_qname(&mut self, context: Node, qname: &str) -> Result<ResolvedName, Error> {
        let (prefix, local) = split_qname(qname.trim());
        if !is_ncname(local) || (!prefix.is_empty() && !is_ncname(prefix)) {
            return Err(Error::InvalidName(qname.to_string()));
        }
        if prefix.is_empty() {
            return Ok(ResolvedName {
                name_id: self.add_name(local),
                prefix_id: self.empty_prefix_id,
                namespace_id: self.no_namespace_id,
            });
        }
        let uri = self
            .resolve_prefix_uri(context, prefix)
            .ok_or_else(|| Error::UnknownPrefix(prefix.to_string()))?;
        let namespace_id = self.add_namespace(&uri);
        Ok(ResolvedName {
            name_id: self.add_name_ns(local, namespace_id),
            prefix_id: self.add_prefix(prefix),
            namespace_id,
        })
    }

    /// Declare `prefix_id` on `element` unless `scope` already binds it to
    /// `namespace_id`.
    pub(crate) fn declare_if_needed(
        &mut self,
        element: Node,
        scope: Node,
        prefix_id: PrefixId,
        namespace_id: NamespaceId,
    ) {
        if prefix_id == self.xml_prefix_id {
            return;
        }
        let in_scope = self
            .lookup_namespace(scope, prefix_id)
            .unwrap_or(self.no_namespace_id);
        if in_scope == namespace_id {
            return;
        }
        if let Some(element) = self.element_mut(element) {
            element.set_prefix(prefix_id, namespace_id);
        }
    }
}
