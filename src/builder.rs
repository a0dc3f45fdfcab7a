use log::{debug, error};
use rand::Rng;

use crate::document::{Document, Node};
use crate::entity::{parse_text_content, Content};
use crate::error::Error;
use crate::nameaccess::{is_ncname, split_qname};
use crate::step::{StepInfo, StepKind};

const PREFIX_ATTEMPTS: usize = 64;

fn random_prefix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}

/// Building elements and attributes from qualified names.
impl Document {
    /// Create an unattached element from a qualified name.
    ///
    /// A prefix must be registered on the document or declared on the
    /// document element. Names without a prefix are in no namespace.
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let mut doc = Document::new();
    /// doc.register_namespace("x", "urn:x");
    /// let element = doc.create_element("x:item")?;
    /// assert_eq!(doc.namespace_uri(element), Some("urn:x"));
    /// assert_eq!(doc.to_string(element)?, r#"<x:item xmlns:x="urn:x"/>"#);
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn create_element(&mut self, qname: &str) -> Result<Node, Error> {
        let scope = self.document_element().unwrap_or(self.root());
        self.create_named_element(scope, qname)
    }

    // resolve the name against `scope`, declaring its prefix on the new
    // element when `scope` doesn't bind it already
    pub(crate) fn create_named_element(&mut self, scope: Node, qname: &str) -> Result<Node, Error> {
        let resolved = self.resolve_qname(scope, qname)?;
        let element = self.new_element(resolved.name_id, resolved.prefix_id);
        if resolved.prefix_id != self.empty_prefix_id {
            self.declare_if_needed(element, scope, resolved.prefix_id, resolved.namespace_id);
        }
        Ok(element)
    }

    fn create_element_ns(
        &mut self,
        scope: Node,
        prefix: &str,
        local: &str,
        uri: &str,
    ) -> Result<Node, Error> {
        if !is_ncname(local) || (!prefix.is_empty() && !is_ncname(prefix)) {
            return Err(Error::InvalidName(format!("{}:{}", prefix, local)));
        }
        let namespace_id = self.add_namespace(uri);
        let name_id = self.add_name_ns(local, namespace_id);
        let prefix_id = self.add_prefix(prefix);
        let element = self.new_element(name_id, prefix_id);
        self.declare_if_needed(element, scope, prefix_id, namespace_id);
        Ok(element)
    }

    /// Set an attribute on an element, replacing an attribute with the same
    /// name. Returns the attribute node.
    pub fn set_attribute(&mut self, element: Node, qname: &str, value: &str) -> Result<Node, Error> {
        if !self.is_element(element) {
            return Err(Error::NotElement(element));
        }
        let resolved = self.resolve_qname(element, qname)?;
        if resolved.prefix_id != self.empty_prefix_id {
            self.declare_if_needed(element, element, resolved.prefix_id, resolved.namespace_id);
        }
        let attribute = self.new_attribute(resolved.name_id, resolved.prefix_id, value);
        self.append(element, attribute)?;
        Ok(attribute)
    }

    /// The value of an attribute, by qualified name.
    pub fn get_attribute(&self, element: Node, qname: &str) -> Option<&str> {
        let attribute = self.find_attribute(element, qname)?;
        self.attribute(attribute).map(|a| a.get())
    }

    /// Remove an attribute by qualified name. Missing attributes are
    /// ignored.
    pub fn remove_attribute(&mut self, element: Node, qname: &str) -> Result<(), Error> {
        if let Some(attribute) = self.find_attribute(element, qname) {
            self.remove(attribute)?;
        }
        Ok(())
    }

    fn find_attribute(&self, element: Node, qname: &str) -> Option<Node> {
        let (prefix, local) = split_qname(qname.trim());
        let name_id = if prefix.is_empty() {
            self.name(local)?
        } else {
            let uri = self.resolve_prefix_uri(element, prefix)?;
            self.name_ns(local, self.namespace(&uri)?)?
        };
        self.attribute_nodes(element)
            .find(|n| self.attribute(*n).map(|a| a.name()) == Some(name_id))
    }

    /// Create a child element and insert it as the first or last child of
    /// `parent`.
    ///
    /// With a `namespace_uri` and an unprefixed name the child goes into
    /// that namespace: unchanged when it is the default namespace of
    /// `parent`, otherwise with a prefix bound to it in scope, or a
    /// generated one. `value`, when not empty, becomes the text of the
    /// child.
    ///
    /// Failures are logged and give `None`.
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let mut doc = Document::parse(r#"<a xmlns="urn:a"/>"#)?;
    /// let a = doc.document_element().unwrap();
    /// let b = doc.create_child(a, "b", "text", false, Some("urn:a")).unwrap();
    /// assert_eq!(doc.namespace_uri(b), Some("urn:a"));
    /// assert_eq!(doc.to_string(a)?, r#"<a xmlns="urn:a"><b>text</b></a>"#);
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn create_child(
        &mut self,
        parent: Node,
        qname: &str,
        value: &str,
        insert_first: bool,
        namespace_uri: Option<&str>,
    ) -> Option<Node> {
        match self.try_create_child(parent, qname, value, insert_first, namespace_uri) {
            Ok(child) => Some(child),
            Err(e) => {
                error!("invalid child element {:?}: {}", qname, e);
                None
            }
        }
    }

    fn try_create_child(
        &mut self,
        parent: Node,
        qname: &str,
        value: &str,
        insert_first: bool,
        namespace_uri: Option<&str>,
    ) -> Result<Node, Error> {
        let mut step = StepInfo::new(qname);
        if step.kind() != StepKind::Element {
            return Err(Error::InvalidName(qname.to_string()));
        }
        let child = match namespace_uri.filter(|uri| !uri.is_empty()) {
            Some(uri) => {
                if step.namespace_prefix().is_empty() && !self.is_default_namespace(parent, uri) {
                    let prefix = match self.lookup_prefix(parent, uri) {
                        Some(prefix) => prefix.to_string(),
                        None => self.generate_prefix(parent, uri)?,
                    };
                    step.set_prefix(&prefix);
                }
                self.create_element_ns(parent, step.namespace_prefix(), step.local_name(), uri)?
            }
            None => self.create_named_element(parent, &step.fq_name())?,
        };
        let placed = if value.is_empty() {
            Ok(())
        } else {
            self.append_text(child, value)
        }
        .and_then(|_| {
            if insert_first {
                self.prepend(parent, child)
            } else {
                self.append(parent, child)
            }
        });
        if let Err(e) = placed {
            self.remove(child)?;
            return Err(e);
        }
        Ok(child)
    }

    fn generate_prefix(&self, scope: Node, uri: &str) -> Result<String, Error> {
        let taken = |prefix: &str| {
            self.lookup_namespace_uri(scope, prefix).is_some() || self.registry.contains(prefix)
        };
        let mut prefix = random_prefix(4);
        let mut attempts = 0;
        while taken(&prefix) {
            attempts += 1;
            if attempts > PREFIX_ATTEMPTS {
                return Err(Error::PrefixExhausted(uri.to_string()));
            }
            prefix = random_prefix(5);
        }
        debug!("generated namespace prefix {} for {}", prefix, uri);
        Ok(prefix)
    }

    /// Replace an element with a new element named `qname` that has copies
    /// of its attributes, namespace declarations and children.
    ///
    /// Returns the replacement, or `None` if the element has no parent.
    pub fn rename_node(&mut self, element: Node, qname: &str) -> Option<Node> {
        let parent = self.parent(element)?;
        if !self.is_element(element) {
            return None;
        }
        match self.try_rename_node(parent, element, qname) {
            Ok(replacement) => Some(replacement),
            Err(e) => {
                error!("cannot rename element to {:?}: {}", qname, e);
                None
            }
        }
    }

    fn try_rename_node(&mut self, parent: Node, element: Node, qname: &str) -> Result<Node, Error> {
        let replacement = self.create_named_element(parent, qname)?;
        if let Err(e) = self.fill_replacement(element, replacement) {
            self.remove(replacement)?;
            return Err(e);
        }
        Ok(replacement)
    }

    // copy declarations, attributes and children of `element` onto
    // `replacement`, then swap the two
    fn fill_replacement(&mut self, element: Node, replacement: Node) -> Result<(), Error> {
        let declarations = self
            .element(element)
            .map(|e| e.prefixes().clone())
            .unwrap_or_default();
        if let Some(replacement_element) = self.element_mut(replacement) {
            for (prefix_id, namespace_id) in declarations {
                if replacement_element.get_namespace(prefix_id).is_none() {
                    replacement_element.set_prefix(prefix_id, namespace_id);
                }
            }
        }
        let originals = self
            .attribute_nodes(element)
            .chain(self.children(element))
            .collect::<Vec<_>>();
        for original in originals {
            let copy = self.clone_node(original)?;
            self.append(replacement, copy)?;
        }
        self.replace(element, replacement)
    }

    /// Parse `xml` as a fragment and append its nodes to `element`.
    ///
    /// If the fragment doesn't parse the element is left unchanged and
    /// false is returned.
    pub fn append_xml(&mut self, element: Node, xml: &str) -> bool {
        if xml.is_empty() {
            return true;
        }
        if !self.is_element(element) {
            error!("{}", Error::NotElement(element));
            return false;
        }
        let nodes = match self.parse_fragment(element, xml) {
            Ok(nodes) => nodes,
            Err(_) => return false,
        };
        for node in nodes {
            if let Err(e) = self.append(element, node) {
                error!("cannot append fragment node: {}", e);
                return false;
            }
        }
        true
    }

    /// Append an entity reference, `name` without `&` and `;`.
    ///
    /// Character references like `#65` or `#x41` are appended as text.
    pub fn append_entity_ref(&mut self, element: Node, name: &str) -> Result<(), Error> {
        if name.is_empty() {
            return Ok(());
        }
        if name.starts_with('#') {
            let reference = format!("&{};", name);
            for content in parse_text_content(&reference)? {
                match content {
                    Content::Text(text) => self.append_text(element, &text)?,
                    Content::EntityRef(name) => return Err(Error::InvalidEntity(name)),
                }
            }
            return Ok(());
        }
        if !is_ncname(name) {
            return Err(Error::InvalidEntity(name.to_string()));
        }
        let entity = self.new_entity_ref(name);
        self.append(element, entity)
    }

    /// Remove all children of a node; attributes stay.
    pub fn remove_all_child_nodes(&mut self, node: Node) -> Result<(), Error> {
        self.clear(node)
    }
}
