use crate::access::NodeEdge;
use crate::document::{Document, Node};
use crate::entity::{serialize_attribute, serialize_cdata, serialize_text};
use crate::error::Error;
use crate::interned::{NameId, NamespaceId, PrefixId};
use crate::xmlvalue::{Prefixes, Value};

// Prefix bindings already written to the output, one frame per open element.
struct OutputScope {
    frames: Vec<Prefixes>,
}

impl OutputScope {
    fn lookup(&self, prefix_id: PrefixId) -> Option<NamespaceId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.iter().find(|(p, _)| *p == prefix_id).map(|(_, n)| *n))
    }

    fn prefix_for(&self, namespace_id: NamespaceId, skip: PrefixId) -> Option<PrefixId> {
        self.frames.iter().rev().find_map(|frame| {
            frame
                .iter()
                .find(|(p, n)| *n == namespace_id && *p != skip && self.lookup(*p) == Some(*n))
                .map(|(p, _)| *p)
        })
    }
}

fn bound(declared: &Prefixes, scope: &OutputScope, prefix_id: PrefixId) -> Option<NamespaceId> {
    declared
        .iter()
        .find(|(p, _)| *p == prefix_id)
        .map(|(_, n)| *n)
        .or_else(|| scope.lookup(prefix_id))
}

fn declare(declared: &mut Prefixes, prefix_id: PrefixId, namespace_id: NamespaceId) {
    if let Some(entry) = declared.iter_mut().find(|(p, _)| *p == prefix_id) {
        entry.1 = namespace_id;
    } else {
        declared.push((prefix_id, namespace_id));
    }
}

/// Serialization of nodes to XML text.
impl Document {
    /// Serialize a node and its descendants to a string.
    ///
    /// The output is self-contained: namespace declarations needed by the
    /// serialized elements and attributes are written even if they are made
    /// on an ancestor that is not serialized, or nowhere at all (for nodes
    /// created or moved through the API).
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let doc = Document::parse(r#"<a xmlns:p="urn:p"><p:b>&amp;</p:b></a>"#)?;
    /// let a = doc.document_element().unwrap();
    /// let b = doc.first_child(a).unwrap();
    /// assert_eq!(doc.to_string(b)?, r#"<p:b xmlns:p="urn:p">&amp;</p:b>"#);
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn to_string(&self, node: Node) -> Result<String, Error> {
        let mut buf = String::new();
        let mut scope = OutputScope { frames: Vec::new() };
        if self.is_attribute(node) {
            self.serialize_start(node, &mut scope, &mut buf)?;
            return Ok(buf);
        }
        for edge in self.traverse(node) {
            match edge {
                NodeEdge::Start(node) => self.serialize_start(node, &mut scope, &mut buf)?,
                NodeEdge::End(node) => self.serialize_end(node, &mut scope, &mut buf),
            }
        }
        Ok(buf)
    }

    fn serialize_start(
        &self,
        node: Node,
        scope: &mut OutputScope,
        buf: &mut String,
    ) -> Result<(), Error> {
        match self.value(node) {
            Value::Root => {}
            Value::Element(element) => {
                let mut declared = element.prefixes().clone();
                let namespace_id = self.namespace_for_name(element.name_id);
                if namespace_id == self.no_namespace_id {
                    if element.prefix_id == self.empty_prefix_id
                        && bound(&declared, scope, self.empty_prefix_id)
                            .is_some_and(|n| n != self.no_namespace_id)
                    {
                        declare(&mut declared, self.empty_prefix_id, self.no_namespace_id);
                    }
                } else if element.prefix_id != self.xml_prefix_id
                    && bound(&declared, scope, element.prefix_id) != Some(namespace_id)
                {
                    declare(&mut declared, element.prefix_id, namespace_id);
                }

                let mut attributes = Vec::new();
                for attribute_node in self.attribute_nodes(node) {
                    let attribute = match self.attribute(attribute_node) {
                        Some(attribute) => attribute,
                        None => continue,
                    };
                    let namespace_id = self.namespace_for_name(attribute.name_id);
                    let mut prefix_id = attribute.prefix_id;
                    if namespace_id == self.xml_namespace_id {
                        prefix_id = self.xml_prefix_id;
                    } else if namespace_id != self.no_namespace_id
                        && (prefix_id == self.empty_prefix_id
                            || bound(&declared, scope, prefix_id) != Some(namespace_id))
                    {
                        prefix_id =
                            self.attribute_prefix(&mut declared, scope, prefix_id, namespace_id)?;
                    }
                    attributes.push((prefix_id, attribute.name_id, attribute.get()));
                }

                buf.push('<');
                buf.push_str(&self.serialized_name(element.prefix_id, element.name_id));
                for (prefix_id, namespace_id) in &declared {
                    if *prefix_id == self.xml_prefix_id {
                        continue;
                    }
                    let uri = serialize_attribute(self.namespace_str(*namespace_id));
                    if *prefix_id == self.empty_prefix_id {
                        buf.push_str(&format!(" xmlns=\"{}\"", uri));
                    } else {
                        buf.push_str(&format!(" xmlns:{}=\"{}\"", self.prefix_str(*prefix_id), uri));
                    }
                }
                for (prefix_id, name_id, value) in attributes {
                    buf.push_str(&format!(
                        " {}=\"{}\"",
                        self.serialized_name(prefix_id, name_id),
                        serialize_attribute(value)
                    ));
                }
                if self.first_child(node).is_none() {
                    buf.push_str("/>");
                } else {
                    buf.push('>');
                }
                scope.frames.push(declared);
            }
            Value::Attribute(attribute) => {
                // only reached when an attribute itself is serialized
                buf.push_str(&format!(
                    "{}=\"{}\"",
                    self.serialized_name(attribute.prefix_id, attribute.name_id),
                    serialize_attribute(attribute.get())
                ));
            }
            Value::Text(text) => buf.push_str(&serialize_text(text.get())),
            Value::CData(text) => buf.push_str(&serialize_cdata(text.get())),
            Value::Comment(comment) => {
                buf.push_str(&format!("<!--{}-->", comment.get()));
            }
            Value::EntityRef(entity) => {
                buf.push_str(&format!("&{};", entity.name()));
            }
            Value::ProcessingInstruction(pi) => match pi.data() {
                Some(data) => buf.push_str(&format!("<?{} {}?>", pi.target(), data)),
                None => buf.push_str(&format!("<?{}?>", pi.target())),
            },
        }
        Ok(())
    }

    fn serialize_end(&self, node: Node, scope: &mut OutputScope, buf: &mut String) {
        if let Value::Element(element) = self.value(node) {
            if self.first_child(node).is_some() {
                buf.push_str("</");
                buf.push_str(&self.serialized_name(element.prefix_id, element.name_id));
                buf.push('>');
            }
            scope.frames.pop();
        }
    }

    fn serialized_name(&self, prefix_id: PrefixId, name_id: NameId) -> String {
        let local = self.local_name_str(name_id);
        if prefix_id == self.empty_prefix_id {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix_str(prefix_id), local)
        }
    }

    // a namespaced attribute needs a non-empty prefix bound to its namespace
    fn attribute_prefix(
        &self,
        declared: &mut Prefixes,
        scope: &OutputScope,
        preferred: PrefixId,
        namespace_id: NamespaceId,
    ) -> Result<PrefixId, Error> {
        if preferred != self.empty_prefix_id && bound(declared, scope, preferred).is_none() {
            declare(declared, preferred, namespace_id);
            return Ok(preferred);
        }
        if let Some((prefix_id, _)) = declared
            .iter()
            .find(|(p, n)| *n == namespace_id && *p != self.empty_prefix_id)
        {
            return Ok(*prefix_id);
        }
        if let Some(prefix_id) = scope.prefix_for(namespace_id, self.empty_prefix_id) {
            if bound(declared, scope, prefix_id) == Some(namespace_id) {
                return Ok(prefix_id);
            }
        }
        Err(Error::PrefixExhausted(self.namespace_str(namespace_id).to_string()))
    }
}
