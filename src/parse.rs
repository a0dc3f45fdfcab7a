use std::borrow::Cow;

use log::debug;
use xmlparser::{ElementEnd, StrSpan, Token, Tokenizer};

use crate::document::{Document, Node};
use crate::encoding::decode;
use crate::entity::{parse_attribute, parse_text_content, Content};
use crate::error::Error;
use crate::interned::{NamespaceId, PrefixId};

// the start tag being read: its name, declarations and attributes are
// only turned into nodes once the tag is complete
struct PendingElement<'x> {
    prefix: &'x str,
    local: &'x str,
    declarations: Vec<(PrefixId, NamespaceId)>,
    attributes: Vec<(&'x str, &'x str, Cow<'x, str>)>,
}

struct DocumentBuilder<'d, 'x> {
    doc: &'d mut Document,
    // where parsed top-level nodes go
    container: Node,
    // prefixes not declared in the parsed text are looked up here
    outer_scope: Option<Node>,
    open: Vec<Node>,
    pending: Option<PendingElement<'x>>,
}

impl<'d, 'x> DocumentBuilder<'d, 'x> {
    fn current(&self) -> Node {
        self.open.last().copied().unwrap_or(self.container)
    }

    fn resolve_prefix(
        &mut self,
        prefix: &str,
        declarations: &[(PrefixId, NamespaceId)],
    ) -> Result<(PrefixId, NamespaceId, bool), Error> {
        let prefix_id = self.doc.add_prefix(prefix);
        if let Some((_, namespace_id)) = declarations.iter().find(|(p, _)| *p == prefix_id) {
            return Ok((prefix_id, *namespace_id, false));
        }
        if let Some(namespace_id) = self.doc.lookup_namespace(self.current(), prefix_id) {
            return Ok((prefix_id, namespace_id, false));
        }
        if let Some(outer_scope) = self.outer_scope {
            if let Some(uri) = self.doc.resolve_prefix_uri(outer_scope, prefix) {
                let namespace_id = self.doc.add_namespace(&uri);
                return Ok((prefix_id, namespace_id, true));
            }
        }
        if prefix.is_empty() {
            Ok((prefix_id, self.doc.no_namespace(), false))
        } else {
            Err(Error::UnknownPrefix(prefix.to_string()))
        }
    }

    fn element_start(&mut self, prefix: &'x str, local: &'x str) {
        self.pending = Some(PendingElement {
            prefix,
            local,
            declarations: Vec::new(),
            attributes: Vec::new(),
        });
    }

    fn attribute(
        &mut self,
        prefix: StrSpan<'x>,
        local: StrSpan<'x>,
        value: StrSpan<'x>,
    ) -> Result<(), Error> {
        let value = parse_attribute(value.as_str().into())?;
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| Error::InvalidOperation("attribute outside of start tag".into()))?;
        match (prefix.as_str(), local.as_str()) {
            ("xmlns", local) => {
                let prefix_id = self.doc.add_prefix(local);
                let namespace_id = self.doc.add_namespace(&value);
                pending.declarations.push((prefix_id, namespace_id));
            }
            ("", "xmlns") => {
                let prefix_id = self.doc.empty_prefix();
                let namespace_id = self.doc.add_namespace(&value);
                pending.declarations.push((prefix_id, namespace_id));
            }
            (prefix, local) => pending.attributes.push((prefix, local, value)),
        }
        Ok(())
    }

    fn open_element(&mut self) -> Result<Node, Error> {
        let pending = self.pending.take().ok_or(Error::UnexpectedEnd)?;
        let (prefix_id, namespace_id, from_outer) =
            self.resolve_prefix(pending.prefix, &pending.declarations)?;
        let name_id = self.doc.add_name_ns(pending.local, namespace_id);
        let element = self.doc.new_element(name_id, prefix_id);
        if let Some(element_value) = self.doc.element_mut(element) {
            for (prefix_id, namespace_id) in &pending.declarations {
                element_value.set_prefix(*prefix_id, *namespace_id);
            }
        }
        if let (true, Some(outer_scope)) = (from_outer, self.outer_scope) {
            self.doc
                .declare_if_needed(element, outer_scope, prefix_id, namespace_id);
        }
        let parent = self.current();
        self.doc.append(parent, element)?;
        for (prefix, local, value) in pending.attributes {
            let (prefix_id, namespace_id) = if prefix.is_empty() {
                (self.doc.empty_prefix(), self.doc.no_namespace())
            } else {
                let (prefix_id, namespace_id, from_outer) =
                    self.resolve_prefix(prefix, &pending.declarations)?;
                if let (true, Some(outer_scope)) = (from_outer, self.outer_scope) {
                    self.doc
                        .declare_if_needed(element, outer_scope, prefix_id, namespace_id);
                }
                (prefix_id, namespace_id)
            };
            let name_id = self.doc.add_name_ns(local, namespace_id);
            let attribute = self.doc.new_attribute(name_id, prefix_id, &value);
            self.doc.append(element, attribute)?;
        }
        Ok(element)
    }

    fn close_element(&mut self, prefix: &str, local: &str) -> Result<(), Error> {
        let element = self.open.pop().ok_or(Error::UnexpectedEnd)?;
        let expected = self.doc.qualified_name(element).unwrap_or_default();
        let found = if prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", prefix, local)
        };
        if expected != found {
            return Err(Error::UnclosedTag(found));
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), Error> {
        let parent = self.current();
        if self.doc.is_root(parent) {
            // only whitespace can appear here; it is not kept
            return Ok(());
        }
        for content in parse_text_content(text)? {
            let node = match content {
                Content::Text(text) => self.doc.new_text(&text),
                Content::EntityRef(name) => self.doc.new_entity_ref(&name),
            };
            self.doc.append(parent, node)?;
        }
        Ok(())
    }

    fn add(&mut self, node: Node) -> Result<(), Error> {
        let parent = self.current();
        self.doc.append(parent, node)
    }

    fn build(&mut self, tokenizer: Tokenizer<'x>) -> Result<(), Error> {
        for token in tokenizer {
            match token? {
                Token::ElementStart { prefix, local, .. } => {
                    self.element_start(prefix.as_str(), local.as_str());
                }
                Token::Attribute {
                    prefix,
                    local,
                    value,
                    ..
                } => self.attribute(prefix, local, value)?,
                Token::ElementEnd { end, .. } => match end {
                    ElementEnd::Open => {
                        let element = self.open_element()?;
                        self.open.push(element);
                    }
                    ElementEnd::Empty => {
                        self.open_element()?;
                    }
                    ElementEnd::Close(prefix, local) => {
                        self.close_element(prefix.as_str(), local.as_str())?;
                    }
                },
                Token::Text { text } => self.text(text.as_str())?,
                Token::Cdata { text, .. } => {
                    let node = self.doc.new_cdata(text.as_str());
                    self.add(node)?;
                }
                Token::Comment { text, .. } => {
                    let node = self.doc.new_comment(text.as_str());
                    self.add(node)?;
                }
                Token::ProcessingInstruction {
                    target, content, ..
                } => {
                    let node = self.doc.new_processing_instruction(
                        target.as_str(),
                        content.map(|c| c.as_str()),
                    );
                    self.add(node)?;
                }
                // declaration and doctype are not kept
                _ => {}
            }
        }
        if !self.open.is_empty() {
            return Err(Error::UnexpectedEnd);
        }
        Ok(())
    }
}

/// Parsing XML text into a document or into a fragment of one.
impl Document {
    /// Parse a complete XML document.
    ///
    /// Predefined entities and character references are expanded; other
    /// entity references are kept as entity reference nodes. The XML
    /// declaration and doctype are not retained.
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let doc = Document::parse("<a><b>Example</b></a>")?;
    /// assert_eq!(doc.to_string(doc.root())?, "<a><b>Example</b></a>");
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn parse(xml: &str) -> Result<Document, Error> {
        let mut doc = Document::new();
        doc.load_xml(xml)?;
        Ok(doc)
    }

    /// Parse a document from bytes, detecting the encoding from the byte
    /// order mark or the XML declaration.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
        let xml = decode(bytes);
        Document::parse(&xml)
    }

    /// Replace the content of this document with parsed XML, keeping the
    /// registered namespaces.
    ///
    /// On failure the document is left empty.
    pub fn load_xml(&mut self, xml: &str) -> Result<(), Error> {
        let root = self.root();
        self.clear(root)?;
        let result = {
            let mut builder = DocumentBuilder {
                doc: self,
                container: root,
                outer_scope: None,
                open: Vec::new(),
                pending: None,
            };
            builder.build(Tokenizer::from(xml))
        };
        let result = result.and_then(|_| {
            self.document_element()
                .map(|_| ())
                .ok_or(Error::UnexpectedEnd)
        });
        if result.is_err() {
            self.clear(root)?;
        }
        result
    }

    /// Parse a well-balanced XML fragment and return its top-level nodes,
    /// unattached.
    ///
    /// Prefixes the fragment does not declare itself are resolved against
    /// the registered namespaces and the declarations in scope at `scope`;
    /// the resulting nodes declare what they need.
    pub fn parse_fragment(&mut self, scope: Node, xml: &str) -> Result<Vec<Node>, Error> {
        let name_id = self.add_name("fragment");
        let empty_prefix = self.empty_prefix();
        let holder = self.new_element(name_id, empty_prefix);
        let result = {
            let mut builder = DocumentBuilder {
                doc: self,
                container: holder,
                outer_scope: Some(scope),
                open: Vec::new(),
                pending: None,
            };
            builder.build(Tokenizer::from_fragment(xml, 0..xml.len()))
        };
        if let Err(e) = result {
            debug!("fragment {:?} could not be parsed: {}", xml, e);
            self.remove_fragment(holder);
            return Err(e);
        }
        let nodes = self.children(holder).collect::<Vec<_>>();
        for node in &nodes {
            node.get().detach(self.arena_mut());
        }
        self.remove_fragment(holder);
        Ok(nodes)
    }

    fn remove_fragment(&mut self, holder: Node) {
        holder.get().remove_subtree(self.arena_mut());
    }

    // remove all normal children; attributes stay
    pub(crate) fn clear(&mut self, node: Node) -> Result<(), Error> {
        let children = self.children(node).collect::<Vec<_>>();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaces() {
        let doc = Document::parse(r#"<a xmlns="urn:a" xmlns:b="urn:b"><b:c b:x="1"/></a>"#)
            .unwrap();
        let a = doc.document_element().unwrap();
        assert_eq!(doc.namespace_uri(a), Some("urn:a"));
        let c = doc.first_child(a).unwrap();
        assert_eq!(doc.namespace_uri(c), Some("urn:b"));
        assert_eq!(doc.qualified_name(c), Some("b:c".to_string()));
        let x = doc.attribute_nodes(c).next().unwrap();
        assert_eq!(doc.namespace_uri(x), Some("urn:b"));
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let doc = Document::parse(r#"<a xmlns="urn:a" x="1"/>"#).unwrap();
        let a = doc.document_element().unwrap();
        let x = doc.attribute_nodes(a).next().unwrap();
        assert_eq!(doc.namespace_uri(x), None);
    }

    #[test]
    fn test_parse_unknown_prefix() {
        assert!(matches!(
            Document::parse("<x:a/>"),
            Err(Error::UnknownPrefix(_))
        ));
    }

    #[test]
    fn test_parse_mismatched_close() {
        assert!(Document::parse("<a></b>").is_err());
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(Document::parse("").is_err());
    }

    #[test]
    fn test_entity_ref_kept() {
        let doc = Document::parse("<a>x&nbsp;y</a>").unwrap();
        let a = doc.document_element().unwrap();
        assert_eq!(doc.children(a).count(), 3);
        assert_eq!(doc.to_string(a).unwrap(), "<a>x&nbsp;y</a>");
    }

    #[test]
    fn test_fragment_uses_outer_scope() {
        let mut doc = Document::parse(r#"<a xmlns:p="urn:p"/>"#).unwrap();
        let a = doc.document_element().unwrap();
        let nodes = doc.parse_fragment(a, "<p:b/>text").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.namespace_uri(nodes[0]), Some("urn:p"));
        assert_eq!(doc.parent(nodes[0]), None);
    }

    #[test]
    fn test_fragment_failure() {
        let mut doc = Document::parse("<a/>").unwrap();
        let a = doc.document_element().unwrap();
        assert!(doc.parse_fragment(a, "<b>").is_err());
    }
}
