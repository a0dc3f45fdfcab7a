use log::error;

use crate::document::{Document, Node};
use crate::error::Error;
use crate::step::{StepInfo, StepKind};
use crate::xpath::XPathValue;

/// Path-addressed access that can create what is missing.
///
/// Paths are XPath 1.0 expressions evaluated with a context node; see
/// [`Document::evaluate`]. Failures are logged through the `log` crate and
/// turn into `None` or an empty result. A path that matches nothing is not
/// a failure and is not logged.
impl Document {
    /// The first node `path` selects from `context`, in document order.
    ///
    /// With `create_if_absent`, a path that selects nothing is created:
    /// the longest leading part of the path that does exist is the base, and
    /// each remaining step is appended to it in turn. Only steps naming an
    /// element or an attribute, without a qualifier, can be created.
    ///
    /// ```rust
    /// use xmlpath::Document;
    ///
    /// let mut doc = Document::parse("<config/>")?;
    /// let root = doc.root();
    /// let port = doc.select_single_node(root, "/config/server/@port", true).unwrap();
    /// assert_eq!(doc.to_string(doc.root())?, r#"<config><server port=""/></config>"#);
    /// assert_eq!(doc.select_single_node(root, "/config/server/@port", false), Some(port));
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn select_single_node(
        &mut self,
        context: Node,
        path: &str,
        create_if_absent: bool,
    ) -> Option<Node> {
        match self.first_match(context, path) {
            Ok(Some(node)) => Some(node),
            Ok(None) if create_if_absent => self.create_path(context, path),
            Ok(None) => None,
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// The first node `path` selects from `context`, without creating
    /// anything.
    pub fn find_single_node(&self, context: Node, path: &str) -> Option<Node> {
        match self.first_match(context, path) {
            Ok(node) => node,
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    /// Like [`Document::select_single_node`], but only an element is
    /// returned.
    pub fn select_single_element(
        &mut self,
        context: Node,
        path: &str,
        create_if_absent: bool,
    ) -> Option<Node> {
        self.select_single_node(context, path, create_if_absent)
            .filter(|node| self.is_element(*node))
    }

    /// All nodes `path` selects from `context`, in document order.
    pub fn select_nodes(&self, context: Node, path: &str) -> Vec<Node> {
        match self.select(context, path) {
            Ok(nodes) => nodes,
            Err(e) => {
                error!("{}", e);
                Vec::new()
            }
        }
    }

    /// Create the node a single step names and add it to `node`.
    ///
    /// An element step appends a new last child; an attribute step adds an
    /// empty attribute. Steps with a qualifier and steps that are neither
    /// are refused and leave the tree unchanged.
    pub fn append_new_step_node(&mut self, node: Node, segment: &str) -> Option<Node> {
        match self.try_append_new_step_node(node, segment) {
            Ok(created) => Some(created),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    fn try_append_new_step_node(&mut self, node: Node, segment: &str) -> Result<Node, Error> {
        let step = StepInfo::new(segment);
        if step.has_qualifier() {
            return Err(Error::UnsupportedStep(segment.to_string()));
        }
        match step.kind() {
            StepKind::Element => {
                let element = self.create_named_element(node, &step.fq_name())?;
                if let Err(e) = self.append(node, element) {
                    self.remove(element)?;
                    return Err(e);
                }
                Ok(element)
            }
            StepKind::Attribute => self.set_attribute(node, &step.fq_name(), ""),
            StepKind::Other => Err(Error::UnsupportedStep(segment.to_string())),
        }
    }

    fn first_match(&self, context: Node, path: &str) -> Result<Option<Node>, Error> {
        match self.evaluate(context, path)? {
            XPathValue::NodeSet(nodes) => Ok(nodes.first().copied()),
            _ => Err(Error::Query {
                path: path.to_string(),
                message: "expression does not select nodes".to_string(),
            }),
        }
    }

    // Find the deepest existing prefix of the path, then create the rest
    // step by step. Each created node is the base for the next step, so
    // nothing is looked up again once created.
    fn create_path(&mut self, context: Node, path: &str) -> Option<Node> {
        let segments = path.split('/').collect::<Vec<_>>();
        let (mut base, first) = match segments.first() {
            Some(s) if s.trim().is_empty() && segments.len() > 1 => (self.top(context), 1),
            _ => (context, 0),
        };
        let mut start = first;
        for end in (first + 1..segments.len()).rev() {
            let prefix = segments[..end].join("/");
            match self.first_match(context, &prefix) {
                Ok(Some(node)) => {
                    base = node;
                    start = end;
                    break;
                }
                Ok(None) => {}
                Err(e) => {
                    error!("{}", e);
                    return None;
                }
            }
        }
        for segment in &segments[start..] {
            base = self.append_new_step_node(base, segment)?;
        }
        Some(base)
    }
}
