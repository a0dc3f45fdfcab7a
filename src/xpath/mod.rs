//! XPath 1.0 evaluation over a [`Document`].
//!
//! Expressions are parsed into an [`Expression`] tree and evaluated with a
//! context node. Name tests with a prefix resolve it through the document's
//! [`NamespaceRegistry`](crate::NamespaceRegistry) first, then through the
//! namespace declarations in scope at the context node. Name tests without a
//! prefix only match nodes in no namespace.

mod ast;
mod engine;
mod functions;
mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
pub use engine::{format_number, string_to_number, XPathValue};
pub use parser::parse_expression;

use crate::document::{Document, Node};
use crate::error::Error;
use engine::{evaluate, DocumentOrder, EvaluationContext};

impl Document {
    /// Evaluate an XPath expression with `context` as the context node.
    ///
    /// An absolute path starts at the top of the tree `context` is in: the
    /// document root for attached nodes.
    ///
    /// ```rust
    /// use xmlpath::Document;
    /// use xmlpath::xpath::XPathValue;
    ///
    /// let doc = Document::parse("<a><b/><b/></a>")?;
    /// let value = doc.evaluate(doc.root(), "count(/a/b)")?;
    /// assert_eq!(value, XPathValue::Number(2.0));
    /// # Ok::<(), xmlpath::Error>(())
    /// ```
    pub fn evaluate(&self, context: Node, path: &str) -> Result<XPathValue, Error> {
        let expr = parse_expression(path)?;
        self.evaluate_expression(context, &expr)
            .map_err(|e| match e {
                Error::Query { message, .. } => Error::Query {
                    path: path.to_string(),
                    message,
                },
                other => other,
            })
    }

    /// Evaluate a parsed expression with `context` as the context node.
    pub fn evaluate_expression(&self, context: Node, expr: &Expression) -> Result<XPathValue, Error> {
        let root = self.top(context);
        let order = DocumentOrder::new(self, root);
        // prefixes declared on the document element are usable from the root
        let scope = if self.is_root(context) {
            self.document_element().unwrap_or(context)
        } else {
            context
        };
        let e_ctx = EvaluationContext {
            doc: self,
            node: context,
            position: 1,
            size: 1,
            root,
            scope,
            order: &order,
        };
        evaluate(expr, &e_ctx)
    }

    /// Evaluate an expression that must produce a node-set.
    pub fn select(&self, context: Node, path: &str) -> Result<Vec<Node>, Error> {
        match self.evaluate(context, path)? {
            XPathValue::NodeSet(nodes) => Ok(nodes),
            _ => Err(Error::Query {
                path: path.to_string(),
                message: "expression does not select nodes".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_prefix() {
        let mut doc = Document::parse(r#"<a xmlns="urn:a"><b>x</b></a>"#).unwrap();
        let root = doc.root();
        assert_eq!(doc.select(root, "/a/b").unwrap(), vec![]);
        doc.register_namespace("x", "urn:a");
        assert_eq!(doc.select(root, "/x:a/x:b").unwrap().len(), 1);
    }

    #[test]
    fn test_in_scope_prefix() {
        let doc = Document::parse(r#"<a xmlns:p="urn:p"><p:b/></a>"#).unwrap();
        assert_eq!(doc.select(doc.root(), "/a/p:b").unwrap().len(), 1);
        assert_eq!(doc.select(doc.root(), "/a/p:*").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_prefix_is_error() {
        let doc = Document::parse("<a/>").unwrap();
        let err = doc.select(doc.root(), "/q:a").unwrap_err();
        assert!(matches!(err, Error::Query { path, .. } if path == "/q:a"));
    }

    #[test]
    fn test_relative_to_context() {
        let doc = Document::parse("<a><b><c/></b></a>").unwrap();
        let b = doc.select(doc.root(), "/a/b").unwrap()[0];
        assert_eq!(doc.select(b, "c").unwrap().len(), 1);
        assert_eq!(doc.select(b, "/a").unwrap().len(), 1);
        assert_eq!(doc.select(b, "..").unwrap(), doc.select(doc.root(), "/a").unwrap());
    }

    #[test]
    fn test_detached_tree() {
        let mut doc = Document::new();
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        doc.append(a, b).unwrap();
        // the top of the fragment acts as the root
        assert_eq!(doc.select(b, "/self::a").unwrap(), vec![a]);
        assert_eq!(doc.select(b, "/b").unwrap(), vec![b]);
    }

    #[test]
    fn test_select_requires_node_set() {
        let doc = Document::new();
        assert!(doc.select(doc.root(), "1 + 1").is_err());
    }
}
