use std::fmt::{Display, Formatter};

use crate::document::Node;

/// Errors produced by tree operations, parsing and path evaluation.
///
/// The path-addressed API (`select_single_node`, the typed accessors,
/// `create_child` and friends) never returns these directly: it logs them and
/// hands back `None`, `false` or an empty result instead. The lower level
/// operations return them so they can be propagated with `?`.
#[derive(Debug)]
pub enum Error {
    /// A step that cannot be auto-created: it carries a qualifier, is a
    /// function call or node test, or is empty.
    UnsupportedStep(String),
    /// The path expression could not be parsed or evaluated.
    Query { path: String, message: String },
    /// A retrieved value was expected to be numeric.
    NotNumeric(String),
    /// The operation would break the structure of the tree.
    InvalidOperation(String),
    /// The node is not an element.
    NotElement(Node),
    /// A prefix is used that is not declared or registered.
    UnknownPrefix(String),
    /// A name that is not usable as an element or attribute name.
    InvalidName(String),
    /// An entity reference was opened with `&` but never closed.
    UnclosedEntity(String),
    /// An entity reference is not one of the predefined ones.
    InvalidEntity(String),
    /// A closing tag does not match the open element.
    UnclosedTag(String),
    /// The XML text ended while elements were still open.
    UnexpectedEnd,
    /// The XML tokenizer rejected the input.
    Parser(xmlparser::Error),
    /// The JSON text could not be decoded.
    Json(serde_json::Error),
    /// The decoded JSON is not an object or an array.
    JsonNotContainer,
    /// No free namespace prefix could be generated.
    PrefixExhausted(String),
    /// Low level tree failure.
    Tree(indextree::NodeError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsupportedStep(step) => {
                write!(f, "can't auto-create node specified by the step: {}", step)
            }
            Error::Query { path, message } => {
                write!(f, "failure of XPath query using {}: {}", path, message)
            }
            Error::NotNumeric(value) => write!(f, "value is not numeric: {:?}", value),
            Error::InvalidOperation(message) => write!(f, "invalid operation: {}", message),
            Error::NotElement(node) => write!(f, "node is not an element: {:?}", node),
            Error::UnknownPrefix(prefix) => write!(f, "unknown namespace prefix: {}", prefix),
            Error::InvalidName(name) => write!(f, "invalid name: {:?}", name),
            Error::UnclosedEntity(entity) => write!(f, "unclosed entity: &{}", entity),
            Error::InvalidEntity(entity) => write!(f, "invalid entity: &{};", entity),
            Error::UnclosedTag(name) => write!(f, "unexpected closing tag: {}", name),
            Error::UnexpectedEnd => write!(f, "unexpected end of XML"),
            Error::Parser(e) => write!(f, "XML parse error: {}", e),
            Error::Json(e) => write!(f, "JSON decode error: {}", e),
            Error::JsonNotContainer => write!(f, "JSON is not an object or array"),
            Error::PrefixExhausted(uri) => {
                write!(f, "could not generate a namespace prefix for {}", uri)
            }
            Error::Tree(e) => write!(f, "tree error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parser(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Tree(e) => Some(e),
            _ => None,
        }
    }
}

impl From<xmlparser::Error> for Error {
    #[inline]
    fn from(e: xmlparser::Error) -> Self {
        Error::Parser(e)
    }
}

impl From<serde_json::Error> for Error {
    #[inline]
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<indextree::NodeError> for Error {
    #[inline]
    fn from(e: indextree::NodeError) -> Self {
        Error::Tree(e)
    }
}
