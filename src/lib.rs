#![forbid(unsafe_code)]

//! Path-addressed access to XML trees.
//!
//! A [`Document`] holds an XML tree whose nodes are addressed by [`Node`]
//! handles. On top of the usual tree access and manipulation it offers:
//!
//! - XPath 1.0 evaluation ([`Document::evaluate`], [`Document::select`]),
//!   with namespace prefixes registered per document
//!   ([`Document::register_namespace`]).
//! - Lookups that create what is missing
//!   ([`Document::select_single_node`]), so a write to a path always has a
//!   node to land on.
//! - Typed getters and setters for the text at a path
//!   ([`Document::get_int_value`], [`Document::set_value`] and friends).
//! - Element building helpers ([`Document::create_child`],
//!   [`Document::rename_node`], [`Document::append_xml`]).
//! - Import of JSON into an element tree ([`Document::load_from_json`]) and
//!   export of element children as JSON ([`Document::children_as_map`]).
//!
//! ```rust
//! use xmlpath::Document;
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! doc.set_string_value(root, "/config/server/@host", "localhost");
//! doc.set_int_value(root, "/config/server/port", 8080);
//!
//! assert_eq!(
//!     doc.to_string(root)?,
//!     r#"<config><server host="localhost"><port>8080</port></server></config>"#
//! );
//! assert_eq!(doc.get_int_value(root, "/config/server/port", 80), 8080);
//! assert_eq!(doc.select_nodes(root, "//server").len(), 1);
//! # Ok::<(), xmlpath::Error>(())
//! ```
//!
//! Operations addressed by path never fail with an error: what cannot be
//! done is logged through the [`log`](https://docs.rs/log) facade and the
//! result is `None`, `false` or empty.

mod access;
mod builder;
mod creation;
mod document;
mod encoding;
mod entity;
mod error;
mod interned;
mod json;
mod manipulation;
mod nameaccess;
mod parse;
mod registry;
mod resolve;
mod serialize;
mod step;
mod typed;
mod valueaccess;
mod xmlvalue;

#[cfg(feature = "proptest")]
pub mod proptest;
pub mod xpath;

pub use access::NodeEdge;
pub use document::{Document, Node};
pub use error::Error;
pub use json::{
    make_safe_name, ARRAY_ATTRIBUTE, DEFAULT_ROOT_NAME, INVALID_NAME, INVALID_ROOT_NAME,
    ITEM_NAME, NAME_ATTRIBUTE, NULL_ATTRIBUTE,
};
pub use interned::{NameId, NamespaceId, PrefixId};
pub use registry::NamespaceRegistry;
pub use step::{StepInfo, StepKind};
pub use typed::ScalarValue;
pub use xmlvalue::{
    Attribute, Comment, Element, EntityRef, ProcessingInstruction, Text, Value, ValueType,
};
