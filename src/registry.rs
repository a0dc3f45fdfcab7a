use ahash::HashMap;

/// Prefix to namespace URI bindings used when evaluating paths.
///
/// Each [`Document`](crate::Document) owns exactly one registry. Entries
/// only change through [`NamespaceRegistry::register`] (usually via
/// [`Document::register_namespace`](crate::Document::register_namespace));
/// path evaluation reads it to resolve prefixes such as `ns` in `ns:foo`.
///
/// The empty prefix may be registered; it is only consulted for creation,
/// as XPath 1.0 name tests without a prefix never match a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamespaceRegistry {
    entries: HashMap<String, String>,
    // insertion order, so iteration is stable
    order: Vec<String>,
}

impl NamespaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `uri`, replacing an earlier binding of the same prefix.
    pub fn register(&mut self, prefix: &str, uri: &str) {
        if self
            .entries
            .insert(prefix.to_string(), uri.to_string())
            .is_none()
        {
            self.order.push(prefix.to_string());
        }
    }

    /// The URI bound to `prefix`, if any.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries.get(prefix).map(|s| s.as_str())
    }

    /// The first registered prefix bound to `uri`, if any.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.iter()
            .find(|(_, registered)| *registered == uri)
            .map(|(prefix, _)| prefix)
    }

    /// Return `true` if `prefix` is bound.
    pub fn contains(&self, prefix: &str) -> bool {
        self.entries.contains_key(prefix)
    }

    /// Bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.order
            .iter()
            .map(move |prefix| (prefix.as_str(), self.entries[prefix].as_str()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
