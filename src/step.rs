#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a path step addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StepKind {
    /// `@name`: an attribute of the context element.
    Attribute,
    /// `name` or `prefix:name`: a child element.
    Element,
    /// Anything else: function calls, node tests, empty steps.
    Other,
}

/// A single `/`-delimited path step, split into its parts.
///
/// Only steps that name an element or an attribute without a qualifier can
/// be created when a path does not exist yet.
///
/// ```rust
/// use xmlpath::{StepInfo, StepKind};
///
/// let step = StepInfo::new("ns:item[2]");
/// assert_eq!(step.kind(), StepKind::Element);
/// assert_eq!(step.namespace_prefix(), "ns");
/// assert_eq!(step.local_name(), "item");
/// assert_eq!(step.qualifier(), "[2]");
/// assert!(step.has_qualifier());
///
/// assert_eq!(StepInfo::new("text()").kind(), StepKind::Other);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInfo {
    kind: StepKind,
    namespace_prefix: String,
    local_name: String,
    qualifier: String,
    prefix_overridden: bool,
}

impl StepInfo {
    /// Classify a step.
    pub fn new(segment: &str) -> Self {
        let segment = segment.trim();
        if segment.is_empty() || segment.contains(['(', ')']) {
            return StepInfo {
                kind: StepKind::Other,
                namespace_prefix: String::new(),
                local_name: String::new(),
                qualifier: String::new(),
                prefix_overridden: false,
            };
        }
        let (kind, rest) = match segment.strip_prefix('@') {
            Some(rest) => (StepKind::Attribute, rest),
            None => (StepKind::Element, segment),
        };
        let (name, qualifier) = match rest.find('[') {
            Some(i) => rest.split_at(i),
            None => (rest, ""),
        };
        let (namespace_prefix, local_name) = match name.split_once(':') {
            Some((prefix, local)) => (prefix.trim(), local.trim()),
            None => ("", name.trim()),
        };
        StepInfo {
            kind,
            namespace_prefix: namespace_prefix.to_string(),
            local_name: local_name.to_string(),
            qualifier: qualifier.to_string(),
            prefix_overridden: false,
        }
    }

    /// What the step addresses.
    #[inline]
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    /// The prefix before the `:`, or `""`.
    #[inline]
    pub fn namespace_prefix(&self) -> &str {
        &self.namespace_prefix
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The bracketed predicate including its brackets, or `""`.
    #[inline]
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    #[inline]
    pub fn has_qualifier(&self) -> bool {
        !self.qualifier.is_empty()
    }

    /// The qualified name: `prefix:local`, or `local` without a prefix.
    pub fn fq_name(&self) -> String {
        if self.namespace_prefix.is_empty() {
            self.local_name.clone()
        } else {
            format!("{}:{}", self.namespace_prefix, self.local_name)
        }
    }

    /// Replace the prefix once, for a prefix generated after the step was
    /// classified.
    ///
    /// Returns false, leaving the step unchanged, if the prefix was already
    /// replaced before.
    pub fn set_prefix(&mut self, prefix: &str) -> bool {
        if self.prefix_overridden {
            return false;
        }
        self.namespace_prefix = prefix.trim().to_string();
        self.prefix_overridden = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo", StepKind::Element, "", "foo", "")]
    #[case("@id", StepKind::Attribute, "", "id", "")]
    #[case("ns:foo", StepKind::Element, "ns", "foo", "")]
    #[case("foo[2]", StepKind::Element, "", "foo", "[2]")]
    #[case("@ns:id", StepKind::Attribute, "ns", "id", "")]
    #[case("  foo  ", StepKind::Element, "", "foo", "")]
    #[case("ns:foo[@a='x:y']", StepKind::Element, "ns", "foo", "[@a='x:y']")]
    #[case("[1]", StepKind::Element, "", "", "[1]")]
    #[case("count(foo)", StepKind::Other, "", "", "")]
    #[case("text()", StepKind::Other, "", "", "")]
    #[case("node()", StepKind::Other, "", "", "")]
    #[case("", StepKind::Other, "", "", "")]
    #[case("   ", StepKind::Other, "", "", "")]
    fn test_classify(
        #[case] segment: &str,
        #[case] kind: StepKind,
        #[case] prefix: &str,
        #[case] local: &str,
        #[case] qualifier: &str,
    ) {
        let step = StepInfo::new(segment);
        assert_eq!(step.kind(), kind);
        assert_eq!(step.namespace_prefix(), prefix);
        assert_eq!(step.local_name(), local);
        assert_eq!(step.qualifier(), qualifier);
        assert_eq!(step.has_qualifier(), !qualifier.is_empty());
    }

    #[test]
    fn test_fq_name() {
        assert_eq!(StepInfo::new("ns:foo[1]").fq_name(), "ns:foo");
        assert_eq!(StepInfo::new("@bar").fq_name(), "bar");
    }

    #[test]
    fn test_set_prefix_once() {
        let mut step = StepInfo::new("foo");
        assert!(step.set_prefix("abcd"));
        assert_eq!(step.fq_name(), "abcd:foo");
        assert!(!step.set_prefix("efgh"));
        assert_eq!(step.fq_name(), "abcd:foo");
    }
}
