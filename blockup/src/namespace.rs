//! XML namespaces.

use compact_str::CompactString;
use facet::Facet;

use crate::node::escape;

/// A namespace URI with an optional prefix, rendered as an `xmlns`
/// declaration on the element that introduces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct NameSpace {
    /// The namespace URI.
    pub uri: String,
    /// Prefix for `xmlns:prefix`, or `None` for the default namespace.
    pub prefix: Option<CompactString>,
}

impl NameSpace {
    /// A default (unprefixed) namespace.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix: None,
        }
    }

    /// A prefixed namespace.
    pub fn prefixed(prefix: impl Into<CompactString>, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix: Some(prefix.into()),
        }
    }

    /// Render the declaration, e.g. `xmlns="uri"` or `xmlns:atom="uri"`.
    pub fn render(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{}=\"{}\"", prefix, escape(&self.uri)),
            None => format!("xmlns=\"{}\"", escape(&self.uri)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_default_namespace() {
        let ns = NameSpace::new("http://www.w3.org/2005/Atom");
        assert_eq!(ns.render(), "xmlns=\"http://www.w3.org/2005/Atom\"");
    }

    #[test]
    fn test_prefixed_namespace() {
        let ns = NameSpace::prefixed("apps", "http://schemas.google.com/apps/2006");
        assert_eq!(
            ns.render(),
            "xmlns:apps=\"http://schemas.google.com/apps/2006\""
        );
    }

    #[test]
    fn test_uri_is_escaped() {
        let ns = NameSpace::new("urn:x?a=1&b=2");
        assert_eq!(ns.render(), "xmlns=\"urn:x?a=1&amp;b=2\"");
    }
}
