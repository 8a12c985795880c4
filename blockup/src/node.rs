//! Shared node machinery: escaping, validators, and the content node enum.

use compact_str::CompactString;
use std::fmt;
use std::sync::Arc;

use crate::element::Element;
use crate::instruction::{Comment, Instruction};

/// Escape `&`, `<`, `>`, `'` and `"` as XML entities.
///
/// Every other character is copied unchanged. Callers apply this exactly
/// once to each emitted fragment; existing entities are not recognised, so
/// escaping already-escaped text encodes its ampersands again.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

/// Append `text` to `out` with XML entities escaped.
pub(crate) fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

type Predicate = dyn Fn(&Element) -> bool + Send + Sync;

/// A named predicate over an element instance.
///
/// Validators are registered per element type and inherited by subtypes.
/// Cloning shares the predicate, and inherited lists are de-duplicated by
/// that identity.
#[derive(Clone)]
pub struct Validator {
    label: CompactString,
    check: Arc<Predicate>,
}

impl Validator {
    /// Create a validator from a label and a predicate.
    pub fn new<F>(label: impl Into<CompactString>, check: F) -> Self
    where
        F: Fn(&Element) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            check: Arc::new(check),
        }
    }

    /// Human-readable description, reported by [`Element::violations`].
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the predicate against an element.
    pub fn check(&self, element: &Element) -> bool {
        (self.check)(element)
    }

    /// True if both handles share one predicate.
    pub fn same_as(&self, other: &Validator) -> bool {
        Arc::ptr_eq(&self.check, &other.check)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.label).finish()
    }
}

/// One entry of an element's ordered content.
#[derive(Debug, Clone)]
pub enum Node {
    /// A child element
    Element(Element),
    /// A processing instruction
    Instruction(Instruction),
    /// A comment
    Comment(Comment),
    /// Free text, escaped when rendered
    Text(String),
}

impl Node {
    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Returns true if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Get as element reference.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as mutable element reference.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as text reference.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_escape_all_specials() {
        assert_eq!(
            escape(r#"a & b < c > d ' e " f"#),
            "a &amp; b &lt; c &gt; d &apos; e &quot; f"
        );
    }

    #[test]
    fn test_escape_leaves_other_text() {
        assert_eq!(escape("plain text – ünïcode"), "plain text – ünïcode");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_escape_is_a_single_pass() {
        let once = escape("<&>");
        assert_eq!(once, "&lt;&amp;&gt;");
        // A second pass re-encodes the ampersands; fields are escaped once.
        assert_eq!(escape(&once), "&amp;lt;&amp;amp;&amp;gt;");
    }

    #[test]
    fn test_validator_identity() {
        let a = Validator::new("always", |_| true);
        let b = a.clone();
        let c = Validator::new("always", |_| true);
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        assert_eq!(a.label(), "always");
    }
}
