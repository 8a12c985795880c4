//! Processing instructions and comments.

use compact_str::CompactString;
use facet::Facet;

use crate::attribute::AttributeValue;

/// A processing instruction, `<?target content attr="v"?>`.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Instruction {
    /// The instruction target, e.g. `xml` or `xml-stylesheet`
    pub target: CompactString,
    /// Positional arguments, joined by spaces
    pub content: Vec<String>,
    /// Trailing attributes in assignment order
    pub attributes: Vec<AttributeValue>,
}

impl Instruction {
    /// Create an instruction with no content or attributes.
    pub fn new(target: impl Into<CompactString>) -> Self {
        Self {
            target: target.into(),
            content: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, content: impl Into<String>) -> Self {
        self.content.push(content.into());
        self
    }

    /// Set an attribute, keeping its first position if already present.
    pub fn attr(mut self, name: impl Into<CompactString>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(AttributeValue::new(name, value)),
        }
        self
    }

    /// The `<?xml version=".." encoding=".."?>` declaration.
    pub fn xml_declaration(version: &str, encoding: &str) -> Self {
        Self::new("xml")
            .attr("version", version)
            .attr("encoding", encoding)
    }

    /// Render the instruction. Empty parts are omitted.
    pub fn render(&self) -> String {
        let mut out = String::from("<?");
        out.push_str(&self.target);
        for content in self.content.iter().filter(|c| !c.is_empty()) {
            out.push(' ');
            out.push_str(content);
        }
        for attr in &self.attributes {
            out.push(' ');
            attr.write_to(&mut out);
        }
        out.push_str("?>");
        out
    }
}

/// A comment, `<!-- text -->`.
///
/// The text is emitted verbatim: it is not escaped, and a `--` inside it is
/// not rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Comment {
    /// The comment text
    pub text: String,
}

impl Comment {
    /// Create a comment.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Render the comment.
    pub fn render(&self) -> String {
        format!("<!-- {} -->", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_instruction_with_content_and_attrs() {
        let pi = Instruction::new("xml-stylesheet")
            .arg("alternate")
            .attr("type", "text/xsl")
            .attr("href", "feed.xsl");
        assert_eq!(
            pi.render(),
            "<?xml-stylesheet alternate type=\"text/xsl\" href=\"feed.xsl\"?>"
        );
    }

    #[test]
    fn test_xml_declaration() {
        let pi = Instruction::xml_declaration("1.0", "UTF-8");
        assert_eq!(pi.render(), "<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    }

    #[test]
    fn test_instruction_attr_reassign_keeps_position() {
        let pi = Instruction::new("pi").attr("a", "1").attr("b", "2").attr("a", "3");
        assert_eq!(pi.render(), "<?pi a=\"3\" b=\"2\"?>");
    }

    #[test]
    fn test_comment_is_verbatim() {
        let c = Comment::new("a < b && c");
        assert_eq!(c.render(), "<!-- a < b && c -->");
    }
}
