//! XML serializer for built elements.
//!
//! Output is a single line with no insignificant whitespace:
//!
//! - Elements with no body always self-close (`<link href="/"/>`)
//! - Text and attribute values are escaped exactly once
//! - Comments and processing instructions are emitted verbatim
//! - A namespace declaration is written only where the namespace in effect
//!   changes, so children inheriting it never repeat it
//! - Document types get an XML declaration on the first line

use std::fmt::Write;

use crate::element::Element;
use crate::namespace::NameSpace;
use crate::node::{Node, push_escaped};

/// The prelude written before a document element.
pub const XML_PRELUDE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Options for rendering.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Whether to sort attributes by name (default: false, assignment order).
    pub sort_attributes: bool,
    /// Force the XML declaration on or off. `None` (the default) writes it
    /// for document types only.
    pub declaration: Option<bool>,
}

impl RenderOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit attributes sorted by name instead of assignment order.
    pub fn sort_attributes(mut self) -> Self {
        self.sort_attributes = true;
        self
    }

    /// Force the XML declaration on or off.
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = Some(declaration);
        self
    }
}

/// Render an element and its descendants, with the XML declaration first
/// when the options or the element's type call for one.
pub fn render_element(elem: &Element, opts: &RenderOptions) -> String {
    let mut out = String::new();
    let declare = opts
        .declaration
        .unwrap_or_else(|| elem.element_type().is_document());
    if declare {
        out.push_str(XML_PRELUDE);
    }
    let mut ser = Serializer::new(&mut out, opts);
    ser.write_element(elem, None);
    out
}

/// Render a slice of nodes (fragment) with no namespace in effect.
pub fn render_fragment(nodes: &[Node], opts: &RenderOptions) -> String {
    let mut out = String::new();
    let mut ser = Serializer::new(&mut out, opts);
    for node in nodes {
        ser.write_node(node, None);
    }
    out
}

/// Classification of a data element's body by its content-type attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    /// Wrapped in a `<div>`, unescaped
    Xhtml,
    /// Emitted as-is
    Markup,
    /// Trimmed and escaped
    Text,
}

/// Media types compare case-insensitively.
fn body_kind(content_type: Option<&str>) -> BodyKind {
    let Some(t) = content_type.map(str::to_ascii_lowercase) else {
        return BodyKind::Text;
    };
    if t == "xhtml" {
        BodyKind::Xhtml
    } else if t.ends_with("/xml") || t.ends_with("+xml") {
        BodyKind::Markup
    } else {
        BodyKind::Text
    }
}

struct Serializer<'a, W: Write> {
    out: &'a mut W,
    options: &'a RenderOptions,
    scratch: String,
}

impl<'a, W: Write> Serializer<'a, W> {
    fn new(out: &'a mut W, options: &'a RenderOptions) -> Self {
        Self {
            out,
            options,
            scratch: String::new(),
        }
    }

    fn write_escaped(&mut self, text: &str) {
        self.scratch.clear();
        push_escaped(&mut self.scratch, text);
        let _ = self.out.write_str(&self.scratch);
    }

    fn write_attr(&mut self, name: &str, value: &str) {
        let _ = write!(self.out, " ");
        self.write_escaped(name);
        let _ = write!(self.out, "=\"");
        self.write_escaped(value);
        let _ = write!(self.out, "\"");
    }

    fn write_node(&mut self, node: &Node, inherited: Option<&NameSpace>) {
        match node {
            Node::Element(elem) => self.write_element(elem, inherited),
            Node::Text(text) => self.write_escaped(text),
            Node::Instruction(pi) => {
                let _ = self.out.write_str(&pi.render());
            }
            Node::Comment(comment) => {
                let _ = self.out.write_str(&comment.render());
            }
        }
    }

    fn write_element(&mut self, elem: &Element, inherited: Option<&NameSpace>) {
        let tag = elem.tag();
        let ty = elem.element_type();
        let ns = ty.resolved_namespace().or(inherited);

        // Opening tag
        let _ = write!(self.out, "<{tag}");
        if let Some(ns) = ns
            && Some(ns) != inherited
        {
            let _ = write!(self.out, " {}", ns.render());
        }

        // Attributes
        if self.options.sort_attributes {
            let mut attrs: Vec<_> = elem.attributes().collect();
            attrs.sort_by(|a, b| a.name.cmp(&b.name));
            for attr in attrs {
                self.write_attr(&attr.name, &attr.value);
            }
        } else {
            for attr in elem.attributes() {
                self.write_attr(&attr.name, &attr.value);
            }
        }

        // Data elements carry a scalar body
        if let Some(value) = elem.value() {
            let content_type = ty.content_type_attribute().and_then(|a| elem.attr(a));
            let kind = body_kind(content_type);
            let body = match kind {
                BodyKind::Text => value.trim(),
                BodyKind::Xhtml | BodyKind::Markup => value,
            };
            if body.is_empty() {
                let _ = write!(self.out, "/>");
                return;
            }
            let _ = write!(self.out, ">");
            match kind {
                BodyKind::Xhtml => {
                    let _ = write!(self.out, "<div>{body}</div>");
                }
                BodyKind::Markup => {
                    let _ = self.out.write_str(body);
                }
                BodyKind::Text => self.write_escaped(body),
            }
            let _ = write!(self.out, "</{tag}>");
            return;
        }

        if elem.content().is_empty() {
            let _ = write!(self.out, "/>");
            return;
        }
        let _ = write!(self.out, ">");
        for child in elem.content() {
            self.write_node(child, ns);
        }
        let _ = write!(self.out, "</{tag}>");
    }
}

impl Element {
    /// Render this element to an XML string with default options.
    pub fn to_xml(&self) -> String {
        render_element(self, &RenderOptions::default())
    }

    /// Render this element with custom options.
    pub fn to_xml_with_options(&self, opts: &RenderOptions) -> String {
        render_element(self, opts)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Args;
    use crate::instruction::Instruction;
    use crate::schema::{AttributeDecl, Base, ElementDecl, ElementType};
    use facet_testhelpers::test;
    use std::sync::Arc;

    fn feed_types() -> (Arc<ElementType>, Arc<ElementType>) {
        let person = ElementType::builder("Person", Base::Map)
            .element("name", ElementDecl::data())
            .build();
        let feed = ElementType::builder("Feed", Base::Map)
            .namespace(NameSpace::new("http://www.w3.org/2005/Atom"))
            .element("author", ElementDecl::element(&person))
            .element("title", ElementDecl::data())
            .build();
        (person, feed)
    }

    #[test]
    fn test_tag_self_closes() {
        let br = ElementType::builder("Br", Base::Tag).build();
        assert_eq!(Element::new(&br).to_xml(), "<br/>");

        let link = Element::build(&br, [("href", "/a?b&c")]).unwrap();
        assert_eq!(link.to_xml(), "<br href=\"/a?b&amp;c\"/>");
    }

    #[test]
    fn test_empty_data_self_closes() {
        let title = ElementType::builder("Title", Base::Data).build();
        assert_eq!(Element::new(&title).to_xml(), "<title/>");
        assert_eq!(Element::build(&title, "   ").unwrap().to_xml(), "<title/>");
    }

    #[test]
    fn test_text_body_is_trimmed_and_escaped() {
        let title = ElementType::builder("Title", Base::Data).build();
        let t = Element::build(&title, "  Fish & Chips \n").unwrap();
        assert_eq!(t.to_xml(), "<title>Fish &amp; Chips</title>");
    }

    #[test]
    fn test_content_type_bodies() {
        let content = ElementType::builder("Content", Base::Data)
            .content_type("type")
            .attribute("type", AttributeDecl::new())
            .build();

        let xhtml = Element::build(&content, Args::new().attr("type", "XHTML").value("<b>hi</b>"))
            .unwrap();
        assert_eq!(
            xhtml.to_xml(),
            "<content type=\"XHTML\"><div><b>hi</b></div></content>"
        );

        let svg = Element::build(
            &content,
            Args::new().attr("type", "image/svg+xml").value("<svg/>"),
        )
        .unwrap();
        assert_eq!(
            svg.to_xml(),
            "<content type=\"image/svg+xml\"><svg/></content>"
        );

        let html = Element::build(&content, Args::new().attr("type", "html").value("<p>"))
            .unwrap();
        assert_eq!(html.to_xml(), "<content type=\"html\">&lt;p&gt;</content>");
    }

    #[test]
    fn test_media_type_matching_ignores_case() {
        assert_eq!(body_kind(Some("XHTML")), BodyKind::Xhtml);
        assert_eq!(body_kind(Some("IMAGE/SVG+XML")), BodyKind::Markup);
        assert_eq!(body_kind(Some("Application/XML")), BodyKind::Markup);
        assert_eq!(body_kind(Some("text/html")), BodyKind::Text);
        assert_eq!(body_kind(None), BodyKind::Text);
    }

    #[test]
    fn test_namespace_emitted_once() {
        let (_, feed) = feed_types();
        let doc = Element::build_with(&feed, |f| {
            f.element("author", Args::new().with(|a| {
                a.element("name", "Tom")?;
                Ok(())
            }))?;
            f.element("title", "YEPPY!")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(
            doc.to_xml(),
            "<feed xmlns=\"http://www.w3.org/2005/Atom\"><author><name>Tom</name></author><title>YEPPY!</title></feed>"
        );
    }

    #[test]
    fn test_child_namespace_override() {
        let ext = ElementType::builder("Ext", Base::Data)
            .namespace(NameSpace::prefixed("x", "urn:x"))
            .build();
        let root = ElementType::builder("Root", Base::Map)
            .namespace(NameSpace::new("urn:root"))
            .element("ext", ElementDecl::element(&ext))
            .build();
        let doc = Element::build_with(&root, |r| {
            r.element("ext", "v")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            doc.to_xml(),
            "<root xmlns=\"urn:root\"><ext xmlns:x=\"urn:x\">v</ext></root>"
        );
    }

    #[test]
    fn test_sorted_attributes() {
        let (_, feed) = feed_types();
        let doc = Element::build_with(&feed, |f| {
            f.element("author", [("name", "Tom"), ("email", "trans@ggmail.nut")])?;
            Ok(())
        })
        .unwrap();

        let author = doc.first("author").unwrap();
        assert_eq!(
            author.to_xml(),
            "<author name=\"Tom\" email=\"trans@ggmail.nut\"/>"
        );
        assert_eq!(
            author.to_xml_with_options(&RenderOptions::new().sort_attributes()),
            "<author email=\"trans@ggmail.nut\" name=\"Tom\"/>"
        );
    }

    #[test]
    fn test_document_prelude() {
        let doc_ty = ElementType::builder("Document", Base::Map)
            .tag("feed")
            .document()
            .build();
        let doc = Element::new(&doc_ty);
        assert_eq!(doc.to_xml(), format!("{XML_PRELUDE}<feed/>"));
        assert_eq!(
            doc.to_xml_with_options(&RenderOptions::new().with_declaration(false)),
            "<feed/>"
        );
    }

    #[test]
    fn test_nested_document_has_no_prelude() {
        let doc_ty = ElementType::builder("Inner", Base::Map).document().build();
        let outer = ElementType::builder("Outer", Base::Map)
            .element("inner", ElementDecl::element(&doc_ty))
            .build();
        let doc = Element::build_with(&outer, |o| {
            o.element("inner", Args::new().attr("a", 1))?;
            Ok(())
        })
        .unwrap();
        assert_eq!(doc.to_xml(), "<outer><inner a=\"1\"/></outer>");
    }

    #[test]
    fn test_mixed_content() {
        let para = ElementType::builder("P", Base::Full).build();
        let p = Element::build_with(&para, |p| {
            p.instruct(Instruction::new("php").arg("echo 1;"))?;
            p.text("a < b ")?;
            p.element("em", "yes")?;
            p.comment("note")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            p.to_xml(),
            "<p><?php echo 1;?>a &lt; b <em>yes</em><!-- note --></p>"
        );
        assert_eq!(
            render_fragment(p.content(), &RenderOptions::default()),
            "<?php echo 1;?>a &lt; b <em>yes</em><!-- note -->"
        );
    }
}
