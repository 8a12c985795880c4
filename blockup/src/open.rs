//! Free text for full elements and schema growth for open elements.
//!
//! An open element accepts child names its type never declared. The first
//! time such a name is built, it is recorded in the element's own extension
//! registry as a child of the built-in `Open` type: multiple when added with
//! [`Element::element`], singular when added with [`Element::assign`]. Later
//! builds of that name reuse the recorded declaration, so a name keeps one
//! tracker shape for the whole build. The registry belongs to the instance;
//! the type's declared schema is never modified, and no other instance sees
//! what this one learned.

use compact_str::CompactString;

use crate::attribute::Value;
use crate::debug;
use crate::element::Element;
use crate::error::BuildError;
use crate::node::Node;
use crate::schema::{ElementDecl, ElementType};

impl Element {
    /// Append a free text node between child elements.
    ///
    /// Only full and open elements accept text; the text is escaped when
    /// rendered and is not tracked under any name.
    pub fn text(&mut self, text: impl Into<Value>) -> Result<(), BuildError> {
        if !self.element_type().base().accepts_text() {
            return Err(BuildError::TextNotAllowed {
                tag: self.tag().to_string(),
            });
        }
        let text = text.into().to_string();
        self.content_mut()?.nodes.push(Node::Text(text));
        Ok(())
    }

    /// Names this open element learned during its build, in the order first
    /// seen. Empty for every other element.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &ElementDecl)> {
        self.content_ref()
            .into_iter()
            .flat_map(|c| c.extensions.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Declaration for an undeclared name on an open element, registering it
    /// on first use.
    pub(crate) fn open_extension(&mut self, name: &str, multiple: bool) -> ElementDecl {
        let Ok(content) = self.content_mut() else {
            return ElementDecl::data().multiple();
        };
        if let Some(decl) = content.extensions.get(name) {
            return decl.clone();
        }

        let decl = ElementDecl::element(ElementType::open());
        let decl = if multiple { decl.multiple() } else { decl };
        content
            .extensions
            .insert(CompactString::from(name), decl.clone());
        debug!(%name, tag = %self.tag(), multiple, "open element learned a new child name");
        decl
    }
}
