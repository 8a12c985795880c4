//! Schema-driven XML element model with a builder protocol.
//!
//! blockup provides:
//! - **Element types**: declared once with their attributes, child elements,
//!   cardinality and validators, inheriting and merging along a type chain
//! - **Building**: documents assembled through nested builder callbacks,
//!   with ordered content plus a name-indexed tracker
//! - **Open elements**: undeclared child names accepted and recorded per
//!   instance
//! - **Serialization**: single-line XML with namespace inheritance
//!
//! # Example
//!
//! ```rust
//! use blockup::{AttributeDecl, Base, Element, ElementDecl, ElementType, NameSpace};
//!
//! let person = ElementType::builder("Person", Base::Map)
//!     .element("name", ElementDecl::data().required())
//!     .build();
//! let feed = ElementType::builder("Feed", Base::Map)
//!     .namespace(NameSpace::new("http://www.w3.org/2005/Atom"))
//!     .attribute("xml:lang", AttributeDecl::new())
//!     .element("title", ElementDecl::data().required())
//!     .element("author", ElementDecl::element(&person).multiple())
//!     .build();
//!
//! let doc = Element::build_with(&feed, |f| {
//!     f.element("title", "Example")?;
//!     f.element_with("author", |a| {
//!         a.element("name", "Tom")?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert!(doc.is_valid());
//! assert_eq!(
//!     doc.to_xml(),
//!     r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Example</title><author><name>Tom</name></author></feed>"#
//! );
//! ```

mod tracing_macros;

pub mod attribute;
pub mod element;
pub mod error;
pub mod instruction;
pub mod namespace;
pub mod node;
mod open;
pub mod schema;
pub mod serialize;

pub use attribute::{AttributeValue, Value, ValueKind};
pub use element::{Args, Builder, Element, Entry};
pub use error::BuildError;
pub use instruction::{Comment, Instruction};
pub use namespace::NameSpace;
pub use node::{Node, Validator, escape};
pub use schema::{AttributeDecl, Base, ChildKind, ElementDecl, ElementType, ElementTypeBuilder, pluralize};
pub use serialize::{RenderOptions, XML_PRELUDE, render_element, render_fragment};
