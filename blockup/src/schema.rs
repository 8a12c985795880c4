//! Element types and their declared schemas.
//!
//! An [`ElementType`] is declared once through an [`ElementTypeBuilder`] and
//! then shared (usually from a `LazyLock` static) by every instance built
//! from it. Declaring a type composes its effective schema on the spot:
//! the parent's attribute and element tables come first, and entries the
//! type declares itself override same-named inherited entries in place.
//!
//! ```rust
//! use blockup::{Base, ElementDecl, ElementType};
//!
//! let person = ElementType::builder("Person", Base::Map)
//!     .element("name", ElementDecl::data().required())
//!     .element("email", ElementDecl::data())
//!     .build();
//!
//! let author = ElementType::extend("Author", &person)
//!     .element("uri", ElementDecl::data())
//!     .build();
//!
//! assert!(author.element("name").is_some_and(|decl| decl.required));
//! assert_eq!(author.default_tag(), "author");
//! ```

use compact_str::{CompactString, format_compact};
use facet::Facet;
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::attribute::ValueKind;
use crate::element::Element;
use crate::namespace::NameSpace;
use crate::node::Validator;

/// The structural variety of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Base {
    /// Attributes only; always self-closing
    Tag,
    /// Attributes plus one scalar value
    Data,
    /// Attributes plus ordered, schema-tracked child nodes
    Map,
    /// A map that also accepts free text between children
    Full,
    /// A full element that admits undeclared child names
    Open,
}

impl Base {
    /// The built-in type every user type of this base descends from.
    pub fn element_type(self) -> &'static Arc<ElementType> {
        match self {
            Base::Tag => &TAG,
            Base::Data => &DATA,
            Base::Map => &MAP,
            Base::Full => &FULL,
            Base::Open => &OPEN,
        }
    }

    /// True for bases that hold a scalar value.
    pub fn holds_value(self) -> bool {
        self == Base::Data
    }

    /// True for bases that hold child nodes.
    pub fn is_container(self) -> bool {
        matches!(self, Base::Map | Base::Full | Base::Open)
    }

    /// True for bases that accept free text nodes.
    pub fn accepts_text(self) -> bool {
        matches!(self, Base::Full | Base::Open)
    }
}

static TAG: LazyLock<Arc<ElementType>> = LazyLock::new(|| builtin("Tag", Base::Tag));
static DATA: LazyLock<Arc<ElementType>> = LazyLock::new(|| builtin("Data", Base::Data));
static MAP: LazyLock<Arc<ElementType>> = LazyLock::new(|| builtin("Map", Base::Map));
static FULL: LazyLock<Arc<ElementType>> = LazyLock::new(|| builtin("Full", Base::Full));
static OPEN: LazyLock<Arc<ElementType>> = LazyLock::new(|| builtin("Open", Base::Open));

/// Built-in types declare the attributes common to every tag.
fn builtin(name: &str, base: Base) -> Arc<ElementType> {
    ElementTypeBuilder::new(name, base, None)
        .attribute("xml:base", AttributeDecl::new())
        .attribute("xml:lang", AttributeDecl::new())
        .build()
}

/// Declaration of an attribute.
#[derive(Debug, Clone, Default)]
pub struct AttributeDecl {
    /// Conversion applied to assigned values
    pub kind: ValueKind,
    /// Whether validity requires the attribute to be set
    pub required: bool,
    /// Value applied at construction when the caller does not set one
    pub default: Option<String>,
}

impl AttributeDecl {
    /// A plain, optional attribute.
    pub fn new() -> Self {
        Self::default()
    }

    /// An optional attribute converted by `kind`.
    pub fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Give the attribute a default value.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// What a declared child element is built as.
#[derive(Debug, Clone)]
pub enum ChildKind {
    /// An element of the given type, built with the child's name as its tag
    Element(Arc<ElementType>),
    /// A plain value wrapper: a generic data element whose value is
    /// converted by the kind
    Value(ValueKind),
}

/// Declaration of a child element.
#[derive(Debug, Clone)]
pub struct ElementDecl {
    /// How the child is built
    pub kind: ChildKind,
    /// Whether validity requires the child to be present
    pub required: bool,
    /// Whether the child accumulates into a list instead of overwriting
    pub multiple: bool,
    /// Explicit plural accessor name for a multiple child
    pub plural: Option<CompactString>,
}

impl ElementDecl {
    /// A generic data child (the default kind).
    pub fn data() -> Self {
        Self::element(Base::Data.element_type())
    }

    /// A child of the given element type.
    pub fn element(ty: &Arc<ElementType>) -> Self {
        Self {
            kind: ChildKind::Element(Arc::clone(ty)),
            required: false,
            multiple: false,
            plural: None,
        }
    }

    /// A plain value child converted by `kind`.
    pub fn value(kind: ValueKind) -> Self {
        Self {
            kind: ChildKind::Value(kind),
            required: false,
            multiple: false,
            plural: None,
        }
    }

    /// Mark the child as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Let the child occur any number of times.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Set the plural accessor name explicitly (implies `multiple`).
    pub fn plural(mut self, plural: impl Into<CompactString>) -> Self {
        self.plural = Some(plural.into());
        self.multiple = true;
        self
    }
}

/// Plural accessor name used when none is declared: `entry` → `entries`,
/// `address` → `addresses`, anything else gets an `s`.
pub fn pluralize(name: &str) -> CompactString {
    if let Some(stem) = name.strip_suffix('y') {
        format_compact!("{stem}ies")
    } else if name.ends_with('s') {
        format_compact!("{name}es")
    } else {
        format_compact!("{name}s")
    }
}

/// An element type: its structural base, its namespace and its effective
/// (inherited and merged) schema.
pub struct ElementType {
    name: CompactString,
    base: Base,
    parent: Option<Arc<ElementType>>,
    namespace: Option<NameSpace>,
    tag: Option<CompactString>,
    attributes: IndexMap<CompactString, AttributeDecl>,
    elements: IndexMap<CompactString, ElementDecl>,
    plurals: IndexMap<CompactString, CompactString>,
    validators: Vec<Validator>,
    content_type: Option<CompactString>,
    document: bool,
}

impl ElementType {
    /// Declare a type deriving directly from the built-in type for `base`.
    pub fn builder(name: impl Into<CompactString>, base: Base) -> ElementTypeBuilder {
        ElementTypeBuilder::new(name, base, Some(Arc::clone(base.element_type())))
    }

    /// Declare a subtype of `parent`, inheriting its base and schema.
    pub fn extend(name: impl Into<CompactString>, parent: &Arc<ElementType>) -> ElementTypeBuilder {
        ElementTypeBuilder::new(name, parent.base, Some(Arc::clone(parent)))
    }

    /// The built-in `Tag` type.
    pub fn tag() -> &'static Arc<ElementType> {
        Base::Tag.element_type()
    }

    /// The built-in `Data` type.
    pub fn data() -> &'static Arc<ElementType> {
        Base::Data.element_type()
    }

    /// The built-in `Map` type.
    pub fn map() -> &'static Arc<ElementType> {
        Base::Map.element_type()
    }

    /// The built-in `Full` type.
    pub fn full() -> &'static Arc<ElementType> {
        Base::Full.element_type()
    }

    /// The built-in `Open` type.
    pub fn open() -> &'static Arc<ElementType> {
        Base::Open.element_type()
    }

    /// The type's name, e.g. `Feed`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type's structural base.
    pub fn base(&self) -> Base {
        self.base
    }

    /// The type this one was declared from.
    pub fn parent(&self) -> Option<&Arc<ElementType>> {
        self.parent.as_ref()
    }

    /// Iterate over this type and its ancestors, nearest first.
    pub fn ancestry(&self) -> impl Iterator<Item = &ElementType> {
        std::iter::successors(Some(self), |ty| ty.parent.as_deref())
    }

    /// True if `self` is `other` or descends from it.
    pub fn is_a(&self, other: &ElementType) -> bool {
        self.ancestry().any(|ty| std::ptr::eq(ty, other))
    }

    /// The namespace declared on this very type.
    pub fn own_namespace(&self) -> Option<&NameSpace> {
        self.namespace.as_ref()
    }

    /// The namespace in effect for instances: the nearest one declared
    /// along the ancestry.
    pub fn resolved_namespace(&self) -> Option<&NameSpace> {
        self.ancestry().find_map(|ty| ty.namespace.as_ref())
    }

    /// Tag name used when an instance is created without one: the nearest
    /// explicitly declared tag, else the lower-cased type name.
    pub fn default_tag(&self) -> CompactString {
        match self.ancestry().find_map(|ty| ty.tag.as_ref()) {
            Some(tag) => tag.clone(),
            None => self.name.to_lowercase().into(),
        }
    }

    /// Look up an attribute in the merged schema.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.get(name)
    }

    /// The merged attribute schema, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeDecl)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a child element in the merged schema.
    pub fn element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.get(name)
    }

    /// The merged element schema, in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &ElementDecl)> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The element name behind a plural accessor name.
    pub fn element_for_plural(&self, plural: &str) -> Option<&str> {
        self.plurals.get(plural).map(|name| name.as_str())
    }

    /// Every validator in effect, ancestors' first.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Attribute holding the content-type discriminator of a data type.
    pub fn content_type_attribute(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// True if rendering an instance emits the XML declaration first.
    pub fn is_document(&self) -> bool {
        self.document
    }

    /// Evaluate every inherited validator against `element`.
    pub fn check(&self, element: &Element) -> bool {
        self.validators.iter().all(|v| v.check(element))
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementType")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("namespace", &self.resolved_namespace())
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("elements", &self.elements.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Declaration API for an [`ElementType`].
pub struct ElementTypeBuilder {
    name: CompactString,
    base: Base,
    parent: Option<Arc<ElementType>>,
    namespace: Option<NameSpace>,
    tag: Option<CompactString>,
    attributes: IndexMap<CompactString, AttributeDecl>,
    elements: IndexMap<CompactString, ElementDecl>,
    validators: Vec<Validator>,
    content_type: Option<CompactString>,
    document: bool,
}

impl ElementTypeBuilder {
    fn new(name: impl Into<CompactString>, base: Base, parent: Option<Arc<ElementType>>) -> Self {
        let document = parent.as_ref().is_some_and(|p| p.document);
        Self {
            name: name.into(),
            base,
            parent,
            namespace: None,
            tag: None,
            attributes: IndexMap::new(),
            elements: IndexMap::new(),
            validators: Vec::new(),
            content_type: None,
            document,
        }
    }

    /// Set the type's own namespace.
    pub fn namespace(mut self, namespace: NameSpace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Set the default tag name for instances.
    pub fn tag(mut self, tag: impl Into<CompactString>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Declare an attribute. A required attribute registers a validator
    /// checking that it is set.
    pub fn attribute(mut self, name: impl Into<CompactString>, decl: AttributeDecl) -> Self {
        let name = name.into();
        if decl.required {
            let key = name.clone();
            self.validators.push(Validator::new(
                format_compact!("attribute `{name}` is required"),
                move |e| e.attribute(&key).is_some(),
            ));
        }
        self.attributes.insert(name, decl);
        self
    }

    /// Declare a child element. A required element registers a validator
    /// checking that it is present (and, if multiple, non-empty).
    pub fn element(mut self, name: impl Into<CompactString>, decl: ElementDecl) -> Self {
        let name = name.into();
        if decl.required {
            let key = name.clone();
            self.validators.push(Validator::new(
                format_compact!("element `{name}` is required"),
                move |e| e.has(&key),
            ));
        }
        self.elements.insert(name, decl);
        self
    }

    /// Register a validator.
    pub fn validate<F>(mut self, label: impl Into<CompactString>, check: F) -> Self
    where
        F: Fn(&Element) -> bool + Send + Sync + 'static,
    {
        self.validators.push(Validator::new(label, check));
        self
    }

    /// Register an existing validator handle.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Name the attribute that selects how a data value is rendered
    /// (`xhtml`, `*/xml`, `*+xml`, or escaped text).
    pub fn content_type(mut self, attribute: impl Into<CompactString>) -> Self {
        self.content_type = Some(attribute.into());
        self
    }

    /// Mark the type as a document root: rendering prepends the XML
    /// declaration.
    pub fn document(mut self) -> Self {
        self.document = true;
        self
    }

    /// Compose the merged schema and freeze the type.
    pub fn build(self) -> Arc<ElementType> {
        let (mut attributes, mut elements, mut validators, inherited_content_type) =
            match &self.parent {
                Some(parent) => (
                    parent.attributes.clone(),
                    parent.elements.clone(),
                    parent.validators.clone(),
                    parent.content_type.clone(),
                ),
                None => (IndexMap::new(), IndexMap::new(), Vec::new(), None),
            };

        attributes.extend(self.attributes);
        elements.extend(self.elements);
        for validator in self.validators {
            if !validators.iter().any(|v| v.same_as(&validator)) {
                validators.push(validator);
            }
        }

        let plurals = elements
            .iter()
            .filter(|(_, decl)| decl.multiple)
            .map(|(name, decl)| {
                let plural = decl.plural.clone().unwrap_or_else(|| pluralize(name));
                (plural, name.clone())
            })
            .collect();

        Arc::new(ElementType {
            name: self.name,
            base: self.base,
            parent: self.parent,
            namespace: self.namespace,
            tag: self.tag,
            attributes,
            elements,
            plurals,
            validators,
            content_type: self.content_type.or(inherited_content_type),
            document: self.document,
        })
    }
}
