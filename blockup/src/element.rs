//! Element instances and the build protocol.
//!
//! An [`Element`] is created from an [`ElementType`] with [`Args`]: positional
//! values, a trailing attribute map, and an optional builder callback. The
//! callback runs exactly once, before construction returns, and receives the
//! new element as its only parameter. Inside it, [`Element::element`] adds
//! child elements, resolving each name against the type's merged schema.
//!
//! ```rust
//! use blockup::{Args, Base, ElementDecl, ElementType, Element};
//!
//! let item = ElementType::builder("Item", Base::Map)
//!     .element("title", ElementDecl::data())
//!     .build();
//! let list = ElementType::builder("List", Base::Map)
//!     .element("item", ElementDecl::element(&item).multiple())
//!     .build();
//!
//! let doc = Element::build_with(&list, |l| {
//!     l.element_with("item", |i| {
//!         i.element("title", "first")?;
//!         Ok(())
//!     })?;
//!     l.element("item", Args::new().attr("id", 2))?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(doc.all("item").len(), 2);
//! assert_eq!(
//!     doc.to_xml(),
//!     r#"<list><item><title>first</title></item><item id="2"/></list>"#
//! );
//! ```

use compact_str::CompactString;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::attribute::{AttributeValue, Value};
use crate::error::BuildError;
use crate::instruction::{Comment, Instruction};
use crate::node::Node;
use crate::schema::{Base, ChildKind, ElementDecl, ElementType, pluralize};
use crate::{debug, trace};

/// A builder callback: populates a freshly constructed element.
pub type Builder<'a> = Box<dyn FnOnce(&mut Element) -> Result<(), BuildError> + 'a>;

/// Arguments for constructing an element.
///
/// Empty arguments passed to [`Element::element`] make the call a read.
#[derive(Default)]
pub struct Args<'a> {
    pub(crate) values: Vec<Value>,
    pub(crate) attributes: Vec<(CompactString, Value)>,
    pub(crate) builder: Option<Builder<'a>>,
}

impl<'a> Args<'a> {
    /// No values, attributes or builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Append an attribute.
    pub fn attr(mut self, name: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append several attributes, in order.
    pub fn attrs<I, K, V>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<CompactString>,
        V: Into<Value>,
    {
        self.attributes
            .extend(attrs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the builder callback.
    pub fn with<F>(mut self, builder: F) -> Self
    where
        F: FnOnce(&mut Element) -> Result<(), BuildError> + 'a,
    {
        self.builder = Some(Box::new(builder));
        self
    }

    /// True if there is nothing to build with.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.attributes.is_empty() && self.builder.is_none()
    }
}

impl fmt::Debug for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("values", &self.values)
            .field("attributes", &self.attributes)
            .field("builder", &self.builder.is_some())
            .finish()
    }
}

impl From<()> for Args<'_> {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl From<Value> for Args<'_> {
    fn from(value: Value) -> Self {
        Self::new().value(value)
    }
}

macro_rules! args_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Args<'_> {
                fn from(value: $ty) -> Self {
                    Self::new().value(value)
                }
            }
        )*
    };
}

args_from_value!(&str, String, &String, i64, i32, u32, u64, f64, bool);

impl<K, V, const N: usize> From<[(K, V); N]> for Args<'_>
where
    K: Into<CompactString>,
    V: Into<Value>,
{
    fn from(attrs: [(K, V); N]) -> Self {
        Self::new().attrs(attrs)
    }
}

impl<K, V> From<Vec<(K, V)>> for Args<'_>
where
    K: Into<CompactString>,
    V: Into<Value>,
{
    fn from(attrs: Vec<(K, V)>) -> Self {
        Self::new().attrs(attrs)
    }
}

/// Tracker slot for one child name: content indices of the children built
/// under it.
#[derive(Debug, Clone)]
pub(crate) enum Tracked {
    One(usize),
    Many(SmallVec<[usize; 4]>),
}

/// Ordered children plus the name-indexed tracker over them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Content {
    pub(crate) nodes: Vec<Node>,
    pub(crate) tracker: IndexMap<CompactString, Tracked>,
    /// Names an open element learned during its build.
    pub(crate) extensions: IndexMap<CompactString, ElementDecl>,
}

#[derive(Debug, Clone)]
enum Body {
    Empty,
    Value(String),
    Content(Content),
}

/// Result of reading a tracked child name.
#[derive(Debug, Clone)]
pub enum Entry<'a> {
    /// A singular child
    One(&'a Element),
    /// A multiple child, in build order
    Many(Vec<&'a Element>),
}

impl<'a> Entry<'a> {
    /// The first (or only) child.
    pub fn first(&self) -> Option<&'a Element> {
        match self {
            Entry::One(e) => Some(*e),
            Entry::Many(list) => list.first().copied(),
        }
    }

    /// Number of children behind the entry.
    pub fn len(&self) -> usize {
        match self {
            Entry::One(_) => 1,
            Entry::Many(list) => list.len(),
        }
    }

    /// True for an empty list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All children behind the entry.
    pub fn into_vec(self) -> Vec<&'a Element> {
        match self {
            Entry::One(e) => vec![e],
            Entry::Many(list) => list,
        }
    }
}

/// An element instance.
#[derive(Debug, Clone)]
pub struct Element {
    ty: Arc<ElementType>,
    tag: CompactString,
    attributes: IndexMap<CompactString, AttributeValue>,
    body: Body,
}

impl Element {
    /// An empty instance with the type's default tag.
    pub fn new(ty: &Arc<ElementType>) -> Self {
        Self::named(ty, ty.default_tag())
    }

    /// An empty instance with an explicit tag.
    pub fn named(ty: &Arc<ElementType>, tag: impl Into<CompactString>) -> Self {
        let body = match ty.base() {
            Base::Tag => Body::Empty,
            Base::Data => Body::Value(String::new()),
            Base::Map | Base::Full | Base::Open => Body::Content(Content::default()),
        };
        Self {
            ty: Arc::clone(ty),
            tag: tag.into(),
            attributes: IndexMap::new(),
            body,
        }
    }

    /// Build an instance with the type's default tag.
    pub fn build<'a>(ty: &Arc<ElementType>, args: impl Into<Args<'a>>) -> Result<Self, BuildError> {
        Self::build_named(ty, ty.default_tag(), args)
    }

    /// Build an instance with the type's default tag from a builder callback.
    pub fn build_with<F>(ty: &Arc<ElementType>, builder: F) -> Result<Self, BuildError>
    where
        F: FnOnce(&mut Element) -> Result<(), BuildError>,
    {
        Self::build(ty, Args::new().with(builder))
    }

    /// Build an instance with an explicit tag.
    ///
    /// Attributes are applied first, then declared defaults the caller did
    /// not set, then positional values; the builder callback runs last. An
    /// error from any step (including the callback) is returned and the
    /// partially built element is dropped.
    pub fn build_named<'a>(
        ty: &Arc<ElementType>,
        tag: impl Into<CompactString>,
        args: impl Into<Args<'a>>,
    ) -> Result<Self, BuildError> {
        let Args {
            values,
            attributes,
            builder,
        } = args.into();

        let mut element = Self::named(ty, tag);
        for (name, value) in attributes {
            element.set(name, value)?;
        }
        element.apply_defaults();
        element.apply_values(values)?;
        if let Some(builder) = builder {
            builder(&mut element)?;
        }

        trace!(tag = %element.tag, ty = element.ty.name(), "built element");
        Ok(element)
    }

    fn apply_defaults(&mut self) {
        let defaults: Vec<_> = self
            .ty
            .attributes()
            .filter_map(|(name, decl)| Some((name, decl.default.as_ref()?)))
            .filter(|(name, _)| !self.attributes.contains_key(*name))
            .map(|(name, value)| AttributeValue::new(name, value.clone()))
            .collect();
        for attr in defaults {
            self.attributes.insert(attr.name.clone(), attr);
        }
    }

    fn apply_values(&mut self, values: Vec<Value>) -> Result<(), BuildError> {
        match self.ty.base() {
            Base::Tag | Base::Map if !values.is_empty() => Err(BuildError::UnexpectedValue {
                tag: self.tag.to_string(),
            }),
            Base::Tag | Base::Map => Ok(()),
            Base::Data => match values.as_slice() {
                [] => Ok(()),
                [value] => self.set_value(value.clone()),
                _ => Err(BuildError::TooManyValues {
                    tag: self.tag.to_string(),
                    count: values.len(),
                }),
            },
            Base::Full | Base::Open => {
                for value in values {
                    self.text(value)?;
                }
                Ok(())
            }
        }
    }

    /// The element's type.
    pub fn element_type(&self) -> &Arc<ElementType> {
        &self.ty
    }

    /// The tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    // -- Attributes -----------------------------------------------------------

    /// Set an attribute. A declared attribute converts the value with its
    /// kind; an undeclared one stores the value's display form. Reassigning
    /// keeps the attribute's original position.
    pub fn set(
        &mut self,
        name: impl Into<CompactString>,
        value: impl Into<Value>,
    ) -> Result<(), BuildError> {
        let name = name.into();
        let value = value.into();
        let text = match self.ty.attribute(&name) {
            Some(decl) => decl.kind.convert(&name, &value)?,
            None => {
                trace!(%name, tag = %self.tag, "undeclared attribute");
                value.to_string()
            }
        };
        self.attributes
            .insert(name.clone(), AttributeValue::new(name, text));
        Ok(())
    }

    /// Get an attribute.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get an attribute's value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|a| a.value.as_str())
    }

    /// Remove an attribute, returning it.
    pub fn remove_attribute(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.shift_remove(name)
    }

    /// Attributes in assignment order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeValue> {
        self.attributes.values()
    }

    // -- Value ----------------------------------------------------------------

    /// The scalar value of a data element.
    pub fn value(&self) -> Option<&str> {
        match &self.body {
            Body::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Replace the scalar value of a data element.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<(), BuildError> {
        match &mut self.body {
            Body::Value(v) => {
                *v = value.into().to_string();
                Ok(())
            }
            _ => Err(BuildError::UnexpectedValue {
                tag: self.tag.to_string(),
            }),
        }
    }

    // -- Content --------------------------------------------------------------

    /// Every child node, in the order added. Empty for tags and data.
    pub fn content(&self) -> &[Node] {
        match &self.body {
            Body::Content(c) => &c.nodes,
            _ => &[],
        }
    }

    /// Child elements, in the order added.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content().iter().filter_map(Node::as_element)
    }

    pub(crate) fn content_mut(&mut self) -> Result<&mut Content, BuildError> {
        match &mut self.body {
            Body::Content(c) => Ok(c),
            _ => Err(BuildError::NotAContainer {
                tag: self.tag.to_string(),
            }),
        }
    }

    pub(crate) fn content_ref(&self) -> Option<&Content> {
        match &self.body {
            Body::Content(c) => Some(c),
            _ => None,
        }
    }

    /// Build a child element, or read one when `args` is empty.
    ///
    /// The name is resolved against the merged schema. An undeclared name
    /// builds a generic data child that accumulates (`multiple`); on an open
    /// element it is first registered as an open, multiple child. The child
    /// is appended to the content, and the tracker entry for the name is
    /// overwritten (singular) or extended (multiple).
    ///
    /// Returns the tracker entry for `name` after the call.
    ///
    /// The name becomes the child's tag and is emitted verbatim: it is not
    /// checked against XML name rules or escaped.
    pub fn element<'a>(
        &mut self,
        name: &str,
        args: impl Into<Args<'a>>,
    ) -> Result<Option<Entry<'_>>, BuildError> {
        let args = args.into();
        if args.is_empty() {
            return Ok(self.get(name));
        }
        let decl = self.resolve(name, true)?;
        self.build_child(name, &decl, args)?;
        Ok(self.get(name))
    }

    /// The singular-assignment form of [`element`](Self::element).
    ///
    /// Identical for declared names. On an open element an unknown name is
    /// registered as a singular child, so repeated assignment overwrites.
    pub fn assign<'a>(
        &mut self,
        name: &str,
        args: impl Into<Args<'a>>,
    ) -> Result<Option<Entry<'_>>, BuildError> {
        let args = args.into();
        if args.is_empty() {
            return Ok(self.get(name));
        }
        let decl = self.resolve(name, false)?;
        self.build_child(name, &decl, args)?;
        Ok(self.get(name))
    }

    /// Build a child element from a nested builder callback.
    pub fn element_with<F>(&mut self, name: &str, builder: F) -> Result<Option<Entry<'_>>, BuildError>
    where
        F: FnOnce(&mut Element) -> Result<(), BuildError>,
    {
        self.element(name, Args::new().with(builder))
    }

    fn resolve(&mut self, name: &str, multiple: bool) -> Result<ElementDecl, BuildError> {
        if let Some(decl) = self.ty.element(name) {
            return Ok(decl.clone());
        }
        if self.ty.base() == Base::Open {
            return Ok(self.open_extension(name, multiple));
        }
        // Touch the content first so non-containers fail here.
        self.content_mut()?;
        trace!(%name, tag = %self.tag, "schema miss, building generic data");
        Ok(ElementDecl::data().multiple())
    }

    fn build_child(&mut self, name: &str, decl: &ElementDecl, args: Args<'_>) -> Result<(), BuildError> {
        // Fail before running any nested builder.
        self.content_mut()?;
        let child = match &decl.kind {
            ChildKind::Element(ty) => Element::build_named(ty, name, args)?,
            ChildKind::Value(kind) => {
                let Args {
                    values,
                    attributes,
                    builder,
                } = args;
                let value = match values.as_slice() {
                    [] => None,
                    [value] => Some(Value::Text(kind.convert(name, value)?)),
                    _ => {
                        return Err(BuildError::TooManyValues {
                            tag: name.to_string(),
                            count: values.len(),
                        });
                    }
                };
                let args = Args {
                    values: value.into_iter().collect(),
                    attributes,
                    builder,
                };
                Element::build_named(ElementType::data(), name, args)?
            }
        };
        self.push_tracked(name, child, decl.multiple)
    }

    fn push_tracked(&mut self, name: &str, child: Element, multiple: bool) -> Result<(), BuildError> {
        let content = self.content_mut()?;
        let index = content.nodes.len();
        content.nodes.push(Node::Element(child));

        if !multiple {
            content
                .tracker
                .insert(CompactString::from(name), Tracked::One(index));
            return Ok(());
        }
        let slot = content
            .tracker
            .entry(CompactString::from(name))
            .or_insert_with(|| Tracked::Many(SmallVec::new()));
        if let Tracked::One(previous) = *slot {
            *slot = Tracked::Many(SmallVec::from_slice(&[previous]));
        }
        if let Tracked::Many(list) = slot {
            list.push(index);
        }
        Ok(())
    }

    // -- Reads ----------------------------------------------------------------

    /// The tracker entry for `name`, without mutating anything.
    pub fn get(&self, name: &str) -> Option<Entry<'_>> {
        let content = self.content_ref()?;
        let element_at = |i: &usize| content.nodes.get(*i).and_then(Node::as_element);
        match content.tracker.get(name)? {
            Tracked::One(i) => element_at(i).map(Entry::One),
            Tracked::Many(list) => Some(Entry::Many(list.iter().filter_map(element_at).collect())),
        }
    }

    /// True if `name` is tracked and non-empty.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|entry| !entry.is_empty())
    }

    /// The first (or only) child tracked under `name`.
    pub fn first(&self, name: &str) -> Option<&Element> {
        self.get(name)?.first()
    }

    /// Every child tracked under `name`, empty if none.
    pub fn all(&self, name: &str) -> Vec<&Element> {
        self.get(name).map(Entry::into_vec).unwrap_or_default()
    }

    /// Every child behind a plural accessor name (`entries` for `entry`).
    pub fn plural(&self, plural: &str) -> Vec<&Element> {
        if let Some(name) = self.ty.element_for_plural(plural) {
            return self.all(name);
        }
        let Some(content) = self.content_ref() else {
            return Vec::new();
        };
        match content.tracker.keys().find(|name| pluralize(name) == plural) {
            Some(name) => self.all(name),
            None => Vec::new(),
        }
    }

    // -- Other nodes ----------------------------------------------------------

    /// Append a processing instruction.
    pub fn instruct(&mut self, instruction: Instruction) -> Result<(), BuildError> {
        self.content_mut()?
            .nodes
            .push(Node::Instruction(instruction));
        Ok(())
    }

    /// Append an `<?xml ...?>` declaration; `version` defaults to `1.0` and
    /// `encoding` to `UTF-8`.
    ///
    /// `version` is always written first and `encoding` second, whatever
    /// order the caller lists them in; other attributes follow in order.
    pub fn xml_declaration<I, K, V>(&mut self, attrs: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<CompactString>,
        V: Into<Value>,
    {
        let mut pi = Instruction::xml_declaration("1.0", "UTF-8");
        for (name, value) in attrs {
            pi = pi.attr(name, value.into().to_string());
        }
        self.instruct(pi)
    }

    /// Append a comment.
    pub fn comment(&mut self, text: impl Into<String>) -> Result<(), BuildError> {
        self.content_mut()?
            .nodes
            .push(Node::Comment(Comment::new(text)));
        Ok(())
    }

    // -- Validation -----------------------------------------------------------

    /// True if every validator inherited by the element's type passes.
    pub fn is_valid(&self) -> bool {
        self.ty.check(self)
    }

    /// Labels of the validators that fail, in declaration order.
    pub fn violations(&self) -> Vec<&str> {
        let failed: Vec<&str> = self
            .ty
            .validators()
            .iter()
            .filter(|v| !v.check(self))
            .map(|v| v.label())
            .collect();
        if !failed.is_empty() {
            debug!(tag = %self.tag, ?failed, "element is not valid");
        }
        failed
    }
}
