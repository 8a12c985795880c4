//! RSS 2.0.
//!
//! RSS has no namespace of its own; a channel rendered as a document is the
//! `<channel>` element preceded by the XML declaration.

use std::sync::{Arc, LazyLock};

use blockup::{Args, AttributeDecl, Base, BuildError, Element, ElementDecl, ElementType, Value, ValueKind};

/// Build an RSS channel document.
pub fn channel<'a>(args: impl Into<Args<'a>>) -> Result<Element, BuildError> {
    Element::build(&DOCUMENT, args)
}

/// Build an RSS channel document. Same as [`channel`].
pub fn document<'a>(args: impl Into<Args<'a>>) -> Result<Element, BuildError> {
    channel(args)
}

/// Non-negative integers: sizes, ports, minutes, pixels.
fn count() -> ValueKind {
    ValueKind::custom("count", |value| match value {
        Value::Integer(n) if *n >= 0 => Ok(n.to_string()),
        Value::Text(s) if s.trim().parse::<u64>().is_ok() => Ok(s.trim().to_string()),
        other => Err(format!("`{other}` is not a non-negative integer")),
    })
}

/// The channel an item was taken from; `url` links to its feed.
pub static SOURCE: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Source", Base::Data)
        .attribute("url", AttributeDecl::new().required())
        .build()
});

/// A media object attached to an item.
pub static ENCLOSURE: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Enclosure", Base::Tag)
        .attribute("url", AttributeDecl::new().required())
        .attribute("length", AttributeDecl::of(count()).required())
        .attribute("type", AttributeDecl::new().required())
        .build()
});

pub static CATEGORY: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Category", Base::Data)
        .attribute("domain", AttributeDecl::new())
        .build()
});

pub static GUID: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Guid", Base::Data)
        .attribute("isPermaLink", AttributeDecl::new())
        .build()
});

/// At least one of `title` or `description` must be present.
pub static ITEM: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Item", Base::Map)
        .element("title", ElementDecl::data())
        .element("link", ElementDecl::data())
        .element("description", ElementDecl::data())
        .element("author", ElementDecl::data())
        .element("comments", ElementDecl::data())
        .element("enclosure", ElementDecl::element(&ENCLOSURE))
        .element("guid", ElementDecl::element(&GUID))
        .element("pubDate", ElementDecl::data())
        .element("source", ElementDecl::element(&SOURCE))
        .element("category", ElementDecl::element(&CATEGORY).plural("categories"))
        .validate("item needs a title or a description", |item| {
            item.has("title") || item.has("description")
        })
        .build()
});

pub static TEXT_INPUT: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("TextInput", Base::Map)
        .tag("textInput")
        .element("title", ElementDecl::data().required())
        .element("description", ElementDecl::data().required())
        .element("name", ElementDecl::data().required())
        .element("link", ElementDecl::data().required())
        .build()
});

/// An rssCloud subscription endpoint.
pub static CLOUD: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Cloud", Base::Tag)
        .attribute("domain", AttributeDecl::new())
        .attribute("port", AttributeDecl::of(count()))
        .attribute("path", AttributeDecl::new())
        .attribute("registerProcedure", AttributeDecl::new())
        .attribute("protocol", AttributeDecl::new())
        .build()
});

pub static IMAGE: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Image", Base::Map)
        .element("url", ElementDecl::data().required())
        .element("title", ElementDecl::data().required())
        .element("link", ElementDecl::data().required())
        .element("width", ElementDecl::value(count()))
        .element("height", ElementDecl::value(count()))
        .element("description", ElementDecl::data())
        .build()
});

pub static CHANNEL: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Channel", Base::Map)
        .element("title", ElementDecl::data().required())
        .element("description", ElementDecl::data().required())
        .element("link", ElementDecl::data().required())
        .element("language", ElementDecl::data())
        .element("copyright", ElementDecl::data())
        .element("managingEditor", ElementDecl::data())
        .element("webMaster", ElementDecl::data())
        .element("pubDate", ElementDecl::data())
        .element("lastBuildDate", ElementDecl::data())
        .element("generator", ElementDecl::data())
        .element("docs", ElementDecl::data())
        .element("cloud", ElementDecl::element(&CLOUD))
        .element("ttl", ElementDecl::value(count()))
        .element("image", ElementDecl::element(&IMAGE))
        .element("rating", ElementDecl::data())
        .element("textInput", ElementDecl::element(&TEXT_INPUT))
        .element("skipHours", ElementDecl::data())
        .element("skipDays", ElementDecl::data())
        .element("category", ElementDecl::element(&CATEGORY).plural("categories"))
        .element("item", ElementDecl::element(&ITEM).multiple())
        .build()
});

/// A channel rendered as a standalone document.
pub static DOCUMENT: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::extend("Document", &CHANNEL)
        .tag("channel")
        .document()
        .build()
});
