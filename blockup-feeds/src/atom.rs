//! Atom 1.0 (RFC 4287).
//!
//! ```rust
//! use blockup_feeds::atom;
//!
//! let doc = atom::feed(blockup::Args::new().with(|f| {
//!     f.element("id", "urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6")?;
//!     f.element("title", "Example Feed")?;
//!     f.element("updated", "2003-12-13T18:30:02Z")?;
//!     Ok(())
//! }))
//! .unwrap();
//!
//! assert!(doc.is_valid());
//! assert!(doc.to_xml().starts_with("<?xml"));
//! ```

use std::sync::{Arc, LazyLock};

use blockup::{
    Args, AttributeDecl, Base, BuildError, Element, ElementDecl, ElementType, NameSpace, Value,
    ValueKind,
};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

/// The Atom namespace URI.
pub const NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Build an Atom feed document.
pub fn feed<'a>(args: impl Into<Args<'a>>) -> Result<Element, BuildError> {
    Element::build(&DOCUMENT, args)
}

/// An Atom date construct.
///
/// Accepts RFC 3339, RFC 2822, a bare `YYYY-MM-DD` date (midnight UTC) or
/// an integer Unix timestamp, and always renders RFC 3339.
pub fn time() -> ValueKind {
    ValueKind::custom("time", |value| {
        parse_time(value)
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .ok_or_else(|| format!("`{value}` is not a recognised date"))
    })
}

fn parse_time(value: &Value) -> Option<DateTime<FixedOffset>> {
    if let Value::Integer(secs) = value {
        return DateTime::from_timestamp(*secs, 0).map(|t| t.fixed_offset());
    }
    let text = value.to_string();
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|t| t.and_utc().fixed_offset())
        })
}

/// Text constructs: `title`, `subtitle`.
pub static TITLE: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Title", Base::Data)
        .attribute("type", AttributeDecl::new())
        .build()
});

pub static GENERATOR: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Generator", Base::Data)
        .attribute("uri", AttributeDecl::new())
        .attribute("version", AttributeDecl::new())
        .build()
});

/// `rel` defaults to `self`.
pub static LINK: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Link", Base::Tag)
        .attribute("href", AttributeDecl::new().required())
        .attribute("hreflang", AttributeDecl::new())
        .attribute("rel", AttributeDecl::new().default_value("self"))
        .attribute("type", AttributeDecl::new())
        .attribute("title", AttributeDecl::new())
        .attribute("length", AttributeDecl::new())
        .build()
});

/// Person constructs: `author`, `contributor`.
pub static PERSON: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Person", Base::Map)
        .element("name", ElementDecl::data())
        .element("email", ElementDecl::data())
        .element("uri", ElementDecl::data())
        .build()
});

/// Entry content. The `type` attribute picks how the value is written:
/// `xhtml` inside a `<div>`, XML media types verbatim, anything else as
/// escaped text.
pub static CONTENT: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Content", Base::Data)
        .attribute("type", AttributeDecl::new())
        .attribute("src", AttributeDecl::new())
        .content_type("type")
        .build()
});

/// Categories are open, so extension elements can be nested inside them.
pub static CATEGORY: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Category", Base::Open)
        .attribute("term", AttributeDecl::new().required())
        .attribute("scheme", AttributeDecl::new())
        .attribute("label", AttributeDecl::new())
        .build()
});

pub static ENTRY: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Entry", Base::Map)
        .element("id", ElementDecl::data().required())
        .element("title", ElementDecl::element(&TITLE).required())
        .element("updated", ElementDecl::value(time()).required())
        .element("summary", ElementDecl::element(&TITLE))
        .element("published", ElementDecl::value(time()))
        .element("content", ElementDecl::element(&CONTENT))
        .element("source", ElementDecl::data())
        .element("rights", ElementDecl::element(&TITLE))
        .element("link", ElementDecl::element(&LINK).multiple())
        .element("category", ElementDecl::element(&CATEGORY).plural("categories"))
        .element("author", ElementDecl::element(&PERSON).multiple())
        .element("contributor", ElementDecl::element(&PERSON).multiple())
        .build()
});

pub static FEED: LazyLock<Arc<ElementType>> = LazyLock::new(|| {
    ElementType::builder("Feed", Base::Map)
        .namespace(NameSpace::new(NAMESPACE))
        .element("id", ElementDecl::data().required())
        .element("updated", ElementDecl::value(time()).required())
        .element("title", ElementDecl::element(&TITLE).required())
        .element("subtitle", ElementDecl::element(&TITLE))
        .element("generator", ElementDecl::element(&GENERATOR))
        .element("icon", ElementDecl::data())
        .element("logo", ElementDecl::data())
        .element("rights", ElementDecl::element(&TITLE))
        .element("link", ElementDecl::element(&LINK).multiple())
        .element("category", ElementDecl::element(&CATEGORY).plural("categories"))
        .element("author", ElementDecl::element(&PERSON).multiple())
        .element("contributor", ElementDecl::element(&PERSON).multiple())
        .element("entry", ElementDecl::element(&ENTRY).multiple())
        .build()
});

/// A feed rendered as a standalone document.
pub static DOCUMENT: LazyLock<Arc<ElementType>> =
    LazyLock::new(|| ElementType::extend("Document", &FEED).tag("feed").document().build());

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn convert(input: impl Into<Value>) -> Result<String, BuildError> {
        time().convert("updated", &input.into())
    }

    #[test]
    fn test_time_normalises_to_rfc3339() {
        assert_eq!(convert("2003-12-13T18:30:02Z").unwrap(), "2003-12-13T18:30:02Z");
        assert_eq!(
            convert("Sat, 13 Dec 2003 18:30:02 +0100").unwrap(),
            "2003-12-13T18:30:02+01:00"
        );
        assert_eq!(convert(" 2003-12-13 ").unwrap(), "2003-12-13T00:00:00Z");
        assert_eq!(convert(0).unwrap(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_time_rejects_garbage() {
        let err = convert("last tuesday").unwrap_err();
        assert!(matches!(err, BuildError::InvalidValue { ref name, ref kind, .. } if name == "updated" && kind == "time"));
    }

    #[test]
    fn test_document_inherits_feed() {
        assert_eq!(DOCUMENT.default_tag(), "feed");
        assert!(DOCUMENT.is_a(&FEED));
        assert_eq!(DOCUMENT.resolved_namespace().map(|ns| ns.uri.as_str()), Some(NAMESPACE));
        assert!(!FEED.is_document());
    }

    #[test]
    fn test_link_rel_defaults_to_self() {
        let link = Element::build(&LINK, [("href", "http://example.org/")]).unwrap();
        assert_eq!(link.to_xml(), r#"<link href="http://example.org/" rel="self"/>"#);
    }

    #[test]
    fn test_entry_requirements() {
        let entry = Element::build_with(&ENTRY, |e| {
            e.element("id", "tag:example.org,2003:3.2397")?;
            e.element("title", "Atom draft-07 snapshot")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(entry.violations(), ["element `updated` is required"]);
    }

    #[test]
    fn test_categories_plural() {
        let feed = Element::build_with(&FEED, |f| {
            f.element("category", [("term", "rust")])?;
            f.element("category", [("term", "xml")])?;
            Ok(())
        })
        .unwrap();
        let terms: Vec<_> = feed
            .plural("categories")
            .iter()
            .filter_map(|c| c.attr("term"))
            .collect();
        assert_eq!(terms, ["rust", "xml"]);
    }
}
