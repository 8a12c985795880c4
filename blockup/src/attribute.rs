//! Scalar values, value kinds, and attribute values.

use compact_str::CompactString;
use facet::Facet;
use std::fmt;
use std::sync::Arc;

use crate::error::BuildError;
use crate::node::push_escaped;

/// A scalar argument handed to a builder: an element's value or an
/// attribute's value before its kind converts it to text.
#[derive(Debug, Clone, PartialEq, Facet)]
#[repr(u8)]
pub enum Value {
    /// A string
    Text(String),
    /// An integer
    Integer(i64),
    /// A floating-point number
    Float(f64),
    /// A boolean, rendered as `true`/`false`
    Bool(bool),
}

impl Value {
    /// Returns the string if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Text(n.to_string()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

type Convert = dyn Fn(&Value) -> Result<String, String> + Send + Sync;

/// How a raw [`Value`] becomes the text stored on an attribute or a plain
/// value element.
#[derive(Clone, Default)]
pub enum ValueKind {
    /// The value's display form, unchanged.
    #[default]
    Text,
    /// A named conversion that may reject its input.
    Custom {
        /// Name reported in conversion errors
        name: CompactString,
        /// The conversion; `Err` carries the rejection reason
        convert: Arc<Convert>,
    },
}

impl ValueKind {
    /// A custom value kind.
    pub fn custom<F>(name: impl Into<CompactString>, convert: F) -> Self
    where
        F: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
    {
        ValueKind::Custom {
            name: name.into(),
            convert: Arc::new(convert),
        }
    }

    /// The kind's name.
    pub fn name(&self) -> &str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Custom { name, .. } => name,
        }
    }

    /// Convert `value` for the field called `field`.
    pub fn convert(&self, field: &str, value: &Value) -> Result<String, BuildError> {
        match self {
            ValueKind::Text => Ok(value.to_string()),
            ValueKind::Custom { name, convert } => {
                convert(value).map_err(|reason| BuildError::InvalidValue {
                    name: field.to_string(),
                    kind: name.to_string(),
                    reason,
                })
            }
        }
    }
}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => f.write_str("Text"),
            ValueKind::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
        }
    }
}

/// A name/value pair on a tag.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct AttributeValue {
    /// The attribute name
    pub name: CompactString,
    /// The converted value, unescaped
    pub value: String,
}

impl AttributeValue {
    /// Create an attribute value.
    pub fn new(name: impl Into<CompactString>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Render as `name="value"` with both parts escaped.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        push_escaped(out, &self.name);
        out.push_str("=\"");
        push_escaped(out, &self.value);
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_attribute_render_escapes_value() {
        let attr = AttributeValue::new("title", "Say \"hi\" & <bye>");
        assert_eq!(
            attr.render(),
            "title=\"Say &quot;hi&quot; &amp; &lt;bye&gt;\""
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::from(u64::MAX).to_string(), u64::MAX.to_string());
    }

    #[test]
    fn test_custom_kind_reports_field() {
        let kind = ValueKind::custom("port", |v| match v {
            Value::Integer(n) if (1..=65535).contains(n) => Ok(n.to_string()),
            other => Err(format!("{other} is not a port")),
        });
        assert_eq!(kind.convert("port", &Value::from(80)).unwrap(), "80");

        let err = kind.convert("port", &Value::from("http")).unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidValue {
                name: "port".to_string(),
                kind: "port".to_string(),
                reason: "http is not a port".to_string(),
            }
        );
    }

    #[test]
    fn test_text_kind_never_fails() {
        let kind = ValueKind::default();
        assert_eq!(kind.name(), "text");
        assert_eq!(kind.convert("x", &Value::from(true)).unwrap(), "true");
    }
}
