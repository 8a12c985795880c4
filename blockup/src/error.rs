//! Errors raised while building an element tree.

use facet::Facet;

/// Errors that can occur while constructing or populating an element.
///
/// Schema misses are never errors: undeclared attributes and elements fall
/// back to plain wrappers. These variants cover arguments an element kind
/// cannot hold, failed value conversions, and failures raised by caller code
/// inside a builder callback.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
#[facet(derive(Error))]
#[repr(u8)]
pub enum BuildError {
    /// <{tag}> does not take a positional value
    UnexpectedValue { tag: String },

    /// <{tag}> holds a single value, got {count}
    TooManyValues { tag: String, count: usize },

    /// <{tag}> cannot hold child nodes
    NotAContainer { tag: String },

    /// <{tag}> does not accept free text
    TextNotAllowed { tag: String },

    /// invalid value for {name} ({kind}): {reason}
    InvalidValue {
        name: String,
        kind: String,
        reason: String,
    },

    /// builder failed: {message}
    Callback { message: String },
}

impl BuildError {
    /// Error for caller code that wants to abort a build from inside a
    /// builder callback.
    pub fn callback(message: impl Into<String>) -> Self {
        BuildError::Callback {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_display_uses_doc_comments() {
        let err = BuildError::TooManyValues {
            tag: "title".to_string(),
            count: 2,
        };
        assert_eq!(err.to_string(), "<title> holds a single value, got 2");
    }

    #[test]
    fn test_callback_error() {
        let err = BuildError::callback("no entries");
        assert!(err.to_string().contains("no entries"));
        let _: &dyn std::error::Error = &err;
    }
}
