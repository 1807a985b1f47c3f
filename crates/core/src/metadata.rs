//! Descriptive metadata types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence value meaning "no authority control applied"
pub const CONFIDENCE_UNSET: i32 = -1;

/// A qualified metadata field, e.g. `dc.identifier.uri`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MetadataField {
    /// Schema short name (`dc`)
    pub schema: &'static str,
    /// Element (`identifier`)
    pub element: &'static str,
    /// Optional qualifier (`uri`)
    pub qualifier: Option<&'static str>,
}

impl MetadataField {
    /// `dc.identifier.uri`, where the resolvable handle is mirrored
    pub const IDENTIFIER_URI: MetadataField = MetadataField {
        schema: "dc",
        element: "identifier",
        qualifier: Some("uri"),
    };
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier {
            Some(q) => write!(f, "{}.{}.{}", self.schema, self.element, q),
            None => write!(f, "{}.{}", self.schema, self.element),
        }
    }
}

/// One value of a metadata field with its auxiliary attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataValue {
    /// The value text
    pub value: String,
    /// Language tag
    pub language: Option<String>,
    /// Authority key
    pub authority: Option<String>,
    /// Authority confidence
    pub confidence: i32,
}

impl MetadataValue {
    /// Plain value without language or authority
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            language: None,
            authority: None,
            confidence: CONFIDENCE_UNSET,
        }
    }

    /// Set the language tag
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the authority key and confidence
    pub fn with_authority(mut self, authority: impl Into<String>, confidence: i32) -> Self {
        self.authority = Some(authority.into());
        self.confidence = confidence;
        self
    }
}
