//! Media type, encoding and example entities.

use super::{
    header::Header,
    map::Map,
    schema::{RefOr, Schema},
};

/// A media type and its schema.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct MediaType {
    /// The schema for this media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,

    /// The schema applied to each item of a streaming media type.
    #[serde(rename = "itemSchema", skip_serializing_if = "Option::is_none")]
    pub item_schema: Option<RefOr<Schema>>,

    /// Example value for this media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    /// Named examples for this media type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Map<String, RefOr<Example>>>,

    /// Per-property encoding information (multipart and form bodies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Map<String, Encoding>>,

    /// Positional encoding information for tuple-shaped bodies.
    #[serde(rename = "prefixEncoding", skip_serializing_if = "Option::is_none")]
    pub prefix_encoding: Option<Vec<Encoding>>,

    /// Encoding applied to every item of an array body.
    #[serde(rename = "itemEncoding", skip_serializing_if = "Option::is_none")]
    pub item_encoding: Option<Box<Encoding>>,
}

impl MediaType {
    /// Creates a new empty media type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema for the media type.
    pub fn schema(mut self, schema: RefOr<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the per-item schema.
    pub fn item_schema(mut self, item_schema: RefOr<Schema>) -> Self {
        self.item_schema = Some(item_schema);
        self
    }

    /// Sets the example value.
    pub fn example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Sets the per-property encodings.
    pub fn encoding(mut self, encoding: Map<String, Encoding>) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

/// Encoding information for a single body property.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Encoding {
    /// The content type for the property.
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Additional headers for the property part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, RefOr<Header>>>,

    /// The serialization style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Whether array/object values generate separate parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    /// Whether reserved characters are allowed without percent-encoding.
    #[serde(rename = "allowReserved", skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,
}

impl Encoding {
    /// Creates a new empty encoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A named example value.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Example {
    /// A short summary of the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A description of the example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The literal example value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// A URL pointing to the example value.
    #[serde(rename = "externalValue", skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,
}

impl Example {
    /// Creates a new empty example.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the literal value.
    pub fn value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}
