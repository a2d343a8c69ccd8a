//! Parameter entity for operation inputs.

use super::{map::Map, media::MediaType, schema::RefOr, schema::Schema};

/// Header names that are expressed through dedicated mechanisms and are
/// dropped from parameter lists at emission time.
pub const RESERVED_HEADERS: &[&str] = &["Accept", "Content-Type", "Authorization"];

/// Describes a single operation parameter.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    /// The name of the parameter.
    pub name: String,

    /// The location of the parameter.
    #[serde(rename = "in")]
    pub in_: ParameterIn,

    /// A description of the parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the parameter is required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Whether the parameter is deprecated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// Whether an empty value is allowed (query only).
    #[serde(rename = "allowEmptyValue", skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    /// The serialization style. Only emitted when `content` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,

    /// Whether array/object values generate separate parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    /// Whether reserved characters are allowed without percent-encoding.
    #[serde(rename = "allowReserved", skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    /// The schema for the parameter value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOr<Schema>>,

    /// Example value for the parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    /// Media-type representations of the parameter. Mutually exclusive with
    /// `style`/`explode`/`allowReserved`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, MediaType>>,
}

impl Parameter {
    /// Creates a new parameter with the given name and location.
    pub fn new(name: impl Into<String>, in_: ParameterIn) -> Self {
        Self {
            name: name.into(),
            in_,
            description: None,
            required: None,
            deprecated: None,
            allow_empty_value: None,
            style: None,
            explode: None,
            allow_reserved: None,
            schema: None,
            example: None,
            content: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether the parameter is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Sets the deprecation flag.
    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Sets the serialization style.
    pub fn style(mut self, style: ParameterStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the explode flag.
    pub fn explode(mut self, explode: bool) -> Self {
        self.explode = Some(explode);
        self
    }

    /// Sets the allow-reserved flag.
    pub fn allow_reserved(mut self, allow_reserved: bool) -> Self {
        self.allow_reserved = Some(allow_reserved);
        self
    }

    /// Sets the schema.
    pub fn schema(mut self, schema: RefOr<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the example value.
    pub fn example(mut self, example: serde_json::Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Sets the media-type content map, clearing the style family which is
    /// mutually exclusive with `content`.
    pub fn content(mut self, content: Map<String, MediaType>) -> Self {
        self.content = Some(content);
        self.style = None;
        self.explode = None;
        self.allow_reserved = None;
        self
    }

    /// True for a header parameter whose name is one of the reserved headers.
    pub fn is_reserved_header(&self) -> bool {
        self.in_ == ParameterIn::Header
            && RESERVED_HEADERS
                .iter()
                .any(|h| h.eq_ignore_ascii_case(&self.name))
    }
}

/// The location of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// A path template segment.
    Path,
    /// A query parameter.
    Query,
    /// A header.
    Header,
    /// A cookie.
    Cookie,
    /// The whole query string.
    Querystring,
}

impl ParameterIn {
    /// Parses a location from its directive spelling.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            "querystring" => Some(Self::Querystring),
            _ => None,
        }
    }
}

/// The serialization style of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    /// Form style (default for query and cookie).
    Form,
    /// Simple style (default for path and header).
    Simple,
    /// Matrix style.
    Matrix,
    /// Label style.
    Label,
    /// Space-delimited arrays.
    SpaceDelimited,
    /// Pipe-delimited arrays.
    PipeDelimited,
    /// Deep-object style.
    DeepObject,
    /// Cookie style.
    Cookie,
}

impl ParameterStyle {
    /// Parses a style from its directive spelling.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "form" => Some(Self::Form),
            "simple" => Some(Self::Simple),
            "matrix" => Some(Self::Matrix),
            "label" => Some(Self::Label),
            "spaceDelimited" => Some(Self::SpaceDelimited),
            "pipeDelimited" => Some(Self::PipeDelimited),
            "deepObject" => Some(Self::DeepObject),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}
