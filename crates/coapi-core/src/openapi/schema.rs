//! Schema Object types and references.

use super::{extensions::Extensions, map::Map};

/// A schema definition or a reference to a schema component.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// A reference to a component.
    Ref(Ref),
    /// An inline definition.
    T(T),
}

impl<T> RefOr<T> {
    /// Creates a new reference to a component.
    pub fn new_ref(ref_path: impl Into<String>) -> Self {
        RefOr::Ref(Ref {
            ref_path: ref_path.into(),
        })
    }

    /// Creates a new inline definition.
    pub fn new_inline(value: T) -> Self {
        RefOr::T(value)
    }
}

/// A reference to a component.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ref {
    /// The reference path to the component (e.g., "#/components/schemas/Pet").
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

impl Ref {
    /// Creates a reference to a named schema under `#/components/schemas/`.
    pub fn from_schema_name(name: impl AsRef<str>) -> Self {
        Self {
            ref_path: format!("#/components/schemas/{}", name.as_ref()),
        }
    }
}

/// A schema definition.
///
/// JSON Schema allows a schema to be a plain boolean (`true` accepts everything,
/// `false` accepts nothing), an object schema, or an array schema.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Schema {
    /// A boolean schema.
    Bool(bool),
    /// An object schema.
    Object(Box<Object>),
    /// An array schema.
    Array(Box<Array>),
}

impl Schema {
    /// Creates an inline object schema with the given type.
    pub fn typed(schema_type: SchemaType) -> Self {
        Schema::Object(Box::new(Object::new().schema_type(schema_type)))
    }
}

/// An object schema definition.
///
/// Field declaration order is the serialization order of the generated document.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Object {
    /// The schema type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// The schema format (e.g., "int32", "date-time").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// A title for the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// A description of the schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Subschemas of which exactly one must validate.
    #[serde(rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<RefOr<Schema>>>,

    /// Subschemas of which at least one must validate.
    #[serde(rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<RefOr<Schema>>>,

    /// Discriminator for polymorphic dispatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    /// Properties for object types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, RefOr<Schema>>>,

    /// Required properties for object types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Possible values for an enumeration.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    /// Constant value this schema accepts.
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<serde_json::Value>,

    /// Default value for this schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Example value for this schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    /// Example values for this schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<serde_json::Value>>,

    /// Minimum value for numeric types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Whether `minimum` is exclusive.
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,

    /// Maximum value for numeric types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Whether `maximum` is exclusive.
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,

    /// Minimum length for string types.
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    /// Maximum length for string types.
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    /// Pattern for string types (regular expression).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Media type of string-encoded content.
    #[serde(rename = "contentMediaType", skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,

    /// Whether the schema accepts `null` in addition to its type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    /// Whether the schema is deprecated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// XML representation hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<Xml>,

    /// Extension properties and passthrough fragments.
    #[serde(skip_serializing_if = "Option::is_none", flatten)]
    pub extensions: Option<Extensions>,
}

impl Object {
    /// Creates a new empty object schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema type.
    pub fn schema_type(mut self, schema_type: SchemaType) -> Self {
        self.schema_type = Some(schema_type);
        self
    }

    /// Sets the schema format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the `oneOf` subschemas.
    pub fn one_of(mut self, one_of: Vec<RefOr<Schema>>) -> Self {
        self.one_of = Some(one_of);
        self
    }

    /// Sets the `anyOf` subschemas.
    pub fn any_of(mut self, any_of: Vec<RefOr<Schema>>) -> Self {
        self.any_of = Some(any_of);
        self
    }

    /// Sets the discriminator.
    pub fn discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Sets the properties.
    pub fn properties(mut self, properties: Map<String, RefOr<Schema>>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Sets the required properties.
    pub fn required(mut self, required: Vec<String>) -> Self {
        self.required = Some(required);
        self
    }

    /// Sets the enum values.
    pub fn enum_values(mut self, values: Vec<serde_json::Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the example value.
    pub fn example(mut self, value: serde_json::Value) -> Self {
        self.example = Some(value);
        self
    }

    /// Sets the minimum value.
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the maximum value.
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Sets the minimum length.
    pub fn min_length(mut self, min_length: u64) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Sets the maximum length.
    pub fn max_length(mut self, max_length: u64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the pattern.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the XML hints.
    pub fn xml(mut self, xml: Xml) -> Self {
        self.xml = Some(xml);
        self
    }

    /// Sets the extension properties.
    pub fn extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

/// An array schema definition.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Array {
    /// The schema type (always "array").
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    /// The schema for array items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<RefOr<Schema>>>,

    /// Minimum number of items.
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    /// Maximum number of items.
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    /// Whether items must be unique.
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

impl Array {
    /// Creates a new array schema.
    pub fn new() -> Self {
        Self {
            schema_type: SchemaType::Array,
            items: None,
            min_items: None,
            max_items: None,
            unique_items: None,
        }
    }

    /// Sets the items schema.
    pub fn items(mut self, items: RefOr<Schema>) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    /// Sets the minimum number of items.
    pub fn min_items(mut self, min_items: u64) -> Self {
        self.min_items = Some(min_items);
        self
    }

    /// Sets the maximum number of items.
    pub fn max_items(mut self, max_items: u64) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Sets the unique items flag.
    pub fn unique_items(mut self, unique_items: bool) -> Self {
        self.unique_items = Some(unique_items);
        self
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

/// Schema type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Integer type.
    Integer,
    /// Number type (floating point).
    Number,
    /// Boolean type.
    Boolean,
    /// Array type.
    Array,
    /// Object type.
    Object,
    /// Null type.
    Null,
}

/// Discriminator for polymorphic schema dispatch.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Discriminator {
    /// The property whose value selects the variant.
    #[serde(rename = "propertyName")]
    pub property_name: String,

    /// Optional mapping from property value to schema reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Map<String, String>>,
}

impl Discriminator {
    /// Creates a new discriminator with the given property name.
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            mapping: None,
        }
    }

    /// Sets the variant mapping.
    pub fn mapping(mut self, mapping: Map<String, String>) -> Self {
        self.mapping = Some(mapping);
        self
    }
}

/// XML representation hints for a schema.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Xml {
    /// Replaces the element/attribute name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The XML namespace URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// The namespace prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Whether the property is rendered as an attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,

    /// Whether array items are wrapped in a container element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,
}

impl Xml {
    /// Creates a new empty XML hint object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the element name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
