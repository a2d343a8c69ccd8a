//! C-shaped intermediate types produced by source inspection and schema
//! loading, and consumed by the aggregator and the code emitter.

use crate::error::Error;

/// The longest accepted field name, matching the C identifier limit of the
/// generated code.
pub const MAX_FIELD_NAME: usize = 63;

/// A named type recovered from C source or a schema document.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    /// An enumeration with ordered member identifiers.
    Enum {
        /// The type name.
        name: String,
        /// The ordered member identifiers.
        members: Vec<String>,
    },
    /// A structure (or discriminated union) with named fields.
    Struct {
        /// The type name.
        name: String,
        /// The field container and its schema-level flags.
        fields: StructFields,
    },
}

impl TypeDefinition {
    /// The name of the definition.
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Enum { name, .. } => name,
            TypeDefinition::Struct { name, .. } => name,
        }
    }
}

/// An ordered list of type definitions, in source order.
pub type TypeDefList = Vec<TypeDefinition>;

/// The fields of a struct schema plus its schema-level flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructFields {
    /// The fields, in declaration order.
    pub fields: Vec<StructField>,

    /// Whether the schema is a discriminated union; fields then describe the
    /// variants, aligned index-for-index with `variants`.
    pub is_union: bool,

    /// Whether a union schema is `anyOf` (true) rather than `oneOf`.
    pub union_is_anyof: bool,

    /// The discriminator property name for union dispatch.
    pub union_discriminator: Option<String>,

    /// Per-variant dispatch metadata, aligned with `fields` for unions.
    pub variants: Vec<UnionVariantMeta>,

    /// Whether the schema's top-level type is `array`; the single field then
    /// describes the items.
    pub root_array: bool,

    /// Schema-level passthrough fragment, merged verbatim into the emitted
    /// schema object.
    pub extras: Option<serde_json::Value>,
}

impl StructFields {
    /// Creates an empty field container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, enforcing name length and uniqueness within the
    /// container.
    pub fn push(&mut self, field: StructField) -> Result<(), Error> {
        if field.name.is_empty() || field.name.len() > MAX_FIELD_NAME {
            return Err(Error::InvalidArgument(format!(
                "field name {:?} must be 1..={} bytes",
                field.name, MAX_FIELD_NAME
            )));
        }
        if self.fields.iter().any(|f| f.name == field.name) {
            return Err(Error::InvalidArgument(format!(
                "duplicate field name {:?}",
                field.name
            )));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single struct field or union variant.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    /// The field name.
    pub name: String,

    /// The logical type of the field.
    pub kind: FieldKind,

    /// The target type name for object/enum fields, or the item type for
    /// arrays. `None` for self-describing primitives.
    pub ref_name: Option<String>,

    /// The default-value literal, verbatim.
    pub default_value: Option<String>,

    /// Validation constraints.
    pub constraints: Constraints,

    /// Bit-field width, when declared.
    pub bit_width: Option<u32>,

    /// Whether the field is a C flexible array member.
    pub flexible_array: bool,
}

impl StructField {
    /// Creates a field with the given name and kind and no constraints.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ref_name: None,
            default_value: None,
            constraints: Constraints::default(),
            bit_width: None,
            flexible_array: false,
        }
    }

    /// Sets the reference name.
    pub fn ref_name(mut self, ref_name: impl Into<String>) -> Self {
        self.ref_name = Some(ref_name.into());
        self
    }

    /// Sets the default-value literal.
    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Marks the field required.
    pub fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }
}

/// The logical type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A UTF-8 string.
    String,
    /// An integer.
    Integer,
    /// A floating-point number.
    Number,
    /// A boolean.
    Boolean,
    /// A nested object, by reference name.
    Object,
    /// An enumeration, by reference name.
    Enum,
    /// An array of `ref_name` items.
    Array,
    /// The JSON null type.
    Null,
}

impl FieldKind {
    /// Parses a logical type name.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "enum" => Some(Self::Enum),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// The canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

/// Validation constraints attached to a field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    /// Lower numeric bound.
    pub minimum: Option<f64>,
    /// Whether `minimum` is exclusive.
    pub exclusive_minimum: bool,
    /// Upper numeric bound.
    pub maximum: Option<f64>,
    /// Whether `maximum` is exclusive.
    pub exclusive_maximum: bool,
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Regular-expression pattern.
    pub pattern: Option<String>,
    /// Format hint (e.g., "int64", "date-time").
    pub format: Option<String>,
    /// Minimum array length.
    pub min_items: Option<u64>,
    /// Maximum array length.
    pub max_items: Option<u64>,
    /// Whether array items must be unique.
    pub unique_items: bool,
    /// Whether the field is required.
    pub required: bool,
}

impl Constraints {
    /// True when no constraint other than `required` is set.
    pub fn is_trivial(&self) -> bool {
        self.minimum.is_none()
            && self.maximum.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.format.is_none()
            && self.min_items.is_none()
            && self.max_items.is_none()
            && !self.unique_items
    }
}

/// Dispatch metadata for one union variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnionVariantMeta {
    /// The JSON value shape the variant expects.
    pub expected: JsonShape,
    /// Property names that must be present for the variant to match.
    pub required_props: Vec<String>,
    /// Property names the variant declares.
    pub declared_props: Vec<String>,
    /// The discriminator value selecting this variant.
    pub discriminator_value: Option<String>,
}

/// The shape of a JSON value, used for union dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonShape {
    /// A JSON object.
    #[default]
    Object,
    /// A JSON array.
    Array,
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON integer.
    Integer,
    /// A JSON boolean.
    Boolean,
    /// JSON null.
    Null,
}
