//! Schema-document loading.
//!
//! Accepts a document carrying either `components.schemas` or `$defs` at the
//! root; each property of that object becomes a named type definition.
//! Sub-schemas reference by JSON Pointer (`#/components/schemas/X`) or are
//! inline; inline object properties synthesize nested definitions named
//! `<Parent><Field>`.

use coapi_core::{
    Constraints, FieldKind, JsonShape, StructField, StructFields, TypeDefList, TypeDefinition,
    UnionVariantMeta, type_from_ref,
};
use heck::ToUpperCamelCase;
use serde_json::Value;
use tracing::debug;

use crate::error::EmitError;

/// Schema keywords consumed by the loader; everything else passes through.
const KNOWN_KEYS: &[&str] = &[
    "type",
    "properties",
    "required",
    "enum",
    "oneOf",
    "anyOf",
    "discriminator",
    "items",
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "default",
    "$ref",
];

/// Loads every named schema from a parsed document.
pub fn load_schemas(doc: &Value) -> Result<TypeDefList, EmitError> {
    let collection = doc
        .pointer("/components/schemas")
        .or_else(|| doc.get("$defs"))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            EmitError::UnsupportedDocument(
                "expected components.schemas or $defs at the root".into(),
            )
        })?;

    let mut defs = TypeDefList::new();
    for (name, schema) in collection {
        load_named_schema(name, schema, collection, &mut defs)?;
    }
    Ok(defs)
}

fn load_named_schema(
    name: &str,
    schema: &Value,
    collection: &serde_json::Map<String, Value>,
    defs: &mut TypeDefList,
) -> Result<(), EmitError> {
    if let Some(members) = schema.get("enum").and_then(Value::as_array) {
        let members = members
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
        defs.push(TypeDefinition::Enum {
            name: name.to_string(),
            members,
        });
        return Ok(());
    }

    if schema.get("oneOf").is_some() || schema.get("anyOf").is_some() {
        let fields = load_union(name, schema, collection)?;
        defs.push(TypeDefinition::Struct {
            name: name.to_string(),
            fields,
        });
        return Ok(());
    }

    if schema.get("type").and_then(Value::as_str) == Some("array") {
        let mut fields = StructFields::new();
        fields.root_array = true;
        let item = item_field("items", schema.get("items"), name, collection, defs)?;
        fields.push(item)?;
        fields.extras = passthrough(schema);
        defs.push(TypeDefinition::Struct {
            name: name.to_string(),
            fields,
        });
        return Ok(());
    }

    let fields = load_object(name, schema, collection, defs)?;
    defs.push(TypeDefinition::Struct {
        name: name.to_string(),
        fields,
    });
    Ok(())
}

fn load_object(
    name: &str,
    schema: &Value,
    collection: &serde_json::Map<String, Value>,
    defs: &mut TypeDefList,
) -> Result<StructFields, EmitError> {
    let mut fields = StructFields::new();
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (prop_name, prop_schema) in properties {
            let mut field = property_field(prop_name, prop_schema, name, collection, defs)?;
            if required.contains(&prop_name.as_str()) {
                field.constraints.required = true;
            }
            fields.push(field)?;
        }
    }
    fields.extras = passthrough(schema);
    Ok(fields)
}

fn property_field(
    prop_name: &str,
    schema: &Value,
    parent: &str,
    collection: &serde_json::Map<String, Value>,
    defs: &mut TypeDefList,
) -> Result<StructField, EmitError> {
    if let Some(ref_path) = schema.get("$ref").and_then(Value::as_str) {
        let target = type_from_ref(ref_path);
        let kind = if is_enum_schema(collection.get(target)) {
            FieldKind::Enum
        } else {
            FieldKind::Object
        };
        return Ok(StructField::new(prop_name, kind).ref_name(target));
    }

    match schema.get("type").and_then(Value::as_str) {
        Some("array") => {
            let mut field = item_field(prop_name, schema.get("items"), parent, collection, defs)?;
            field.constraints.min_items =
                schema.get("minItems").and_then(Value::as_u64);
            field.constraints.max_items =
                schema.get("maxItems").and_then(Value::as_u64);
            field.constraints.unique_items = schema
                .get("uniqueItems")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Ok(field)
        }
        Some("object") | None if schema.get("properties").is_some() => {
            // An inline object synthesizes a nested named definition.
            let nested = format!("{parent}{}", prop_name.to_upper_camel_case());
            let nested_fields = load_object(&nested, schema, collection, defs)?;
            defs.push(TypeDefinition::Struct {
                name: nested.clone(),
                fields: nested_fields,
            });
            Ok(StructField::new(prop_name, FieldKind::Object).ref_name(nested))
        }
        other => {
            let kind = match other {
                Some("string") => FieldKind::String,
                Some("integer") => FieldKind::Integer,
                Some("number") => FieldKind::Number,
                Some("boolean") => FieldKind::Boolean,
                Some("null") => FieldKind::Null,
                Some("object") | None => FieldKind::Object,
                Some(unknown) => {
                    debug!(property = prop_name, kind = unknown, "unknown type; using string");
                    FieldKind::String
                }
            };
            if kind == FieldKind::Object {
                // A bare object with no properties carries no shape.
                return Ok(StructField::new(prop_name, kind).ref_name("object"));
            }
            let mut field = StructField::new(prop_name, kind);
            field.constraints = scalar_constraints(schema);
            if let Some(default) = schema.get("default") {
                field.default_value = Some(default_literal(default));
            }
            Ok(field)
        }
    }
}

/// Builds the array field for `items`, synthesizing a nested definition for
/// inline object items.
fn item_field(
    prop_name: &str,
    items: Option<&Value>,
    parent: &str,
    collection: &serde_json::Map<String, Value>,
    defs: &mut TypeDefList,
) -> Result<StructField, EmitError> {
    let target = match items {
        Some(item_schema) => {
            if let Some(ref_path) = item_schema.get("$ref").and_then(Value::as_str) {
                type_from_ref(ref_path).to_string()
            } else if item_schema.get("properties").is_some() {
                let nested = format!("{parent}{}Item", prop_name.to_upper_camel_case());
                let nested_fields = load_object(&nested, item_schema, collection, defs)?;
                defs.push(TypeDefinition::Struct {
                    name: nested.clone(),
                    fields: nested_fields,
                });
                nested
            } else {
                match item_schema.get("type").and_then(Value::as_str) {
                    Some("integer") => "integer".to_string(),
                    Some("number") => "number".to_string(),
                    Some("boolean") => "boolean".to_string(),
                    _ => "string".to_string(),
                }
            }
        }
        None => "string".to_string(),
    };
    Ok(StructField::new(prop_name, FieldKind::Array).ref_name(target))
}

fn load_union(
    name: &str,
    schema: &Value,
    collection: &serde_json::Map<String, Value>,
) -> Result<StructFields, EmitError> {
    let (variants, is_anyof) = match schema.get("oneOf").and_then(Value::as_array) {
        Some(list) => (list, false),
        None => (
            schema
                .get("anyOf")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    EmitError::UnsupportedDocument(format!("union {name:?} has no variants"))
                })?,
            true,
        ),
    };

    let discriminator = schema
        .pointer("/discriminator/propertyName")
        .and_then(Value::as_str)
        .map(str::to_string);
    let mapping = schema
        .pointer("/discriminator/mapping")
        .and_then(Value::as_object);

    let mut fields = StructFields::new();
    fields.is_union = true;
    fields.union_is_anyof = is_anyof;
    fields.union_discriminator = discriminator;

    for (idx, variant) in variants.iter().enumerate() {
        let (field, meta) = union_variant(idx, variant, mapping, collection)?;
        fields.variants.push(meta);
        fields.push(field)?;
    }
    fields.extras = passthrough(schema);
    Ok(fields)
}

fn union_variant(
    idx: usize,
    variant: &Value,
    mapping: Option<&serde_json::Map<String, Value>>,
    collection: &serde_json::Map<String, Value>,
) -> Result<(StructField, UnionVariantMeta), EmitError> {
    if let Some(ref_path) = variant.get("$ref").and_then(Value::as_str) {
        let target = type_from_ref(ref_path).to_string();
        let variant_name = target.to_lowercase();
        let mut meta = UnionVariantMeta {
            expected: JsonShape::Object,
            ..Default::default()
        };
        if let Some(target_schema) = collection.get(&target) {
            meta.required_props = string_list(target_schema.get("required"));
            meta.declared_props = target_schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.keys().cloned().collect())
                .unwrap_or_default();
        }
        meta.discriminator_value = mapping.and_then(|map| {
            map.iter()
                .find(|(_, v)| {
                    v.as_str()
                        .is_some_and(|path| type_from_ref(path) == target)
                })
                .map(|(key, _)| key.clone())
        });
        let field = StructField::new(variant_name, FieldKind::Object).ref_name(target);
        return Ok((field, meta));
    }

    let (kind, shape) = match variant.get("type").and_then(Value::as_str) {
        Some("string") => (FieldKind::String, JsonShape::String),
        Some("integer") => (FieldKind::Integer, JsonShape::Integer),
        Some("number") => (FieldKind::Number, JsonShape::Number),
        Some("boolean") => (FieldKind::Boolean, JsonShape::Boolean),
        Some("null") => (FieldKind::Null, JsonShape::Null),
        Some("array") => (FieldKind::Array, JsonShape::Array),
        other => {
            return Err(EmitError::UnsupportedDocument(format!(
                "union variant {idx} has unsupported shape {other:?}"
            )));
        }
    };
    let mut field = StructField::new(format!("v{idx}_{}", kind.as_str()), kind);
    if kind == FieldKind::Array {
        field.ref_name = Some("string".to_string());
    }
    let meta = UnionVariantMeta {
        expected: shape,
        ..Default::default()
    };
    Ok((field, meta))
}

fn is_enum_schema(schema: Option<&Value>) -> bool {
    schema.is_some_and(|s| s.get("enum").is_some())
}

fn scalar_constraints(schema: &Value) -> Constraints {
    let mut constraints = Constraints::default();
    constraints.minimum = schema.get("minimum").and_then(Value::as_f64);
    constraints.maximum = schema.get("maximum").and_then(Value::as_f64);
    match schema.get("exclusiveMinimum") {
        Some(Value::Bool(flag)) => constraints.exclusive_minimum = *flag,
        Some(Value::Number(bound)) => {
            constraints.minimum = bound.as_f64();
            constraints.exclusive_minimum = true;
        }
        _ => {}
    }
    match schema.get("exclusiveMaximum") {
        Some(Value::Bool(flag)) => constraints.exclusive_maximum = *flag,
        Some(Value::Number(bound)) => {
            constraints.maximum = bound.as_f64();
            constraints.exclusive_maximum = true;
        }
        _ => {}
    }
    constraints.min_length = schema.get("minLength").and_then(Value::as_u64);
    constraints.max_length = schema.get("maxLength").and_then(Value::as_u64);
    constraints.pattern = schema
        .get("pattern")
        .and_then(Value::as_str)
        .map(str::to_string);
    constraints.format = schema
        .get("format")
        .and_then(Value::as_str)
        .map(str::to_string);
    constraints
}

fn default_literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Collects unrecognized schema members into a passthrough fragment.
fn passthrough(schema: &Value) -> Option<serde_json::Value> {
    let map = schema.as_object()?;
    let extras: serde_json::Map<String, Value> = map
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if extras.is_empty() {
        None
    } else {
        Some(Value::Object(extras))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_schemas_accepts_components_and_defs_roots() {
        //* Given
        let components = serde_json::json!({
            "components": {"schemas": {"Pet": {"type": "object"}}}
        });
        let defs = serde_json::json!({"$defs": {"Pet": {"type": "object"}}});
        let neither = serde_json::json!({"title": "nothing here"});

        //* When / Then
        assert_eq!(load_schemas(&components).expect("components load").len(), 1);
        assert_eq!(load_schemas(&defs).expect("$defs load").len(), 1);
        assert!(
            matches!(load_schemas(&neither), Err(EmitError::UnsupportedDocument(_))),
            "a document without schemas is rejected"
        );
    }

    #[test]
    fn load_schemas_reads_fields_constraints_and_required() {
        //* Given
        let doc = serde_json::json!({
            "$defs": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string", "minLength": 1, "pattern": "^p"},
                        "age": {"type": "integer", "minimum": 0, "exclusiveMaximum": 30},
                        "tags": {"type": "array", "items": {"type": "string"}, "maxItems": 8},
                        "owner": {"$ref": "#/components/schemas/Owner"}
                    }
                },
                "Owner": {"type": "object", "properties": {"id": {"type": "integer"}}}
            }
        });

        //* When
        let defs = load_schemas(&doc).expect("document loads");

        //* Then
        let pet = defs
            .iter()
            .find(|d| d.name() == "Pet")
            .expect("Pet loaded");
        let TypeDefinition::Struct { fields, .. } = pet else {
            panic!("expected struct");
        };
        let name = fields.get("name").expect("name field");
        assert!(name.constraints.required);
        assert_eq!(name.constraints.min_length, Some(1));
        assert_eq!(name.constraints.pattern.as_deref(), Some("^p"));
        let age = fields.get("age").expect("age field");
        assert_eq!(age.constraints.minimum, Some(0.0));
        assert_eq!(age.constraints.maximum, Some(30.0));
        assert!(age.constraints.exclusive_maximum, "numeric form sets the flag");
        let tags = fields.get("tags").expect("tags field");
        assert_eq!(tags.kind, FieldKind::Array);
        assert_eq!(tags.ref_name.as_deref(), Some("string"));
        assert_eq!(tags.constraints.max_items, Some(8));
        let owner = fields.get("owner").expect("owner field");
        assert_eq!(owner.kind, FieldKind::Object);
        assert_eq!(owner.ref_name.as_deref(), Some("Owner"));
    }

    #[test]
    fn load_schemas_detects_enum_references() {
        //* Given
        let doc = serde_json::json!({
            "$defs": {
                "Tank": {"type": "string", "enum": ["BIG", "SMALL"]},
                "HazE": {
                    "type": "object",
                    "properties": {"tank": {"$ref": "#/$defs/Tank"}}
                }
            }
        });

        //* When
        let defs = load_schemas(&doc).expect("document loads");

        //* Then
        let TypeDefinition::Enum { members, .. } = defs
            .iter()
            .find(|d| d.name() == "Tank")
            .expect("Tank loaded")
        else {
            panic!("expected enum");
        };
        assert_eq!(members, &["BIG", "SMALL"]);
        let TypeDefinition::Struct { fields, .. } = defs
            .iter()
            .find(|d| d.name() == "HazE")
            .expect("HazE loaded")
        else {
            panic!("expected struct");
        };
        assert_eq!(
            fields.get("tank").map(|f| f.kind),
            Some(FieldKind::Enum),
            "a $ref to an enum schema becomes an enum field"
        );
    }

    #[test]
    fn load_schemas_builds_union_with_dispatch_metadata() {
        //* Given
        let doc = serde_json::json!({
            "$defs": {
                "Dog": {
                    "type": "object",
                    "required": ["kind", "bark"],
                    "properties": {"kind": {"type": "string"}, "bark": {"type": "string"}}
                },
                "Cat": {
                    "type": "object",
                    "required": ["kind", "meow"],
                    "properties": {"kind": {"type": "string"}, "meow": {"type": "string"}}
                },
                "Pet": {
                    "oneOf": [
                        {"$ref": "#/$defs/Dog"},
                        {"$ref": "#/$defs/Cat"}
                    ],
                    "discriminator": {
                        "propertyName": "kind",
                        "mapping": {"dog": "#/$defs/Dog", "cat": "#/$defs/Cat"}
                    }
                }
            }
        });

        //* When
        let defs = load_schemas(&doc).expect("document loads");

        //* Then
        let TypeDefinition::Struct { fields, .. } = defs
            .iter()
            .find(|d| d.name() == "Pet")
            .expect("Pet loaded")
        else {
            panic!("expected struct");
        };
        assert!(fields.is_union);
        assert!(!fields.union_is_anyof, "oneOf keeps exclusive semantics");
        assert_eq!(fields.union_discriminator.as_deref(), Some("kind"));
        assert_eq!(fields.fields.len(), 2);
        assert_eq!(fields.variants.len(), 2);
        let dog_meta = &fields.variants[0];
        assert_eq!(dog_meta.required_props, vec!["kind", "bark"]);
        assert_eq!(dog_meta.discriminator_value.as_deref(), Some("dog"));
    }

    #[test]
    fn load_schemas_synthesizes_inline_object_types() {
        //* Given
        let doc = serde_json::json!({
            "$defs": {
                "Pet": {
                    "type": "object",
                    "properties": {
                        "home": {
                            "type": "object",
                            "properties": {"city": {"type": "string"}}
                        }
                    }
                }
            }
        });

        //* When
        let defs = load_schemas(&doc).expect("document loads");

        //* Then
        assert!(
            defs.iter().any(|d| d.name() == "PetHome"),
            "inline objects synthesize <Parent><Field> definitions"
        );
        let TypeDefinition::Struct { fields, .. } = defs
            .iter()
            .find(|d| d.name() == "Pet")
            .expect("Pet loaded")
        else {
            panic!("expected struct");
        };
        assert_eq!(
            fields.get("home").and_then(|f| f.ref_name.as_deref()),
            Some("PetHome")
        );
    }

    #[test]
    fn load_schemas_root_array_sets_the_flag() {
        //* Given
        let doc = serde_json::json!({
            "$defs": {
                "Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
                "PetList": {"type": "array", "items": {"$ref": "#/$defs/Pet"}}
            }
        });

        //* When
        let defs = load_schemas(&doc).expect("document loads");

        //* Then
        let TypeDefinition::Struct { fields, .. } = defs
            .iter()
            .find(|d| d.name() == "PetList")
            .expect("PetList loaded")
        else {
            panic!("expected struct");
        };
        assert!(fields.root_array);
        assert_eq!(
            fields.fields[0].ref_name.as_deref(),
            Some("Pet"),
            "items reference the element type"
        );
    }

    #[test]
    fn load_schemas_keeps_passthrough_extras() {
        //* Given
        let doc = serde_json::json!({
            "$defs": {
                "Pet": {
                    "type": "object",
                    "x-table": "pets",
                    "properties": {"name": {"type": "string"}}
                }
            }
        });

        //* When
        let defs = load_schemas(&doc).expect("document loads");

        //* Then
        let TypeDefinition::Struct { fields, .. } = &defs[0] else {
            panic!("expected struct");
        };
        assert_eq!(
            fields.extras,
            Some(serde_json::json!({"x-table": "pets"})),
            "unrecognized members pass through"
        );
    }
}
