//! OpenAPI document emission.
//!
//! Translates the registered type definitions into Schema Objects, grafts
//! them onto the aggregated document and serializes the result. Emission is
//! deterministic: schemas follow registration order, fields follow insertion
//! order, and two runs over the same model produce byte-identical output.

use coapi_core::{
    Array, Discriminator, FieldKind, Map, Object, RefOr, Schema, SchemaType, Spec, StructField,
    StructFields, TypeDefinition, schema_ref_for,
};

use crate::{ctype::check_references, error::EmitError};

/// Builds the final document: the aggregated model plus the registered
/// schemas under `components.schemas`.
pub fn build_document(spec: &Spec) -> Result<coapi_core::OpenApi, EmitError> {
    check_references(&spec.types)?;

    let mut document = spec.document.clone();
    if !spec.types.is_empty() {
        let mut schemas = Map::new();
        for def in &spec.types {
            schemas.insert(def.name().to_string(), RefOr::T(schema_from_typedef(def)));
        }
        let components = document.components.get_or_insert_with(Default::default);
        components.schemas = Some(schemas);
    }
    Ok(document)
}

/// Serializes the document as pretty-printed JSON.
pub fn emit_json(spec: &Spec) -> Result<String, EmitError> {
    let document = build_document(spec)?;
    let mut text = serde_json::to_string_pretty(&document)?;
    text.push('\n');
    Ok(text)
}

/// Translates one type definition into a Schema Object.
pub fn schema_from_typedef(def: &TypeDefinition) -> Schema {
    match def {
        TypeDefinition::Enum { members, .. } => {
            let values = members
                .iter()
                .filter(|m| m.as_str() != "UNKNOWN")
                .map(|m| serde_json::Value::String(m.clone()))
                .collect();
            Schema::Object(Box::new(
                Object::new()
                    .schema_type(SchemaType::String)
                    .enum_values(values),
            ))
        }
        TypeDefinition::Struct { fields, .. } if fields.root_array => {
            let mut array = Array::new();
            if let Some(item) = fields.fields.first() {
                array.items = Some(Box::new(property_ref(item)));
                array.min_items = item.constraints.min_items;
                array.max_items = item.constraints.max_items;
                if item.constraints.unique_items {
                    array.unique_items = Some(true);
                }
            }
            Schema::Array(Box::new(array))
        }
        TypeDefinition::Struct { fields, .. } if fields.is_union => union_schema(fields),
        TypeDefinition::Struct { fields, .. } => object_schema(fields),
    }
}

fn union_schema(fields: &StructFields) -> Schema {
    let variants: Vec<RefOr<Schema>> = fields.fields.iter().map(property_ref).collect();

    let mut object = Object::new();
    if fields.union_is_anyof {
        object.any_of = Some(variants);
    } else {
        object.one_of = Some(variants);
    }
    if let Some(property) = &fields.union_discriminator {
        let mut discriminator = Discriminator::new(property.clone());
        let mut mapping = Map::new();
        for (field, meta) in fields.fields.iter().zip(&fields.variants) {
            if let (Some(value), Some(target)) = (&meta.discriminator_value, &field.ref_name) {
                mapping.insert(value.clone(), format!("#/components/schemas/{target}"));
            }
        }
        if !mapping.is_empty() {
            discriminator.mapping = Some(mapping);
        }
        object.discriminator = Some(discriminator);
    }
    if let Some(extras) = &fields.extras {
        merge_extras(&mut object, extras);
    }
    Schema::Object(Box::new(object))
}

fn object_schema(fields: &StructFields) -> Schema {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &fields.fields {
        properties.insert(field.name.clone(), property_schema(field));
        if field.constraints.required {
            required.push(field.name.clone());
        }
    }

    let mut object = Object::new().schema_type(SchemaType::Object);
    if !properties.is_empty() {
        object.properties = Some(properties);
    }
    if !required.is_empty() {
        object.required = Some(required);
    }
    if let Some(extras) = &fields.extras {
        merge_extras(&mut object, extras);
    }
    Schema::Object(Box::new(object))
}

/// The schema handle for a field used as a union variant or array item:
/// a reference for named types, an inline type otherwise.
fn property_ref(field: &StructField) -> RefOr<Schema> {
    match field.kind {
        FieldKind::Object | FieldKind::Enum | FieldKind::Array => {
            schema_ref_for(field.ref_name.as_deref().unwrap_or("object"))
        }
        FieldKind::String => RefOr::T(Schema::typed(SchemaType::String)),
        FieldKind::Integer => RefOr::T(Schema::typed(SchemaType::Integer)),
        FieldKind::Number => RefOr::T(Schema::typed(SchemaType::Number)),
        FieldKind::Boolean => RefOr::T(Schema::typed(SchemaType::Boolean)),
        FieldKind::Null => RefOr::T(Schema::typed(SchemaType::Null)),
    }
}

/// The full property schema for a struct field, constraints included.
fn property_schema(field: &StructField) -> RefOr<Schema> {
    match field.kind {
        FieldKind::Object | FieldKind::Enum => {
            schema_ref_for(field.ref_name.as_deref().unwrap_or("object"))
        }
        FieldKind::Array => {
            let mut array = Array::new();
            let item = field.ref_name.as_deref().unwrap_or("object");
            array.items = Some(Box::new(schema_ref_for(item)));
            array.min_items = field.constraints.min_items;
            array.max_items = field.constraints.max_items;
            if field.constraints.unique_items {
                array.unique_items = Some(true);
            }
            RefOr::T(Schema::Array(Box::new(array)))
        }
        _ => {
            let schema_type = match field.kind {
                FieldKind::String => SchemaType::String,
                FieldKind::Integer => SchemaType::Integer,
                FieldKind::Number => SchemaType::Number,
                FieldKind::Boolean => SchemaType::Boolean,
                _ => SchemaType::Null,
            };
            let mut object = Object::new().schema_type(schema_type);
            let constraints = &field.constraints;
            if let Some(format) = &constraints.format {
                object.format = Some(format.clone());
            }
            object.minimum = constraints.minimum;
            if constraints.exclusive_minimum {
                object.exclusive_minimum = Some(true);
            }
            object.maximum = constraints.maximum;
            if constraints.exclusive_maximum {
                object.exclusive_maximum = Some(true);
            }
            object.min_length = constraints.min_length;
            object.max_length = constraints.max_length;
            object.pattern = constraints.pattern.clone();
            if let Some(default) = &field.default_value {
                object.default = Some(default_to_value(field.kind, default));
            }
            RefOr::T(Schema::Object(Box::new(object)))
        }
    }
}

fn default_to_value(kind: FieldKind, literal: &str) -> serde_json::Value {
    match kind {
        FieldKind::Integer | FieldKind::Number => serde_json::from_str(literal)
            .unwrap_or_else(|_| serde_json::Value::String(literal.to_string())),
        FieldKind::Boolean => serde_json::Value::Bool(literal == "true" || literal == "1"),
        _ => serde_json::Value::String(literal.to_string()),
    }
}

/// Grafts a passthrough fragment's members onto the schema object.
fn merge_extras(object: &mut Object, extras: &serde_json::Value) {
    let Some(map) = extras.as_object() else {
        return;
    };
    let extensions = object.extensions.get_or_insert_with(Map::new);
    for (key, value) in map {
        extensions.entry(key.clone()).or_insert_with(|| value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coapi_core::docmeta::{DocMetadata, ParamDoc, ReturnDoc, RouteDoc};

    fn register_haze(spec: &mut Spec) {
        let mut fields = StructFields::new();
        fields
            .push(StructField::new("bzr", FieldKind::String).required())
            .expect("push bzr");
        fields
            .push(StructField::new("tank", FieldKind::Enum).ref_name("Tank"))
            .expect("push tank");
        spec.register_types(vec![
            TypeDefinition::Enum {
                name: "Tank".to_string(),
                members: vec!["BIG".to_string(), "SMALL".to_string(), "UNKNOWN".to_string()],
            },
            TypeDefinition::Struct {
                name: "HazE".to_string(),
                fields,
            },
        ]);
    }

    #[test]
    fn emit_json_document_shape_and_defaults() {
        //* Given
        let mut spec = Spec::new();
        register_haze(&mut spec);
        let mut meta = DocMetadata::new();
        meta.route = Some(RouteDoc {
            verb: Some("GET".to_string()),
            path: "/pets/{id}".to_string(),
            webhook: false,
        });
        meta.params.push(ParamDoc {
            name: "id".to_string(),
            location: Some("path".to_string()),
            required: Some(true),
            ..Default::default()
        });
        meta.returns.push(ReturnDoc {
            status: "200".to_string(),
            content_type: Some("application/json".to_string()),
            schema: Some("HazE".to_string()),
            ..Default::default()
        });
        spec.add_operation(&meta).expect("operation aggregates");

        //* When
        let text = emit_json(&spec).expect("document should emit");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");

        //* Then
        assert_eq!(value["openapi"], "3.2.0", "version defaults to 3.2.0");
        assert!(value.get("paths").is_some(), "paths always present");
        let tank = &value["components"]["schemas"]["Tank"];
        assert_eq!(tank["type"], "string");
        assert_eq!(
            tank["enum"],
            serde_json::json!(["BIG", "SMALL"]),
            "the UNKNOWN sentinel is filtered"
        );
        let haze = &value["components"]["schemas"]["HazE"];
        assert_eq!(haze["type"], "object");
        assert_eq!(haze["required"], serde_json::json!(["bzr"]));
        assert_eq!(
            haze["properties"]["tank"]["$ref"],
            "#/components/schemas/Tank"
        );
        let op = &value["paths"]["/pets/{id}"]["get"];
        assert_eq!(op["parameters"][0]["name"], "id");
        assert_eq!(op["parameters"][0]["in"], "path");
        let content = &op["responses"]["200"]["content"]["application/json"];
        assert_eq!(content["schema"]["$ref"], "#/components/schemas/HazE");
    }

    #[test]
    fn emit_json_is_deterministic() {
        //* Given
        let mut spec = Spec::new();
        register_haze(&mut spec);

        //* When
        let first = emit_json(&spec).expect("first emission");
        let second = emit_json(&spec).expect("second emission");

        //* Then
        assert_eq!(first, second, "same model, byte-identical output");
    }

    #[test]
    fn emit_json_empty_paths_serialize_as_object() {
        //* Given
        let spec = Spec::new();

        //* When
        let text = emit_json(&spec).expect("document should emit");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");

        //* Then
        assert!(value["paths"].is_object(), "paths stays {{}} when empty");
        assert!(
            value.get("components").is_none(),
            "empty collections are omitted"
        );
    }

    #[test]
    fn union_schema_emits_oneof_with_discriminator_mapping() {
        //* Given
        let mut fields = StructFields::new();
        fields
            .push(StructField::new("dog", FieldKind::Object).ref_name("Dog"))
            .expect("push dog");
        fields
            .push(StructField::new("cat", FieldKind::Object).ref_name("Cat"))
            .expect("push cat");
        fields.is_union = true;
        fields.union_discriminator = Some("kind".to_string());
        fields.variants = vec![
            coapi_core::UnionVariantMeta {
                discriminator_value: Some("dog".to_string()),
                ..Default::default()
            },
            coapi_core::UnionVariantMeta {
                discriminator_value: Some("cat".to_string()),
                ..Default::default()
            },
        ];
        let def = TypeDefinition::Struct {
            name: "Pet".to_string(),
            fields,
        };

        //* When
        let schema = schema_from_typedef(&def);
        let value = serde_json::to_value(&schema).expect("schema serializes");

        //* Then
        assert_eq!(value["oneOf"][0]["$ref"], "#/components/schemas/Dog");
        assert_eq!(value["discriminator"]["propertyName"], "kind");
        assert_eq!(
            value["discriminator"]["mapping"]["cat"],
            "#/components/schemas/Cat"
        );
    }

    #[test]
    fn passthrough_extras_are_merged_into_the_schema() {
        //* Given
        let mut fields = StructFields::new();
        fields
            .push(StructField::new("name", FieldKind::String))
            .expect("push name");
        fields.extras = Some(serde_json::json!({"x-internal": true}));
        let def = TypeDefinition::Struct {
            name: "Pet".to_string(),
            fields,
        };

        //* When
        let value = serde_json::to_value(schema_from_typedef(&def)).expect("schema serializes");

        //* Then
        assert_eq!(value["x-internal"], true, "extras pass through verbatim");
    }
}
