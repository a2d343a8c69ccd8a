//! Logical-type to C-type mapping shared by the header and source emitters.

use coapi_core::{FieldKind, StructField, TypeDefinition};

use crate::error::EmitError;

/// The C declaration type for a field (arrays excluded; those emit a pointer
/// plus a `size_t n_<field>` counter).
pub fn c_value_type(field: &StructField) -> Result<String, EmitError> {
    Ok(match field.kind {
        FieldKind::String => "const char *".to_string(),
        FieldKind::Integer => "int ".to_string(),
        FieldKind::Number => "double ".to_string(),
        FieldKind::Boolean => "int ".to_string(),
        FieldKind::Null => "int ".to_string(),
        FieldKind::Enum => format!("enum {} ", ref_of(field)?),
        FieldKind::Object => format!("struct {} *", ref_of(field)?),
        FieldKind::Array => {
            return Err(EmitError::Unsupported(format!(
                "array field {:?} has no single value type",
                field.name
            )));
        }
    })
}

/// The element C type of an array field.
pub fn c_item_type(field: &StructField) -> Result<String, EmitError> {
    let item = ref_of(field)?;
    Ok(match item {
        "string" => "char *".to_string(),
        "integer" => "int ".to_string(),
        "number" => "double ".to_string(),
        "boolean" => "int ".to_string(),
        other => format!("struct {} *", other),
    })
}

/// True when an array field's items are objects rather than primitives.
pub fn array_items_are_objects(field: &StructField) -> bool {
    !matches!(
        field.ref_name.as_deref(),
        Some("string" | "integer" | "number" | "boolean" | "null")
    )
}

/// The reference name a field must carry.
pub fn ref_of(field: &StructField) -> Result<&str, EmitError> {
    field
        .ref_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| EmitError::Unresolved(format!("field {:?} has no type reference", field.name)))
}

/// Checks that every reference in the definitions resolves to a registered
/// name or a primitive logical type.
pub fn check_references(types: &[TypeDefinition]) -> Result<(), EmitError> {
    let known: Vec<&str> = types.iter().map(|t| t.name()).collect();
    let resolves = |name: &str| known.contains(&name) || coapi_core::is_primitive_type(name);

    for def in types {
        let TypeDefinition::Struct { name, fields } = def else {
            continue;
        };
        for field in &fields.fields {
            if let Some(target) = field.ref_name.as_deref()
                && !target.is_empty()
                && !resolves(target)
            {
                return Err(EmitError::Unresolved(format!(
                    "{name}.{}: {target}",
                    field.name
                )));
            }
            if matches!(field.kind, FieldKind::Object | FieldKind::Enum)
                && field.ref_name.as_deref().unwrap_or("").is_empty()
            {
                return Err(EmitError::Unresolved(format!(
                    "{name}.{} has no type reference",
                    field.name
                )));
            }
        }
    }
    Ok(())
}

/// Looks up a registered definition by name.
pub fn find_type<'a>(types: &'a [TypeDefinition], name: &str) -> Option<&'a TypeDefinition> {
    types.iter().find(|t| t.name() == name)
}

/// True when the named reference is a registered enum.
pub fn is_enum_ref(types: &[TypeDefinition], name: &str) -> bool {
    matches!(find_type(types, name), Some(TypeDefinition::Enum { .. }))
}
