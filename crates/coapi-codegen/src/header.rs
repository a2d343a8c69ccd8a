//! C header emission.
//!
//! Two passes: forward declarations for every struct and union so later
//! references are legal regardless of schema order, then the definitions in
//! document order with their generated-function prototypes.

use std::fmt::Write;

use coapi_core::{FieldKind, StructFields, TypeDefinition};
use heck::ToShoutySnakeCase;

use crate::{
    ctype::{array_items_are_objects, c_item_type, c_value_type, check_references, ref_of},
    error::EmitError,
};

/// Emits the complete `<base>.h` text.
pub fn emit_header(types: &[TypeDefinition], base: &str) -> Result<String, EmitError> {
    check_references(types)?;
    let guard = format!("{}_H", base.to_shouty_snake_case());
    let mut out = String::new();

    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include <stddef.h>")?;
    writeln!(out, "#include <stdio.h>")?;
    writeln!(out)?;
    writeln!(out, "#include <parson.h>")?;
    writeln!(out)?;
    writeln!(out, "#ifdef __cplusplus")?;
    writeln!(out, "extern \"C\" {{")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;

    // Pass 1: forward declarations.
    let mut forwarded = false;
    for def in types {
        if let TypeDefinition::Struct { name, fields } = def
            && !fields.root_array
        {
            writeln!(out, "struct {name};")?;
            forwarded = true;
        }
    }
    if forwarded {
        writeln!(out)?;
    }

    // Pass 2: definitions.
    let macro_base = base.to_shouty_snake_case();
    for def in types {
        match def {
            TypeDefinition::Enum { name, members } => {
                emit_enum(&mut out, &macro_base, name, members)?;
            }
            TypeDefinition::Struct { name, fields } if fields.root_array => {
                emit_root_array(&mut out, &macro_base, name, fields)?;
            }
            TypeDefinition::Struct { name, fields } if fields.is_union => {
                emit_union(&mut out, &macro_base, name, fields)?;
            }
            TypeDefinition::Struct { name, fields } => {
                emit_struct(&mut out, &macro_base, name, fields)?;
            }
        }
    }

    writeln!(out, "#ifdef __cplusplus")?;
    writeln!(out, "}}")?;
    writeln!(out, "#endif")?;
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;
    Ok(out)
}

fn emit_enum(
    out: &mut String,
    macro_base: &str,
    name: &str,
    members: &[String],
) -> Result<(), EmitError> {
    let named: Vec<&String> = members.iter().filter(|m| m.as_str() != "UNKNOWN").collect();
    writeln!(out, "enum {name} {{")?;
    writeln!(out, "  {name}_UNKNOWN = 0,")?;
    for (idx, member) in named.iter().enumerate() {
        let comma = if idx + 1 == named.len() { "" } else { "," };
        writeln!(out, "  {name}_{member}{comma}")?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {macro_base}_OMIT_ENUM_HELPERS")?;
    writeln!(out, "extern int {name}_from_str(const char *str, enum {name} *out);")?;
    writeln!(out, "extern char *{name}_to_str(enum {name} value);")?;
    writeln!(out, "#endif /* {macro_base}_OMIT_ENUM_HELPERS */")?;
    writeln!(out)?;
    Ok(())
}

fn emit_struct(
    out: &mut String,
    macro_base: &str,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    writeln!(out, "struct {name} {{")?;
    for field in &fields.fields {
        match field.kind {
            FieldKind::Array => {
                writeln!(out, "  {}*{};", c_item_type(field)?, field.name)?;
                writeln!(out, "  size_t n_{};", field.name)?;
            }
            _ if field.flexible_array => {
                writeln!(out, "  {}{}[];", c_value_type(field)?, field.name)?;
            }
            _ => match field.bit_width {
                Some(width) => {
                    writeln!(out, "  {}{} : {width};", c_value_type(field)?, field.name)?;
                }
                None => writeln!(out, "  {}{};", c_value_type(field)?, field.name)?,
            },
        }
    }
    writeln!(out, "}};")?;
    writeln!(out)?;

    writeln!(out, "#ifndef {macro_base}_OMIT_JSON")?;
    writeln!(
        out,
        "extern int {name}_from_json(const char *json, struct {name} **out);"
    )?;
    writeln!(
        out,
        "extern int {name}_from_jsonObject(const JSON_Object *obj, struct {name} **out);"
    )?;
    writeln!(
        out,
        "extern int {name}_to_json(const struct {name} *in, char **out);"
    )?;
    writeln!(out, "#endif /* {macro_base}_OMIT_JSON */")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {macro_base}_OMIT_UTILS")?;
    writeln!(out, "extern void {name}_cleanup(struct {name} *obj);")?;
    writeln!(out, "extern int {name}_default(struct {name} **out);")?;
    writeln!(
        out,
        "extern int {name}_deepcopy(const struct {name} *in, struct {name} **out);"
    )?;
    writeln!(
        out,
        "extern int {name}_eq(const struct {name} *a, const struct {name} *b);"
    )?;
    writeln!(out, "extern void {name}_debug(const struct {name} *in, FILE *fp);")?;
    writeln!(out, "extern int {name}_display(const struct {name} *in, FILE *fp);")?;
    writeln!(out, "#endif /* {macro_base}_OMIT_UTILS */")?;
    writeln!(out)?;
    Ok(())
}

fn emit_union(
    out: &mut String,
    macro_base: &str,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    writeln!(out, "enum {name}_tag {{")?;
    for (idx, field) in fields.fields.iter().enumerate() {
        let comma = if idx + 1 == fields.fields.len() { "" } else { "," };
        if idx == 0 {
            writeln!(out, "  {name}_tag_{} = 0{comma}", field.name)?;
        } else {
            writeln!(out, "  {name}_tag_{}{comma}", field.name)?;
        }
    }
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "struct {name} {{")?;
    writeln!(out, "  enum {name}_tag tag;")?;
    writeln!(out, "  union {{")?;
    for field in &fields.fields {
        match field.kind {
            FieldKind::Object => {
                writeln!(out, "    struct {} *{};", ref_of(field)?, field.name)?;
            }
            FieldKind::Array => {
                // An array payload is carried as its serialized JSON text.
                writeln!(out, "    char *{};", field.name)?;
            }
            FieldKind::String => writeln!(out, "    const char *{};", field.name)?,
            FieldKind::Number => writeln!(out, "    double {};", field.name)?,
            _ => writeln!(out, "    int {};", field.name)?,
        }
    }
    writeln!(out, "  }} data;")?;
    writeln!(out, "}};")?;
    writeln!(out)?;

    writeln!(out, "#ifndef {macro_base}_OMIT_JSON")?;
    writeln!(
        out,
        "extern int {name}_from_json(const char *json, struct {name} **out);"
    )?;
    writeln!(
        out,
        "extern int {name}_from_jsonObject(const JSON_Object *obj, struct {name} **out);"
    )?;
    writeln!(
        out,
        "extern int {name}_to_json(const struct {name} *in, char **out);"
    )?;
    writeln!(out, "#endif /* {macro_base}_OMIT_JSON */")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {macro_base}_OMIT_UTILS")?;
    writeln!(out, "extern void {name}_cleanup(struct {name} *obj);")?;
    writeln!(out, "#endif /* {macro_base}_OMIT_UTILS */")?;
    writeln!(out)?;
    Ok(())
}

fn emit_root_array(
    out: &mut String,
    macro_base: &str,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    let Some(item) = fields.fields.first() else {
        return Err(EmitError::Unsupported(format!(
            "root-array schema {name:?} has no item field"
        )));
    };

    writeln!(out, "#ifndef {macro_base}_OMIT_JSON")?;
    if array_items_are_objects(item) {
        let target = ref_of(item)?;
        writeln!(
            out,
            "extern int {name}_from_json(const char *json, struct {target} ***out, size_t *len);"
        )?;
        writeln!(
            out,
            "extern int {name}_to_json(struct {target} *const *in, size_t len, char **out);"
        )?;
        writeln!(out, "#endif /* {macro_base}_OMIT_JSON */")?;
        writeln!(out)?;
        writeln!(out, "#ifndef {macro_base}_OMIT_UTILS")?;
        writeln!(
            out,
            "extern void {name}_cleanup(struct {target} **in, size_t len);"
        )?;
        writeln!(out, "#endif /* {macro_base}_OMIT_UTILS */")?;
    } else {
        let item_type = c_item_type(item)?;
        writeln!(
            out,
            "extern int {name}_from_json(const char *json, {item_type}**out, size_t *len);"
        )?;
        writeln!(
            out,
            "extern int {name}_to_json(const {item_type}*in, size_t len, char **out);"
        )?;
        writeln!(out, "#endif /* {macro_base}_OMIT_JSON */")?;
        writeln!(out)?;
        writeln!(out, "#ifndef {macro_base}_OMIT_UTILS")?;
        writeln!(out, "extern void {name}_cleanup({item_type}*in, size_t len);")?;
        writeln!(out, "#endif /* {macro_base}_OMIT_UTILS */")?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coapi_core::{StructField, UnionVariantMeta};

    fn haze_types() -> Vec<TypeDefinition> {
        let mut fields = StructFields::new();
        fields
            .push(StructField::new("bzr", FieldKind::String).required())
            .expect("push bzr");
        fields
            .push(StructField::new("tank", FieldKind::Enum).ref_name("Tank"))
            .expect("push tank");
        vec![
            TypeDefinition::Enum {
                name: "Tank".to_string(),
                members: vec!["BIG".to_string(), "SMALL".to_string(), "UNKNOWN".to_string()],
            },
            TypeDefinition::Struct {
                name: "HazE".to_string(),
                fields,
            },
        ]
    }

    #[test]
    fn emit_header_has_guard_forward_decls_and_prototypes() {
        //* Given
        let types = haze_types();

        //* When
        let header = emit_header(&types, "generated_client").expect("header should emit");

        //* Then
        assert!(header.starts_with("#ifndef GENERATED_CLIENT_H\n"));
        assert!(header.contains("#define GENERATED_CLIENT_H"));
        assert!(header.contains("extern \"C\" {"));
        assert!(header.contains("struct HazE;\n"), "forward declaration pass");
        assert!(header.contains("enum Tank {\n  Tank_UNKNOWN = 0,\n  Tank_BIG,\n  Tank_SMALL\n};"));
        assert!(header.contains("struct HazE {\n  const char *bzr;\n  enum Tank tank;\n};"));
        assert!(header.contains("extern int HazE_from_json(const char *json, struct HazE **out);"));
        assert!(header.contains("extern int HazE_to_json(const struct HazE *in, char **out);"));
        assert!(header.contains("extern void HazE_cleanup(struct HazE *obj);"));
        assert!(header.contains("extern int HazE_eq(const struct HazE *a, const struct HazE *b);"));
        assert!(header.contains("#ifndef GENERATED_CLIENT_OMIT_JSON"));
        assert!(header.contains("#ifndef GENERATED_CLIENT_OMIT_UTILS"));
        assert!(header.contains("#ifndef GENERATED_CLIENT_OMIT_ENUM_HELPERS"));
        assert!(header.ends_with("#endif /* GENERATED_CLIENT_H */\n"));
    }

    #[test]
    fn emit_header_unresolved_reference_fails() {
        //* Given
        let mut fields = StructFields::new();
        fields
            .push(StructField::new("owner", FieldKind::Object).ref_name("Ghost"))
            .expect("push owner");
        let types = vec![TypeDefinition::Struct {
            name: "Pet".to_string(),
            fields,
        }];

        //* When
        let result = emit_header(&types, "x");

        //* Then
        assert!(
            matches!(result, Err(EmitError::Unresolved(_))),
            "unresolved reference must fail at emission time"
        );
    }

    #[test]
    fn emit_header_union_gets_tag_enum_and_payload() {
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
        fields.variants = vec![UnionVariantMeta::default(), UnionVariantMeta::default()];
        let types = vec![
            TypeDefinition::Struct {
                name: "Dog".to_string(),
                fields: StructFields::new(),
            },
            TypeDefinition::Struct {
                name: "Cat".to_string(),
                fields: StructFields::new(),
            },
            TypeDefinition::Struct {
                name: "Pet".to_string(),
                fields,
            },
        ];

        //* When
        let header = emit_header(&types, "api").expect("header should emit");

        //* Then
        assert!(header.contains("enum Pet_tag {\n  Pet_tag_dog = 0,\n  Pet_tag_cat\n};"));
        assert!(header.contains("struct Pet {\n  enum Pet_tag tag;\n  union {\n    struct Dog *dog;\n    struct Cat *cat;\n  } data;\n};"));
    }

    #[test]
    fn emit_header_array_fields_add_count_members() {
        //* Given
        let mut fields = StructFields::new();
        fields
            .push(StructField::new("toys", FieldKind::Array).ref_name("Toy"))
            .expect("push toys");
        fields
            .push(StructField::new("aliases", FieldKind::Array).ref_name("string"))
            .expect("push aliases");
        let types = vec![
            TypeDefinition::Struct {
                name: "Toy".to_string(),
                fields: StructFields::new(),
            },
            TypeDefinition::Struct {
                name: "Pet".to_string(),
                fields,
            },
        ];

        //* When
        let header = emit_header(&types, "api").expect("header should emit");

        //* Then
        assert!(header.contains("struct Toy **toys;\n  size_t n_toys;"));
        assert!(header.contains("char **aliases;\n  size_t n_aliases;"));
    }
}
