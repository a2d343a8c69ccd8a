//! C source emission: the generated function families.
//!
//! For structs and enums the set is `_from_str`/`_to_str` (enums),
//! `_from_json`/`_from_jsonObject`/`_to_json`, `_cleanup`, `_default`,
//! `_deepcopy`, `_eq`, `_debug` and `_display`. Tagged unions add two-tier
//! variant dispatch; root-array schemas generate the `(items, len)` family.
//! Every generated function returns 0 on success or a small errno-style code.

use std::fmt::Write;

use coapi_core::{Constraints, FieldKind, StructField, StructFields, TypeDefinition};

use crate::{
    ctype::{array_items_are_objects, c_item_type, check_references, is_enum_ref, ref_of},
    error::EmitError,
};

/// Emits the complete `<base>.c` text.
pub fn emit_source(types: &[TypeDefinition], base: &str) -> Result<String, EmitError> {
    check_references(types)?;
    let mut out = String::new();

    writeln!(out, "#include <errno.h>")?;
    writeln!(out, "#include <stdarg.h>")?;
    writeln!(out, "#include <stdio.h>")?;
    writeln!(out, "#include <stdlib.h>")?;
    writeln!(out, "#include <string.h>")?;
    if types.iter().any(|t| matches!(t, TypeDefinition::Enum { .. })) {
        writeln!(out, "#include <strings.h>")?;
    }
    writeln!(out)?;
    writeln!(out, "#include \"{base}.h\"")?;
    writeln!(out)?;

    emit_append_helper(&mut out)?;
    if uses_patterns(types) {
        emit_pattern_helper(&mut out)?;
    }

    for def in types {
        match def {
            TypeDefinition::Enum { name, members } => emit_enum_impl(&mut out, name, members)?,
            TypeDefinition::Struct { name, fields } if fields.root_array => {
                emit_root_array_impl(&mut out, name, fields)?;
            }
            TypeDefinition::Struct { name, fields } if fields.is_union => {
                emit_union_impl(&mut out, name, fields)?;
            }
            TypeDefinition::Struct { name, fields } => {
                emit_struct_impl(&mut out, types, name, fields)?;
            }
        }
    }

    Ok(out)
}

fn uses_patterns(types: &[TypeDefinition]) -> bool {
    types.iter().any(|def| match def {
        TypeDefinition::Struct { fields, .. } => fields
            .fields
            .iter()
            .any(|f| f.constraints.pattern.is_some()),
        TypeDefinition::Enum { .. } => false,
    })
}

/// Escapes a Rust string into a C string literal body.
fn c_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            other => quoted.push(other),
        }
    }
    quoted
}

fn emit_append_helper(out: &mut String) -> Result<(), EmitError> {
    writeln!(out, "static int coapi_buf_append(char **buf, const char *fmt, ...) {{")?;
    writeln!(out, "  va_list args;")?;
    writeln!(out, "  va_list copy;")?;
    writeln!(out, "  char *grown;")?;
    writeln!(out, "  size_t old;")?;
    writeln!(out, "  int add;")?;
    writeln!(out)?;
    writeln!(out, "  va_start(args, fmt);")?;
    writeln!(out, "  va_copy(copy, args);")?;
    writeln!(out, "  add = vsnprintf(NULL, 0, fmt, copy);")?;
    writeln!(out, "  va_end(copy);")?;
    writeln!(out, "  if (add < 0) {{")?;
    writeln!(out, "    va_end(args);")?;
    writeln!(out, "    return EIO;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  old = *buf == NULL ? 0 : strlen(*buf);")?;
    writeln!(out, "  grown = realloc(*buf, old + (size_t)add + 1);")?;
    writeln!(out, "  if (grown == NULL) {{")?;
    writeln!(out, "    va_end(args);")?;
    writeln!(out, "    return ENOMEM;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  vsnprintf(grown + old, (size_t)add + 1, fmt, args);")?;
    writeln!(out, "  va_end(args);")?;
    writeln!(out, "  *buf = grown;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

/// Anchors select the match mode: `^...$` exact, `^...` prefix, `...$`
/// suffix, anything else substring.
fn emit_pattern_helper(out: &mut String) -> Result<(), EmitError> {
    writeln!(out, "static int coapi_pattern_match(const char *pattern, const char *value) {{")?;
    writeln!(out, "  size_t plen = strlen(pattern);")?;
    writeln!(out, "  size_t vlen = strlen(value);")?;
    writeln!(out)?;
    writeln!(out, "  if (plen > 1 && pattern[0] == '^' && pattern[plen - 1] == '$') {{")?;
    writeln!(out, "    return vlen == plen - 2 && strncmp(value, pattern + 1, plen - 2) == 0;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  if (plen > 0 && pattern[0] == '^') {{")?;
    writeln!(out, "    return strncmp(value, pattern + 1, plen - 1) == 0;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  if (plen > 0 && pattern[plen - 1] == '$') {{")?;
    writeln!(out, "    return vlen >= plen - 1 &&")?;
    writeln!(
        out,
        "           strncmp(value + vlen - (plen - 1), pattern, plen - 1) == 0;"
    )?;
    writeln!(out, "  }}")?;
    writeln!(out, "  return strstr(value, pattern) != NULL;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_enum_impl(out: &mut String, name: &str, members: &[String]) -> Result<(), EmitError> {
    let named: Vec<&String> = members.iter().filter(|m| m.as_str() != "UNKNOWN").collect();

    writeln!(out, "int {name}_from_str(const char *str, enum {name} *out) {{")?;
    writeln!(out, "  if (str == NULL || out == NULL) return EINVAL;")?;
    for member in &named {
        writeln!(out, "  if (strcmp(str, \"{}\") == 0) {{", c_quote(member))?;
        writeln!(out, "    *out = {name}_{member};")?;
        writeln!(out, "    return 0;")?;
        writeln!(out, "  }}")?;
    }
    for member in &named {
        writeln!(out, "  if (strcasecmp(str, \"{}\") == 0) {{", c_quote(member))?;
        writeln!(out, "    *out = {name}_{member};")?;
        writeln!(out, "    return 0;")?;
        writeln!(out, "  }}")?;
    }
    writeln!(out, "  *out = {name}_UNKNOWN;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "char *{name}_to_str(enum {name} value) {{")?;
    writeln!(out, "  switch (value) {{")?;
    for member in &named {
        writeln!(out, "  case {name}_{member}:")?;
        writeln!(out, "    return strdup(\"{}\");", c_quote(member))?;
    }
    writeln!(out, "  default:")?;
    writeln!(out, "    return strdup(\"UNKNOWN\");")?;
    writeln!(out, "  }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

/// The `cleanup-and-return` statement used on every failure path inside a
/// builder function.
fn fail(cleanup: &str, code: &str) -> String {
    format!("{{ {cleanup}; return {code}; }}")
}

fn emit_struct_impl(
    out: &mut String,
    types: &[TypeDefinition],
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    let codec_fields: Vec<&StructField> = fields
        .fields
        .iter()
        .filter(|f| !f.flexible_array)
        .collect();

    emit_from_json_object(out, types, name, &codec_fields)?;
    emit_from_json_wrapper(out, name)?;
    emit_to_json(out, name, &codec_fields)?;
    emit_cleanup(out, name, &codec_fields)?;
    emit_default(out, name, &codec_fields)?;
    emit_deepcopy(out, name, &codec_fields)?;
    emit_eq(out, name, &codec_fields)?;
    emit_debug(out, name, &codec_fields)?;
    emit_display(out, name)?;
    Ok(())
}

fn emit_from_json_wrapper(out: &mut String, name: &str) -> Result<(), EmitError> {
    writeln!(out, "int {name}_from_json(const char *json, struct {name} **out) {{")?;
    writeln!(out, "  JSON_Value *root;")?;
    writeln!(out, "  const JSON_Object *obj;")?;
    writeln!(out, "  int rc;")?;
    writeln!(out)?;
    writeln!(out, "  if (json == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  root = json_parse_string(json);")?;
    writeln!(out, "  if (root == NULL) return EINVAL;")?;
    writeln!(out, "  obj = json_value_get_object(root);")?;
    writeln!(out, "  if (obj == NULL) {{")?;
    writeln!(out, "    json_value_free(root);")?;
    writeln!(out, "    return EINVAL;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  rc = {name}_from_jsonObject(obj, out);")?;
    writeln!(out, "  json_value_free(root);")?;
    writeln!(out, "  return rc;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_from_json_object(
    out: &mut String,
    types: &[TypeDefinition],
    name: &str,
    fields: &[&StructField],
) -> Result<(), EmitError> {
    let drop = format!("{name}_cleanup(ret)");

    writeln!(
        out,
        "int {name}_from_jsonObject(const JSON_Object *obj, struct {name} **out) {{"
    )?;
    writeln!(out, "  struct {name} *ret;")?;
    if fields
        .iter()
        .any(|f| matches!(f.kind, FieldKind::Object | FieldKind::Enum | FieldKind::Array))
    {
        writeln!(out, "  int rc;")?;
    }
    writeln!(out)?;
    writeln!(out, "  if (obj == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  ret = calloc(1, sizeof *ret);")?;
    writeln!(out, "  if (ret == NULL) return ENOMEM;")?;

    for field in fields {
        let key = c_quote(&field.name);
        let member = &field.name;
        let required = field.constraints.required;
        writeln!(out)?;
        match field.kind {
            FieldKind::String => {
                writeln!(out, "  {{")?;
                writeln!(out, "    const char *val = json_object_get_string(obj, \"{key}\");")?;
                if required {
                    writeln!(out, "    if (val == NULL) {}", fail(&drop, "EINVAL"))?;
                    emit_string_validation(out, &field.constraints, &drop, "val", "    ")?;
                    writeln!(out, "    ret->{member} = strdup(val);")?;
                    writeln!(out, "    if (ret->{member} == NULL) {}", fail(&drop, "ENOMEM"))?;
                } else {
                    writeln!(out, "    if (val != NULL) {{")?;
                    emit_string_validation(out, &field.constraints, &drop, "val", "      ")?;
                    writeln!(out, "      ret->{member} = strdup(val);")?;
                    writeln!(
                        out,
                        "      if (ret->{member} == NULL) {}",
                        fail(&drop, "ENOMEM")
                    )?;
                    writeln!(out, "    }}")?;
                }
                writeln!(out, "  }}")?;
            }
            FieldKind::Integer | FieldKind::Number => {
                let cast = if field.kind == FieldKind::Integer {
                    "(int)"
                } else {
                    ""
                };
                writeln!(out, "  if (json_object_has_value_of_type(obj, \"{key}\", JSONNumber)) {{")?;
                writeln!(
                    out,
                    "    ret->{member} = {cast}json_object_get_number(obj, \"{key}\");"
                )?;
                emit_range_validation(out, field, &drop, "    ")?;
                if required {
                    writeln!(out, "  }} else {}", fail(&drop, "EINVAL"))?;
                } else {
                    writeln!(out, "  }}")?;
                }
            }
            FieldKind::Boolean => {
                writeln!(out, "  {{")?;
                writeln!(out, "    int val = json_object_get_boolean(obj, \"{key}\");")?;
                if required {
                    writeln!(out, "    if (val == -1) {}", fail(&drop, "EINVAL"))?;
                    writeln!(out, "    ret->{member} = val;")?;
                } else {
                    writeln!(out, "    if (val != -1) ret->{member} = val;")?;
                }
                writeln!(out, "  }}")?;
            }
            FieldKind::Enum => {
                let target = ref_of(field)?;
                writeln!(out, "  {{")?;
                writeln!(out, "    const char *val = json_object_get_string(obj, \"{key}\");")?;
                if required {
                    writeln!(out, "    if (val == NULL) {}", fail(&drop, "EINVAL"))?;
                    writeln!(out, "    rc = {target}_from_str(val, &ret->{member});")?;
                    writeln!(out, "    if (rc != 0) {}", fail(&drop, "rc"))?;
                } else {
                    writeln!(out, "    if (val != NULL) {{")?;
                    writeln!(out, "      rc = {target}_from_str(val, &ret->{member});")?;
                    writeln!(out, "      if (rc != 0) {}", fail(&drop, "rc"))?;
                    writeln!(out, "    }}")?;
                }
                writeln!(out, "  }}")?;
            }
            FieldKind::Object => {
                let target = ref_of(field)?;
                writeln!(out, "  {{")?;
                writeln!(
                    out,
                    "    const JSON_Object *child = json_object_get_object(obj, \"{key}\");"
                )?;
                if required {
                    writeln!(out, "    if (child == NULL) {}", fail(&drop, "EINVAL"))?;
                    writeln!(out, "    rc = {target}_from_jsonObject(child, &ret->{member});")?;
                    writeln!(out, "    if (rc != 0) {}", fail(&drop, "rc"))?;
                } else {
                    writeln!(out, "    if (child != NULL) {{")?;
                    writeln!(out, "      rc = {target}_from_jsonObject(child, &ret->{member});")?;
                    writeln!(out, "      if (rc != 0) {}", fail(&drop, "rc"))?;
                    writeln!(out, "    }}")?;
                }
                writeln!(out, "  }}")?;
            }
            FieldKind::Array => {
                emit_array_read(out, types, field, &drop)?;
            }
            FieldKind::Null => {
                // Nothing to read; the member stays zero.
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "  *out = ret;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_string_validation(
    out: &mut String,
    constraints: &Constraints,
    drop: &str,
    var: &str,
    indent: &str,
) -> Result<(), EmitError> {
    if let Some(min) = constraints.min_length {
        writeln!(
            out,
            "{indent}if (strlen({var}) < {min}) {}",
            fail(drop, "ERANGE")
        )?;
    }
    if let Some(max) = constraints.max_length {
        writeln!(
            out,
            "{indent}if (strlen({var}) > {max}) {}",
            fail(drop, "ERANGE")
        )?;
    }
    if let Some(pattern) = &constraints.pattern {
        writeln!(
            out,
            "{indent}if (!coapi_pattern_match(\"{}\", {var})) {}",
            c_quote(pattern),
            fail(drop, "ERANGE")
        )?;
    }
    Ok(())
}

fn emit_range_validation(
    out: &mut String,
    field: &StructField,
    drop: &str,
    indent: &str,
) -> Result<(), EmitError> {
    let member = &field.name;
    if let Some(min) = field.constraints.minimum {
        let op = if field.constraints.exclusive_minimum {
            "<="
        } else {
            "<"
        };
        writeln!(
            out,
            "{indent}if (ret->{member} {op} {min}) {}",
            fail(drop, "ERANGE")
        )?;
    }
    if let Some(max) = field.constraints.maximum {
        let op = if field.constraints.exclusive_maximum {
            ">="
        } else {
            ">"
        };
        writeln!(
            out,
            "{indent}if (ret->{member} {op} {max}) {}",
            fail(drop, "ERANGE")
        )?;
    }
    Ok(())
}

fn emit_array_read(
    out: &mut String,
    types: &[TypeDefinition],
    field: &StructField,
    drop: &str,
) -> Result<(), EmitError> {
    let key = c_quote(&field.name);
    let member = &field.name;
    let required = field.constraints.required;

    writeln!(out, "  {{")?;
    writeln!(out, "    JSON_Array *arr = json_object_get_array(obj, \"{key}\");")?;
    if required {
        writeln!(out, "    if (arr == NULL) {}", fail(drop, "EINVAL"))?;
    }
    writeln!(out, "    if (arr != NULL) {{")?;
    writeln!(out, "      size_t i;")?;
    writeln!(out, "      size_t count = json_array_get_count(arr);")?;
    if let Some(min) = field.constraints.min_items {
        writeln!(out, "      if (count < {min}) {}", fail(drop, "ERANGE"))?;
    }
    if let Some(max) = field.constraints.max_items {
        writeln!(out, "      if (count > {max}) {}", fail(drop, "ERANGE"))?;
    }
    writeln!(
        out,
        "      ret->{member} = calloc(count ? count : 1, sizeof *ret->{member});"
    )?;
    writeln!(out, "      if (ret->{member} == NULL) {}", fail(drop, "ENOMEM"))?;
    writeln!(out, "      ret->n_{member} = count;")?;
    writeln!(out, "      for (i = 0; i < count; i++) {{")?;
    if array_items_are_objects(field) {
        let target = ref_of(field)?;
        if is_enum_ref(types, target) {
            return Err(EmitError::Unsupported(format!(
                "array of enum {target:?} is not representable"
            )));
        }
        writeln!(
            out,
            "        const JSON_Object *item = json_array_get_object(arr, i);"
        )?;
        writeln!(out, "        if (item == NULL) {}", fail(drop, "EINVAL"))?;
        writeln!(
            out,
            "        rc = {target}_from_jsonObject(item, &ret->{member}[i]);"
        )?;
        writeln!(out, "        if (rc != 0) {}", fail(drop, "rc"))?;
    } else {
        match field.ref_name.as_deref() {
            Some("string") => {
                writeln!(
                    out,
                    "        const char *item = json_array_get_string(arr, i);"
                )?;
                writeln!(out, "        if (item == NULL) {}", fail(drop, "EINVAL"))?;
                writeln!(out, "        ret->{member}[i] = strdup(item);")?;
                writeln!(
                    out,
                    "        if (ret->{member}[i] == NULL) {}",
                    fail(drop, "ENOMEM")
                )?;
            }
            Some("integer") => {
                writeln!(
                    out,
                    "        ret->{member}[i] = (int)json_array_get_number(arr, i);"
                )?;
            }
            Some("number") => {
                writeln!(
                    out,
                    "        ret->{member}[i] = json_array_get_number(arr, i);"
                )?;
            }
            _ => {
                writeln!(
                    out,
                    "        ret->{member}[i] = json_array_get_boolean(arr, i) == 1;"
                )?;
            }
        }
    }
    writeln!(out, "      }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    Ok(())
}

fn emit_to_json(out: &mut String, name: &str, fields: &[&StructField]) -> Result<(), EmitError> {
    writeln!(out, "int {name}_to_json(const struct {name} *in, char **out) {{")?;
    writeln!(out, "  char *buf = NULL;")?;
    writeln!(out, "  const char *sep = \"\";")?;
    writeln!(out, "  int rc;")?;
    writeln!(out)?;
    writeln!(out, "  if (in == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  rc = coapi_buf_append(&buf, \"{{\");")?;
    writeln!(out, "  if (rc != 0) {{ free(buf); return rc; }}")?;

    let bail = "{ free(buf); return rc; }";
    for field in fields {
        let key = c_quote(&field.name);
        let member = &field.name;
        writeln!(out)?;
        match field.kind {
            FieldKind::String => {
                writeln!(out, "  if (in->{member} != NULL) {{")?;
                writeln!(
                    out,
                    "    rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": \\\"%s\\\"\", sep, in->{member});"
                )?;
                writeln!(out, "    if (rc != 0) {bail}")?;
                writeln!(out, "    sep = \",\";")?;
                writeln!(out, "  }}")?;
            }
            FieldKind::Integer => {
                writeln!(
                    out,
                    "  rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": %d\", sep, in->{member});"
                )?;
                writeln!(out, "  if (rc != 0) {bail}")?;
                writeln!(out, "  sep = \",\";")?;
            }
            FieldKind::Number => {
                writeln!(
                    out,
                    "  rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": %g\", sep, in->{member});"
                )?;
                writeln!(out, "  if (rc != 0) {bail}")?;
                writeln!(out, "  sep = \",\";")?;
            }
            FieldKind::Boolean => {
                writeln!(
                    out,
                    "  rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": %s\", sep, in->{member} ? \"true\" : \"false\");"
                )?;
                writeln!(out, "  if (rc != 0) {bail}")?;
                writeln!(out, "  sep = \",\";")?;
            }
            FieldKind::Enum => {
                let target = ref_of(field)?;
                writeln!(out, "  {{")?;
                writeln!(out, "    char *val = {target}_to_str(in->{member});")?;
                writeln!(out, "    if (val == NULL) {{ free(buf); return ENOMEM; }}")?;
                writeln!(
                    out,
                    "    rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": \\\"%s\\\"\", sep, val);"
                )?;
                writeln!(out, "    free(val);")?;
                writeln!(out, "    if (rc != 0) {bail}")?;
                writeln!(out, "    sep = \",\";")?;
                writeln!(out, "  }}")?;
            }
            FieldKind::Object => {
                let target = ref_of(field)?;
                writeln!(out, "  if (in->{member} != NULL) {{")?;
                writeln!(out, "    char *child = NULL;")?;
                writeln!(out, "    rc = {target}_to_json(in->{member}, &child);")?;
                writeln!(out, "    if (rc != 0) {bail}")?;
                writeln!(
                    out,
                    "    rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": %s\", sep, child);"
                )?;
                writeln!(out, "    free(child);")?;
                writeln!(out, "    if (rc != 0) {bail}")?;
                writeln!(out, "    sep = \",\";")?;
                writeln!(out, "  }}")?;
            }
            FieldKind::Array => {
                emit_array_write(out, field, bail)?;
            }
            FieldKind::Null => {
                writeln!(out, "  rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": null\", sep);")?;
                writeln!(out, "  if (rc != 0) {bail}")?;
                writeln!(out, "  sep = \",\";")?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "  rc = coapi_buf_append(&buf, \"}}\");")?;
    writeln!(out, "  if (rc != 0) {{ free(buf); return rc; }}")?;
    writeln!(out, "  *out = buf;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_array_write(out: &mut String, field: &StructField, bail: &str) -> Result<(), EmitError> {
    let key = c_quote(&field.name);
    let member = &field.name;

    writeln!(out, "  if (in->{member} != NULL) {{")?;
    writeln!(out, "    size_t i;")?;
    writeln!(out, "    rc = coapi_buf_append(&buf, \"%s\\\"{key}\\\": [\", sep);")?;
    writeln!(out, "    if (rc != 0) {bail}")?;
    writeln!(out, "    for (i = 0; i < in->n_{member}; i++) {{")?;
    if array_items_are_objects(field) {
        let target = ref_of(field)?;
        writeln!(out, "      char *item = NULL;")?;
        writeln!(out, "      rc = {target}_to_json(in->{member}[i], &item);")?;
        writeln!(out, "      if (rc != 0) {bail}")?;
        writeln!(
            out,
            "      rc = coapi_buf_append(&buf, \"%s%s\", i == 0 ? \"\" : \",\", item);"
        )?;
        writeln!(out, "      free(item);")?;
        writeln!(out, "      if (rc != 0) {bail}")?;
    } else {
        let fmt = match field.ref_name.as_deref() {
            Some("string") => "\\\"%s\\\"",
            Some("integer") => "%d",
            Some("number") => "%g",
            _ => "%s",
        };
        if field.ref_name.as_deref() == Some("boolean") {
            writeln!(
                out,
                "      rc = coapi_buf_append(&buf, \"%s%s\", i == 0 ? \"\" : \",\", in->{member}[i] ? \"true\" : \"false\");"
            )?;
        } else {
            writeln!(
                out,
                "      rc = coapi_buf_append(&buf, \"%s{fmt}\", i == 0 ? \"\" : \",\", in->{member}[i]);"
            )?;
        }
        writeln!(out, "      if (rc != 0) {bail}")?;
    }
    writeln!(out, "    }}")?;
    writeln!(out, "    rc = coapi_buf_append(&buf, \"]\");")?;
    writeln!(out, "    if (rc != 0) {bail}")?;
    writeln!(out, "    sep = \",\";")?;
    writeln!(out, "  }}")?;
    Ok(())
}

fn emit_cleanup(out: &mut String, name: &str, fields: &[&StructField]) -> Result<(), EmitError> {
    writeln!(out, "void {name}_cleanup(struct {name} *obj) {{")?;
    writeln!(out, "  if (obj == NULL) return;")?;
    for field in fields {
        let member = &field.name;
        match field.kind {
            FieldKind::String => writeln!(out, "  free((char *)obj->{member});")?,
            FieldKind::Object => {
                let target = ref_of(field)?;
                writeln!(out, "  {target}_cleanup(obj->{member});")?;
            }
            FieldKind::Array => {
                if array_items_are_objects(field) {
                    let target = ref_of(field)?;
                    writeln!(out, "  if (obj->{member} != NULL) {{")?;
                    writeln!(out, "    size_t i;")?;
                    writeln!(out, "    for (i = 0; i < obj->n_{member}; i++) {{")?;
                    writeln!(out, "      {target}_cleanup(obj->{member}[i]);")?;
                    writeln!(out, "    }}")?;
                    writeln!(out, "  }}")?;
                    writeln!(out, "  free(obj->{member});")?;
                } else if field.ref_name.as_deref() == Some("string") {
                    writeln!(out, "  if (obj->{member} != NULL) {{")?;
                    writeln!(out, "    size_t i;")?;
                    writeln!(out, "    for (i = 0; i < obj->n_{member}; i++) {{")?;
                    writeln!(out, "      free(obj->{member}[i]);")?;
                    writeln!(out, "    }}")?;
                    writeln!(out, "  }}")?;
                    writeln!(out, "  free(obj->{member});")?;
                } else {
                    writeln!(out, "  free(obj->{member});")?;
                }
            }
            _ => {}
        }
    }
    writeln!(out, "  free(obj);")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_default(out: &mut String, name: &str, fields: &[&StructField]) -> Result<(), EmitError> {
    let drop = format!("{name}_cleanup(ret)");
    writeln!(out, "int {name}_default(struct {name} **out) {{")?;
    writeln!(out, "  struct {name} *ret;")?;
    writeln!(out)?;
    writeln!(out, "  if (out == NULL) return EINVAL;")?;
    writeln!(out, "  ret = calloc(1, sizeof *ret);")?;
    writeln!(out, "  if (ret == NULL) return ENOMEM;")?;
    for field in fields {
        let member = &field.name;
        let Some(default) = &field.default_value else {
            continue;
        };
        match field.kind {
            FieldKind::String => {
                writeln!(out, "  ret->{member} = strdup(\"{}\");", c_quote(default))?;
                writeln!(out, "  if (ret->{member} == NULL) {}", fail(&drop, "ENOMEM"))?;
            }
            FieldKind::Integer | FieldKind::Number => {
                writeln!(out, "  ret->{member} = {default};")?;
            }
            FieldKind::Boolean => {
                let value = if default == "true" { 1 } else { 0 };
                writeln!(out, "  ret->{member} = {value};")?;
            }
            FieldKind::Enum => {
                let target = ref_of(field)?;
                writeln!(
                    out,
                    "  (void){target}_from_str(\"{}\", &ret->{member});",
                    c_quote(default)
                )?;
            }
            _ => {}
        }
    }
    writeln!(out, "  *out = ret;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_deepcopy(out: &mut String, name: &str, fields: &[&StructField]) -> Result<(), EmitError> {
    let drop = format!("{name}_cleanup(ret)");
    writeln!(
        out,
        "int {name}_deepcopy(const struct {name} *in, struct {name} **out) {{"
    )?;
    writeln!(out, "  struct {name} *ret;")?;
    if fields
        .iter()
        .any(|f| matches!(f.kind, FieldKind::Object | FieldKind::Array))
    {
        writeln!(out, "  int rc;")?;
    }
    writeln!(out)?;
    writeln!(out, "  if (in == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  ret = calloc(1, sizeof *ret);")?;
    writeln!(out, "  if (ret == NULL) return ENOMEM;")?;

    for field in fields {
        let member = &field.name;
        match field.kind {
            FieldKind::String => {
                writeln!(out, "  if (in->{member} != NULL) {{")?;
                writeln!(out, "    ret->{member} = strdup(in->{member});")?;
                writeln!(out, "    if (ret->{member} == NULL) {}", fail(&drop, "ENOMEM"))?;
                writeln!(out, "  }}")?;
            }
            FieldKind::Integer
            | FieldKind::Number
            | FieldKind::Boolean
            | FieldKind::Enum
            | FieldKind::Null => {
                writeln!(out, "  ret->{member} = in->{member};")?;
            }
            FieldKind::Object => {
                let target = ref_of(field)?;
                writeln!(out, "  if (in->{member} != NULL) {{")?;
                writeln!(out, "    rc = {target}_deepcopy(in->{member}, &ret->{member});")?;
                writeln!(out, "    if (rc != 0) {}", fail(&drop, "rc"))?;
                writeln!(out, "  }}")?;
            }
            FieldKind::Array => {
                writeln!(out, "  if (in->{member} != NULL && in->n_{member} > 0) {{")?;
                writeln!(out, "    size_t i;")?;
                writeln!(
                    out,
                    "    ret->{member} = calloc(in->n_{member}, sizeof *ret->{member});"
                )?;
                writeln!(out, "    if (ret->{member} == NULL) {}", fail(&drop, "ENOMEM"))?;
                writeln!(out, "    ret->n_{member} = in->n_{member};")?;
                writeln!(out, "    for (i = 0; i < in->n_{member}; i++) {{")?;
                if array_items_are_objects(field) {
                    let target = ref_of(field)?;
                    writeln!(
                        out,
                        "      rc = {target}_deepcopy(in->{member}[i], &ret->{member}[i]);"
                    )?;
                    writeln!(out, "      if (rc != 0) {}", fail(&drop, "rc"))?;
                } else if field.ref_name.as_deref() == Some("string") {
                    writeln!(out, "      ret->{member}[i] = strdup(in->{member}[i]);")?;
                    writeln!(
                        out,
                        "      if (ret->{member}[i] == NULL) {}",
                        fail(&drop, "ENOMEM")
                    )?;
                } else {
                    writeln!(out, "      ret->{member}[i] = in->{member}[i];")?;
                }
                writeln!(out, "    }}")?;
                writeln!(out, "  }}")?;
            }
        }
    }

    writeln!(out, "  *out = ret;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_eq(out: &mut String, name: &str, fields: &[&StructField]) -> Result<(), EmitError> {
    writeln!(
        out,
        "int {name}_eq(const struct {name} *a, const struct {name} *b) {{"
    )?;
    writeln!(out, "  if (a == NULL || b == NULL) return a == b;")?;
    for field in fields {
        let member = &field.name;
        match field.kind {
            FieldKind::String => {
                writeln!(
                    out,
                    "  if ((a->{member} == NULL) != (b->{member} == NULL)) return 0;"
                )?;
                writeln!(
                    out,
                    "  if (a->{member} != NULL && strcmp(a->{member}, b->{member}) != 0) return 0;"
                )?;
            }
            FieldKind::Integer | FieldKind::Boolean | FieldKind::Enum | FieldKind::Null => {
                writeln!(out, "  if (a->{member} != b->{member}) return 0;")?;
            }
            FieldKind::Number => {
                writeln!(out, "  if (a->{member} != b->{member}) return 0;")?;
            }
            FieldKind::Object => {
                let target = ref_of(field)?;
                writeln!(out, "  if (!{target}_eq(a->{member}, b->{member})) return 0;")?;
            }
            FieldKind::Array => {
                writeln!(out, "  if (a->n_{member} != b->n_{member}) return 0;")?;
                writeln!(out, "  {{")?;
                writeln!(out, "    size_t i;")?;
                writeln!(out, "    for (i = 0; i < a->n_{member}; i++) {{")?;
                if array_items_are_objects(field) {
                    let target = ref_of(field)?;
                    writeln!(
                        out,
                        "      if (!{target}_eq(a->{member}[i], b->{member}[i])) return 0;"
                    )?;
                } else if field.ref_name.as_deref() == Some("string") {
                    writeln!(
                        out,
                        "      if (strcmp(a->{member}[i], b->{member}[i]) != 0) return 0;"
                    )?;
                } else {
                    writeln!(out, "      if (a->{member}[i] != b->{member}[i]) return 0;")?;
                }
                writeln!(out, "    }}")?;
                writeln!(out, "  }}")?;
            }
        }
    }
    writeln!(out, "  return 1;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_debug(out: &mut String, name: &str, fields: &[&StructField]) -> Result<(), EmitError> {
    writeln!(out, "void {name}_debug(const struct {name} *in, FILE *fp) {{")?;
    writeln!(out, "  if (in == NULL || fp == NULL) return;")?;
    writeln!(out, "  fprintf(fp, \"struct {name} dbg = {{\");")?;
    for field in fields {
        let member = &field.name;
        match field.kind {
            FieldKind::String => {
                writeln!(
                    out,
                    "  fprintf(fp, \" .{member} = \\\"%s\\\",\", in->{member} == NULL ? \"(null)\" : in->{member});"
                )?;
            }
            FieldKind::Integer | FieldKind::Boolean | FieldKind::Null => {
                writeln!(out, "  fprintf(fp, \" .{member} = %d,\", in->{member});")?;
            }
            FieldKind::Number => {
                writeln!(out, "  fprintf(fp, \" .{member} = %g,\", in->{member});")?;
            }
            FieldKind::Enum => {
                writeln!(
                    out,
                    "  fprintf(fp, \" .{member} = %d,\", (int)in->{member});"
                )?;
            }
            FieldKind::Object => {
                writeln!(
                    out,
                    "  fprintf(fp, \" .{member} = %p,\", (const void *)in->{member});"
                )?;
            }
            FieldKind::Array => {
                writeln!(
                    out,
                    "  fprintf(fp, \" .n_{member} = %lu,\", (unsigned long)in->n_{member});"
                )?;
            }
        }
    }
    writeln!(out, "  fprintf(fp, \" }};\\n\");")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_display(out: &mut String, name: &str) -> Result<(), EmitError> {
    writeln!(out, "int {name}_display(const struct {name} *in, FILE *fp) {{")?;
    writeln!(out, "  char *json = NULL;")?;
    writeln!(out, "  int rc;")?;
    writeln!(out)?;
    writeln!(out, "  if (fp == NULL) return EINVAL;")?;
    writeln!(out, "  rc = {name}_to_json(in, &json);")?;
    writeln!(out, "  if (rc != 0) return rc;")?;
    writeln!(out, "  if (fputs(json, fp) == EOF || fputc('\\n', fp) == EOF) {{")?;
    writeln!(out, "    free(json);")?;
    writeln!(out, "    return EIO;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  free(json);")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_union_impl(
    out: &mut String,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    emit_union_from_json_object(out, name, fields)?;
    emit_union_from_json(out, name, fields)?;
    emit_union_to_json(out, name, fields)?;
    emit_union_cleanup(out, name, fields)?;
    Ok(())
}

/// Object dispatch in two tiers: a declared discriminator value first, then
/// required/declared-property scoring. In `oneOf` mode more than one
/// scoring match is ambiguous and rejected.
fn emit_union_from_json_object(
    out: &mut String,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    let object_variants: Vec<(usize, &StructField)> = fields
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.kind == FieldKind::Object)
        .collect();

    writeln!(
        out,
        "int {name}_from_jsonObject(const JSON_Object *obj, struct {name} **out) {{"
    )?;
    writeln!(out, "  struct {name} *ret;")?;
    if !object_variants.is_empty() {
        writeln!(out, "  int rc;")?;
    }
    writeln!(out)?;
    writeln!(out, "  if (obj == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  ret = calloc(1, sizeof *ret);")?;
    writeln!(out, "  if (ret == NULL) return ENOMEM;")?;

    if let Some(disc) = &fields.union_discriminator
        && !object_variants.is_empty()
    {
        writeln!(out)?;
        writeln!(out, "  {{")?;
        writeln!(
            out,
            "    const char *disc = json_object_get_string(obj, \"{}\");",
            c_quote(disc)
        )?;
        writeln!(out, "    if (disc != NULL) {{")?;
        for (idx, field) in &object_variants {
            let value = fields
                .variants
                .get(*idx)
                .and_then(|v| v.discriminator_value.as_deref())
                .unwrap_or(&field.name);
            let target = ref_of(field)?;
            let member = &field.name;
            writeln!(out, "      if (strcmp(disc, \"{}\") == 0) {{", c_quote(value))?;
            writeln!(out, "        rc = {target}_from_jsonObject(obj, &ret->data.{member});")?;
            writeln!(out, "        if (rc != 0) {{ free(ret); return rc; }}")?;
            writeln!(out, "        ret->tag = {name}_tag_{member};")?;
            writeln!(out, "        *out = ret;")?;
            writeln!(out, "        return 0;")?;
            writeln!(out, "      }}")?;
        }
        writeln!(out, "    }}")?;
        writeln!(out, "  }}")?;
    }

    if object_variants.is_empty() {
        writeln!(out, "  free(ret);")?;
        writeln!(out, "  return EINVAL;")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "  {{")?;
    writeln!(out, "    int matches = 0;")?;
    writeln!(out, "    int pick = -1;")?;
    for (slot, (idx, _)) in object_variants.iter().enumerate() {
        let meta = fields.variants.get(*idx);
        let required: Vec<&String> = meta.map(|m| m.required_props.iter().collect()).unwrap_or_default();
        let declared: Vec<&String> = meta.map(|m| m.declared_props.iter().collect()).unwrap_or_default();

        let expr = if !required.is_empty() {
            required
                .iter()
                .map(|p| format!("json_object_has_value(obj, \"{}\")", c_quote(p)))
                .collect::<Vec<_>>()
                .join(" && ")
        } else if !declared.is_empty() {
            declared
                .iter()
                .map(|p| format!("json_object_has_value(obj, \"{}\")", c_quote(p)))
                .collect::<Vec<_>>()
                .join(" || ")
        } else {
            "0".to_string()
        };
        writeln!(out, "    if ({expr}) {{")?;
        writeln!(out, "      matches++;")?;
        writeln!(out, "      if (pick < 0) pick = {slot};")?;
        writeln!(out, "    }}")?;
    }
    writeln!(out, "    if (matches == 0) {{ free(ret); return EINVAL; }}")?;
    if !fields.union_is_anyof {
        writeln!(out, "    if (matches > 1) {{ free(ret); return EINVAL; }}")?;
    }
    writeln!(out, "    switch (pick) {{")?;
    for (slot, (_, field)) in object_variants.iter().enumerate() {
        let target = ref_of(field)?;
        let member = &field.name;
        writeln!(out, "    case {slot}:")?;
        writeln!(out, "      rc = {target}_from_jsonObject(obj, &ret->data.{member});")?;
        writeln!(out, "      if (rc != 0) {{ free(ret); return rc; }}")?;
        writeln!(out, "      ret->tag = {name}_tag_{member};")?;
        writeln!(out, "      break;")?;
    }
    writeln!(out, "    default:")?;
    writeln!(out, "      free(ret);")?;
    writeln!(out, "      return EINVAL;")?;
    writeln!(out, "    }}")?;
    writeln!(out, "  }}")?;
    writeln!(out)?;
    writeln!(out, "  *out = ret;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

/// Value-type dispatch for unions over primitives; objects delegate to
/// `_from_jsonObject`.
fn emit_union_from_json(
    out: &mut String,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    let variant_of = |kind: FieldKind| {
        fields
            .fields
            .iter()
            .find(|f| f.kind == kind)
            .map(|f| f.name.as_str())
    };

    writeln!(out, "int {name}_from_json(const char *json, struct {name} **out) {{")?;
    writeln!(out, "  JSON_Value *root;")?;
    writeln!(out, "  struct {name} *ret;")?;
    writeln!(out, "  int rc;")?;
    writeln!(out)?;
    writeln!(out, "  if (json == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  root = json_parse_string(json);")?;
    writeln!(out, "  if (root == NULL) return EINVAL;")?;
    writeln!(out, "  switch (json_value_get_type(root)) {{")?;
    writeln!(out, "  case JSONObject:")?;
    writeln!(out, "    rc = {name}_from_jsonObject(json_value_get_object(root), out);")?;
    writeln!(out, "    break;")?;

    if let Some(member) = variant_of(FieldKind::String) {
        writeln!(out, "  case JSONString:")?;
        writeln!(out, "    ret = calloc(1, sizeof *ret);")?;
        writeln!(out, "    if (ret == NULL) {{ json_value_free(root); return ENOMEM; }}")?;
        writeln!(out, "    ret->tag = {name}_tag_{member};")?;
        writeln!(out, "    ret->data.{member} = strdup(json_value_get_string(root));")?;
        writeln!(out, "    if (ret->data.{member} == NULL) {{")?;
        writeln!(out, "      free(ret);")?;
        writeln!(out, "      json_value_free(root);")?;
        writeln!(out, "      return ENOMEM;")?;
        writeln!(out, "    }}")?;
        writeln!(out, "    *out = ret;")?;
        writeln!(out, "    rc = 0;")?;
        writeln!(out, "    break;")?;
    }
    if let Some(member) = variant_of(FieldKind::Number).or(variant_of(FieldKind::Integer)) {
        let is_integer = fields
            .fields
            .iter()
            .any(|f| f.kind == FieldKind::Integer && f.name == member);
        let cast = if is_integer { "(int)" } else { "" };
        writeln!(out, "  case JSONNumber:")?;
        writeln!(out, "    ret = calloc(1, sizeof *ret);")?;
        writeln!(out, "    if (ret == NULL) {{ json_value_free(root); return ENOMEM; }}")?;
        writeln!(out, "    ret->tag = {name}_tag_{member};")?;
        writeln!(out, "    ret->data.{member} = {cast}json_value_get_number(root);")?;
        writeln!(out, "    *out = ret;")?;
        writeln!(out, "    rc = 0;")?;
        writeln!(out, "    break;")?;
    }
    if let Some(member) = variant_of(FieldKind::Boolean) {
        writeln!(out, "  case JSONBoolean:")?;
        writeln!(out, "    ret = calloc(1, sizeof *ret);")?;
        writeln!(out, "    if (ret == NULL) {{ json_value_free(root); return ENOMEM; }}")?;
        writeln!(out, "    ret->tag = {name}_tag_{member};")?;
        writeln!(out, "    ret->data.{member} = json_value_get_boolean(root) == 1;")?;
        writeln!(out, "    *out = ret;")?;
        writeln!(out, "    rc = 0;")?;
        writeln!(out, "    break;")?;
    }
    if let Some(member) = variant_of(FieldKind::Null) {
        writeln!(out, "  case JSONNull:")?;
        writeln!(out, "    ret = calloc(1, sizeof *ret);")?;
        writeln!(out, "    if (ret == NULL) {{ json_value_free(root); return ENOMEM; }}")?;
        writeln!(out, "    ret->tag = {name}_tag_{member};")?;
        writeln!(out, "    *out = ret;")?;
        writeln!(out, "    rc = 0;")?;
        writeln!(out, "    break;")?;
    }
    if let Some(member) = variant_of(FieldKind::Array) {
        writeln!(out, "  case JSONArray:")?;
        writeln!(out, "    ret = calloc(1, sizeof *ret);")?;
        writeln!(out, "    if (ret == NULL) {{ json_value_free(root); return ENOMEM; }}")?;
        writeln!(out, "    ret->tag = {name}_tag_{member};")?;
        writeln!(out, "    ret->data.{member} = json_serialize_to_string(root);")?;
        writeln!(out, "    if (ret->data.{member} == NULL) {{")?;
        writeln!(out, "      free(ret);")?;
        writeln!(out, "      json_value_free(root);")?;
        writeln!(out, "      return ENOMEM;")?;
        writeln!(out, "    }}")?;
        writeln!(out, "    *out = ret;")?;
        writeln!(out, "    rc = 0;")?;
        writeln!(out, "    break;")?;
    }

    writeln!(out, "  default:")?;
    writeln!(out, "    rc = EINVAL;")?;
    writeln!(out, "    break;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  json_value_free(root);")?;
    writeln!(out, "  return rc;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

/// Only the active variant is serialized.
fn emit_union_to_json(
    out: &mut String,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    writeln!(out, "int {name}_to_json(const struct {name} *in, char **out) {{")?;
    writeln!(out, "  char *buf = NULL;")?;
    writeln!(out, "  int rc;")?;
    writeln!(out)?;
    writeln!(out, "  if (in == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  switch (in->tag) {{")?;
    for field in &fields.fields {
        let member = &field.name;
        writeln!(out, "  case {name}_tag_{member}:")?;
        match field.kind {
            FieldKind::Object => {
                let target = ref_of(field)?;
                writeln!(out, "    return {target}_to_json(in->data.{member}, out);")?;
            }
            FieldKind::String => {
                writeln!(
                    out,
                    "    rc = coapi_buf_append(&buf, \"\\\"%s\\\"\", in->data.{member});"
                )?;
                writeln!(out, "    break;")?;
            }
            FieldKind::Integer => {
                writeln!(out, "    rc = coapi_buf_append(&buf, \"%d\", in->data.{member});")?;
                writeln!(out, "    break;")?;
            }
            FieldKind::Number => {
                writeln!(out, "    rc = coapi_buf_append(&buf, \"%g\", in->data.{member});")?;
                writeln!(out, "    break;")?;
            }
            FieldKind::Boolean => {
                writeln!(
                    out,
                    "    rc = coapi_buf_append(&buf, \"%s\", in->data.{member} ? \"true\" : \"false\");"
                )?;
                writeln!(out, "    break;")?;
            }
            FieldKind::Null => {
                writeln!(out, "    rc = coapi_buf_append(&buf, \"null\");")?;
                writeln!(out, "    break;")?;
            }
            FieldKind::Array => {
                writeln!(out, "    rc = coapi_buf_append(&buf, \"%s\", in->data.{member});")?;
                writeln!(out, "    break;")?;
            }
            FieldKind::Enum => {
                return Err(EmitError::Unsupported(format!(
                    "enum variant {member:?} in union {name:?}"
                )));
            }
        }
    }
    writeln!(out, "  default:")?;
    writeln!(out, "    return EINVAL;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  if (rc != 0) {{ free(buf); return rc; }}")?;
    writeln!(out, "  *out = buf;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

fn emit_union_cleanup(
    out: &mut String,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    writeln!(out, "void {name}_cleanup(struct {name} *obj) {{")?;
    writeln!(out, "  if (obj == NULL) return;")?;
    writeln!(out, "  switch (obj->tag) {{")?;
    for field in &fields.fields {
        let member = &field.name;
        writeln!(out, "  case {name}_tag_{member}:")?;
        match field.kind {
            FieldKind::Object => {
                let target = ref_of(field)?;
                writeln!(out, "    {target}_cleanup(obj->data.{member});")?;
            }
            FieldKind::String => {
                writeln!(out, "    free((char *)obj->data.{member});")?;
            }
            FieldKind::Array => {
                writeln!(out, "    free(obj->data.{member});")?;
            }
            _ => {}
        }
        writeln!(out, "    break;")?;
    }
    writeln!(out, "  default:")?;
    writeln!(out, "    break;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  free(obj);")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

/// The three specialized `(items, len)` functions of a root-array schema.
fn emit_root_array_impl(
    out: &mut String,
    name: &str,
    fields: &StructFields,
) -> Result<(), EmitError> {
    let Some(item) = fields.fields.first() else {
        return Err(EmitError::Unsupported(format!(
            "root-array schema {name:?} has no item field"
        )));
    };

    if array_items_are_objects(item) {
        let target = ref_of(item)?;
        writeln!(out, "void {name}_cleanup(struct {target} **in, size_t len) {{")?;
        writeln!(out, "  size_t i;")?;
        writeln!(out)?;
        writeln!(out, "  if (in == NULL) return;")?;
        writeln!(out, "  for (i = 0; i < len; i++) {{")?;
        writeln!(out, "    {target}_cleanup(in[i]);")?;
        writeln!(out, "  }}")?;
        writeln!(out, "  free(in);")?;
        writeln!(out, "}}")?;
        writeln!(out)?;

        writeln!(
            out,
            "int {name}_to_json(struct {target} *const *in, size_t len, char **out) {{"
        )?;
        writeln!(out, "  char *buf = NULL;")?;
        writeln!(out, "  size_t i;")?;
        writeln!(out, "  int rc;")?;
        writeln!(out)?;
        writeln!(out, "  if (in == NULL || out == NULL) return EINVAL;")?;
        writeln!(out, "  rc = coapi_buf_append(&buf, \"[\");")?;
        writeln!(out, "  if (rc != 0) {{ free(buf); return rc; }}")?;
        writeln!(out, "  for (i = 0; i < len; i++) {{")?;
        writeln!(out, "    char *item = NULL;")?;
        writeln!(out, "    rc = {target}_to_json(in[i], &item);")?;
        writeln!(out, "    if (rc != 0) {{ free(buf); return rc; }}")?;
        writeln!(
            out,
            "    rc = coapi_buf_append(&buf, \"%s%s\", i == 0 ? \"\" : \",\", item);"
        )?;
        writeln!(out, "    free(item);")?;
        writeln!(out, "    if (rc != 0) {{ free(buf); return rc; }}")?;
        writeln!(out, "  }}")?;
        writeln!(out, "  rc = coapi_buf_append(&buf, \"]\");")?;
        writeln!(out, "  if (rc != 0) {{ free(buf); return rc; }}")?;
        writeln!(out, "  *out = buf;")?;
        writeln!(out, "  return 0;")?;
        writeln!(out, "}}")?;
        writeln!(out)?;

        writeln!(
            out,
            "int {name}_from_json(const char *json, struct {target} ***out, size_t *len) {{"
        )?;
        writeln!(out, "  JSON_Value *root;")?;
        writeln!(out, "  JSON_Array *arr;")?;
        writeln!(out, "  struct {target} **items;")?;
        writeln!(out, "  size_t i;")?;
        writeln!(out, "  size_t count;")?;
        writeln!(out, "  int rc;")?;
        writeln!(out)?;
        writeln!(out, "  if (json == NULL || out == NULL || len == NULL) return EINVAL;")?;
        writeln!(out, "  root = json_parse_string(json);")?;
        writeln!(out, "  if (root == NULL) return EINVAL;")?;
        writeln!(out, "  arr = json_value_get_array(root);")?;
        writeln!(out, "  if (arr == NULL) {{")?;
        writeln!(out, "    json_value_free(root);")?;
        writeln!(out, "    return EINVAL;")?;
        writeln!(out, "  }}")?;
        writeln!(out, "  count = json_array_get_count(arr);")?;
        writeln!(out, "  items = calloc(count ? count : 1, sizeof *items);")?;
        writeln!(out, "  if (items == NULL) {{")?;
        writeln!(out, "    json_value_free(root);")?;
        writeln!(out, "    return ENOMEM;")?;
        writeln!(out, "  }}")?;
        writeln!(out, "  for (i = 0; i < count; i++) {{")?;
        writeln!(
            out,
            "    rc = {target}_from_jsonObject(json_array_get_object(arr, i), &items[i]);"
        )?;
        writeln!(out, "    if (rc != 0) {{")?;
        writeln!(out, "      {name}_cleanup(items, i);")?;
        writeln!(out, "      json_value_free(root);")?;
        writeln!(out, "      return rc;")?;
        writeln!(out, "    }}")?;
        writeln!(out, "  }}")?;
        writeln!(out, "  json_value_free(root);")?;
        writeln!(out, "  *out = items;")?;
        writeln!(out, "  *len = count;")?;
        writeln!(out, "  return 0;")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        return Ok(());
    }

    let item_type = c_item_type(item)?;
    let is_string = item.ref_name.as_deref() == Some("string");

    writeln!(out, "void {name}_cleanup({item_type}*in, size_t len) {{")?;
    if is_string {
        writeln!(out, "  size_t i;")?;
        writeln!(out)?;
        writeln!(out, "  if (in == NULL) return;")?;
        writeln!(out, "  for (i = 0; i < len; i++) {{")?;
        writeln!(out, "    free(in[i]);")?;
        writeln!(out, "  }}")?;
    } else {
        writeln!(out, "  (void)len;")?;
        writeln!(out, "  if (in == NULL) return;")?;
    }
    writeln!(out, "  free(in);")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(
        out,
        "int {name}_to_json(const {item_type}*in, size_t len, char **out) {{"
    )?;
    writeln!(out, "  char *buf = NULL;")?;
    writeln!(out, "  size_t i;")?;
    writeln!(out, "  int rc;")?;
    writeln!(out)?;
    writeln!(out, "  if (in == NULL || out == NULL) return EINVAL;")?;
    writeln!(out, "  rc = coapi_buf_append(&buf, \"[\");")?;
    writeln!(out, "  if (rc != 0) {{ free(buf); return rc; }}")?;
    writeln!(out, "  for (i = 0; i < len; i++) {{")?;
    match item.ref_name.as_deref() {
        Some("string") => {
            writeln!(
                out,
                "    rc = coapi_buf_append(&buf, \"%s\\\"%s\\\"\", i == 0 ? \"\" : \",\", in[i]);"
            )?;
        }
        Some("integer") => {
            writeln!(
                out,
                "    rc = coapi_buf_append(&buf, \"%s%d\", i == 0 ? \"\" : \",\", in[i]);"
            )?;
        }
        Some("number") => {
            writeln!(
                out,
                "    rc = coapi_buf_append(&buf, \"%s%g\", i == 0 ? \"\" : \",\", in[i]);"
            )?;
        }
        _ => {
            writeln!(
                out,
                "    rc = coapi_buf_append(&buf, \"%s%s\", i == 0 ? \"\" : \",\", in[i] ? \"true\" : \"false\");"
            )?;
        }
    }
    writeln!(out, "    if (rc != 0) {{ free(buf); return rc; }}")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  rc = coapi_buf_append(&buf, \"]\");")?;
    writeln!(out, "  if (rc != 0) {{ free(buf); return rc; }}")?;
    writeln!(out, "  *out = buf;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(
        out,
        "int {name}_from_json(const char *json, {item_type}**out, size_t *len) {{"
    )?;
    writeln!(out, "  JSON_Value *root;")?;
    writeln!(out, "  JSON_Array *arr;")?;
    writeln!(out, "  {item_type}*items;")?;
    writeln!(out, "  size_t i;")?;
    writeln!(out, "  size_t count;")?;
    writeln!(out)?;
    writeln!(out, "  if (json == NULL || out == NULL || len == NULL) return EINVAL;")?;
    writeln!(out, "  root = json_parse_string(json);")?;
    writeln!(out, "  if (root == NULL) return EINVAL;")?;
    writeln!(out, "  arr = json_value_get_array(root);")?;
    writeln!(out, "  if (arr == NULL) {{")?;
    writeln!(out, "    json_value_free(root);")?;
    writeln!(out, "    return EINVAL;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  count = json_array_get_count(arr);")?;
    writeln!(out, "  items = calloc(count ? count : 1, sizeof *items);")?;
    writeln!(out, "  if (items == NULL) {{")?;
    writeln!(out, "    json_value_free(root);")?;
    writeln!(out, "    return ENOMEM;")?;
    writeln!(out, "  }}")?;
    writeln!(out, "  for (i = 0; i < count; i++) {{")?;
    match item.ref_name.as_deref() {
        Some("string") => {
            writeln!(out, "    const char *item = json_array_get_string(arr, i);")?;
            writeln!(out, "    if (item == NULL) {{")?;
            writeln!(out, "      {name}_cleanup(items, i);")?;
            writeln!(out, "      json_value_free(root);")?;
            writeln!(out, "      return EINVAL;")?;
            writeln!(out, "    }}")?;
            writeln!(out, "    items[i] = strdup(item);")?;
            writeln!(out, "    if (items[i] == NULL) {{")?;
            writeln!(out, "      {name}_cleanup(items, i);")?;
            writeln!(out, "      json_value_free(root);")?;
            writeln!(out, "      return ENOMEM;")?;
            writeln!(out, "    }}")?;
        }
        Some("integer") => {
            writeln!(out, "    items[i] = (int)json_array_get_number(arr, i);")?;
        }
        Some("number") => {
            writeln!(out, "    items[i] = json_array_get_number(arr, i);")?;
        }
        _ => {
            writeln!(out, "    items[i] = json_array_get_boolean(arr, i) == 1;")?;
        }
    }
    writeln!(out, "  }}")?;
    writeln!(out, "  json_value_free(root);")?;
    writeln!(out, "  *out = items;")?;
    writeln!(out, "  *len = count;")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coapi_core::UnionVariantMeta;

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
    fn emit_source_enum_maps_strings_with_unknown_default() {
        //* Given
        let types = haze_types();

        //* When
        let source = emit_source(&types, "api").expect("source should emit");

        //* Then
        assert!(source.contains("int Tank_from_str(const char *str, enum Tank *out)"));
        assert!(source.contains("if (strcmp(str, \"BIG\") == 0)"));
        assert!(source.contains("if (strcasecmp(str, \"BIG\") == 0)"));
        assert!(source.contains("*out = Tank_UNKNOWN;"));
        assert!(source.contains("char *Tank_to_str(enum Tank value)"));
        assert!(source.contains("case Tank_BIG:\n    return strdup(\"BIG\");"));
        assert!(
            source.contains("default:\n    return strdup(\"UNKNOWN\");"),
            "the UNKNOWN sentinel is the default case"
        );
    }

    #[test]
    fn emit_source_struct_codec_has_key_colon_space_format() {
        //* Given
        let types = haze_types();

        //* When
        let source = emit_source(&types, "api").expect("source should emit");

        //* Then
        assert!(
            source.contains("\"%s\\\"bzr\\\": \\\"%s\\\"\""),
            "keys are emitted as \\\"key\\\": value"
        );
        assert!(source.contains("int HazE_from_jsonObject(const JSON_Object *obj, struct HazE **out)"));
        assert!(
            source.contains("if (val == NULL) { HazE_cleanup(ret); return EINVAL; }"),
            "missing required field returns EINVAL"
        );
        assert!(source.contains("rc = Tank_from_str(val, &ret->tank);"));
        assert!(source.contains("json_parse_string"), "uses the parson entry points");
        assert!(source.contains("json_value_free(root);"));
    }

    #[test]
    fn emit_source_eq_handles_null_pairs_explicitly() {
        //* Given
        let types = haze_types();

        //* When
        let source = emit_source(&types, "api").expect("source should emit");

        //* Then
        assert!(
            source.contains("if (a == NULL || b == NULL) return a == b;"),
            "NULL/NULL compares equal, NULL/non-NULL unequal"
        );
        assert!(source.contains("strcmp(a->bzr, b->bzr)"));
    }

    #[test]
    fn emit_source_validation_returns_erange() {
        //* Given
        let mut fields = StructFields::new();
        let mut age = StructField::new("age", FieldKind::Integer);
        age.constraints.minimum = Some(0.0);
        age.constraints.maximum = Some(120.0);
        fields.push(age).expect("push age");
        let mut nick = StructField::new("nick", FieldKind::String);
        nick.constraints.min_length = Some(2);
        nick.constraints.pattern = Some("^pet".to_string());
        fields.push(nick).expect("push nick");
        let types = vec![TypeDefinition::Struct {
            name: "Person".to_string(),
            fields,
        }];

        //* When
        let source = emit_source(&types, "api").expect("source should emit");

        //* Then
        assert!(source.contains("if (ret->age < 0) { Person_cleanup(ret); return ERANGE; }"));
        assert!(source.contains("if (ret->age > 120) { Person_cleanup(ret); return ERANGE; }"));
        assert!(source.contains("if (strlen(val) < 2) { Person_cleanup(ret); return ERANGE; }"));
        assert!(source.contains("coapi_pattern_match(\"^pet\", val)"));
        assert!(source.contains("static int coapi_pattern_match"));
    }

    #[test]
    fn emit_source_union_dispatches_on_discriminator_then_scoring() {
        //* Given
        let mut dog_fields = StructFields::new();
        dog_fields
            .push(StructField::new("kind", FieldKind::String).required())
            .expect("push kind");
        dog_fields
            .push(StructField::new("bark", FieldKind::String).required())
            .expect("push bark");
        let mut cat_fields = StructFields::new();
        cat_fields
            .push(StructField::new("kind", FieldKind::String).required())
            .expect("push kind");
        cat_fields
            .push(StructField::new("meow", FieldKind::String).required())
            .expect("push meow");

        let mut union_fields = StructFields::new();
        union_fields
            .push(StructField::new("dog", FieldKind::Object).ref_name("Dog"))
            .expect("push dog");
        union_fields
            .push(StructField::new("cat", FieldKind::Object).ref_name("Cat"))
            .expect("push cat");
        union_fields.is_union = true;
        union_fields.union_discriminator = Some("kind".to_string());
        union_fields.variants = vec![
            UnionVariantMeta {
                required_props: vec!["kind".to_string(), "bark".to_string()],
                declared_props: vec!["kind".to_string(), "bark".to_string()],
                discriminator_value: Some("dog".to_string()),
                ..Default::default()
            },
            UnionVariantMeta {
                required_props: vec!["kind".to_string(), "meow".to_string()],
                declared_props: vec!["kind".to_string(), "meow".to_string()],
                discriminator_value: Some("cat".to_string()),
                ..Default::default()
            },
        ];

        let types = vec![
            TypeDefinition::Struct {
                name: "Dog".to_string(),
                fields: dog_fields,
            },
            TypeDefinition::Struct {
                name: "Cat".to_string(),
                fields: cat_fields,
            },
            TypeDefinition::Struct {
                name: "Pet".to_string(),
                fields: union_fields,
            },
        ];

        //* When
        let source = emit_source(&types, "api").expect("source should emit");

        //* Then
        assert!(source.contains("const char *disc = json_object_get_string(obj, \"kind\");"));
        assert!(source.contains("if (strcmp(disc, \"dog\") == 0)"));
        assert!(source.contains("ret->tag = Pet_tag_dog;"));
        assert!(
            source.contains("if (matches > 1) { free(ret); return EINVAL; }"),
            "oneOf mode rejects ambiguity"
        );
        assert!(source.contains("case Pet_tag_dog:\n    return Dog_to_json(in->data.dog, out);"));
        assert!(source.contains("Dog_cleanup(obj->data.dog);"));
    }

    #[test]
    fn emit_source_root_array_generates_len_family() {
        //* Given
        let mut item_fields = StructFields::new();
        item_fields
            .push(StructField::new("name", FieldKind::String))
            .expect("push name");
        let mut root = StructFields::new();
        root.push(StructField::new("items", FieldKind::Array).ref_name("Pet"))
            .expect("push items");
        root.root_array = true;
        let types = vec![
            TypeDefinition::Struct {
                name: "Pet".to_string(),
                fields: item_fields,
            },
            TypeDefinition::Struct {
                name: "PetList".to_string(),
                fields: root,
            },
        ];

        //* When
        let source = emit_source(&types, "api").expect("source should emit");

        //* Then
        assert!(source.contains("void PetList_cleanup(struct Pet **in, size_t len)"));
        assert!(source.contains("int PetList_to_json(struct Pet *const *in, size_t len, char **out)"));
        assert!(source.contains(
            "int PetList_from_json(const char *json, struct Pet ***out, size_t *len)"
        ));
    }
}
