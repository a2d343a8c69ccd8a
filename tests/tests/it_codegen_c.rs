//! Integration tests for the C data-class generator.

fn haze_header() -> &'static str {
    "enum Tank { BIG, SMALL, UNKNOWN = -1 };\n\
     struct HazE { const char *bzr; enum Tank tank; };\n"
}

fn types_from(source: &str) -> Vec<coapi::TypeDefinition> {
    let tokens = coapi::tokenize(source);
    coapi::extract_types(&tokens).expect("extraction should succeed")
}

#[test]
fn haze_header_generates_codec_and_equality_family() {
    //* Given
    let types = types_from(haze_header());

    //* When
    let header = coapi::emit_header(&types, "generated_client").expect("header emits");
    let source = coapi::emit_source(&types, "generated_client").expect("source emits");

    //* Then
    assert!(header.contains("struct HazE {\n  const char *bzr;\n  enum Tank tank;\n};"));
    assert!(header.contains("enum Tank {\n  Tank_UNKNOWN = 0,\n  Tank_BIG,\n  Tank_SMALL\n};"));

    // The codec maps {bzr: "x", tank: BIG} to {"bzr": "x","tank": "BIG"}.
    assert!(source.contains("\"%s\\\"bzr\\\": \\\"%s\\\"\""));
    assert!(source.contains("\"%s\\\"tank\\\": \\\"%s\\\"\""));
    assert!(source.contains("char *Tank_to_str(enum Tank value)"));
    assert!(source.contains("return strdup(\"BIG\");"));
    assert!(source.contains("int HazE_from_json(const char *json, struct HazE **out)"));
    assert!(source.contains("rc = Tank_from_str(val, &ret->tank);"));

    // Equality treats NULL/NULL as equal and NULL/non-NULL as unequal.
    assert!(source.contains("int HazE_eq(const struct HazE *a, const struct HazE *b)"));
    assert!(source.contains("if (a == NULL || b == NULL) return a == b;"));
}

#[test]
fn write_c_files_emits_the_pair_into_a_directory() {
    //* Given
    let dir = tempfile::tempdir().expect("tempdir");
    let types = types_from(haze_header());

    //* When
    let (header_path, source_path) =
        coapi::write_c_files(&types, dir.path(), "generated_client").expect("files written");

    //* Then
    assert_eq!(
        header_path,
        dir.path().join("generated_client.h"),
        "header lands next to the source"
    );
    let header = std::fs::read_to_string(&header_path).expect("read header");
    let source = std::fs::read_to_string(&source_path).expect("read source");
    assert!(header.starts_with("#ifndef GENERATED_CLIENT_H\n"));
    assert!(source.contains("#include \"generated_client.h\""));
}

#[test]
fn discriminated_union_schema_generates_two_tier_dispatch() {
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
                "oneOf": [{"$ref": "#/$defs/Dog"}, {"$ref": "#/$defs/Cat"}],
                "discriminator": {
                    "propertyName": "kind",
                    "mapping": {"dog": "#/$defs/Dog", "cat": "#/$defs/Cat"}
                }
            }
        }
    });
    let types = coapi::load_schemas(&doc).expect("schemas load");

    //* When
    let header = coapi::emit_header(&types, "api").expect("header emits");
    let source = coapi::emit_source(&types, "api").expect("source emits");

    //* Then
    assert!(header.contains("enum Pet_tag"));
    assert!(header.contains("struct Dog *dog;"));
    assert!(header.contains("struct Cat *cat;"));

    // Tier one: the discriminator value picks the variant directly.
    assert!(source.contains("const char *disc = json_object_get_string(obj, \"kind\");"));
    assert!(source.contains("if (strcmp(disc, \"dog\") == 0)"));
    assert!(source.contains("ret->tag = Pet_tag_dog;"));

    // Tier two: required-property scoring; oneOf rejects ambiguity.
    assert!(source.contains("json_object_has_value(obj, \"bark\")"));
    assert!(source.contains("if (matches == 0) { free(ret); return EINVAL; }"));
    assert!(source.contains("if (matches > 1) { free(ret); return EINVAL; }"));

    // Only the active variant is serialized.
    assert!(source.contains("case Pet_tag_dog:\n    return Dog_to_json(in->data.dog, out);"));
}

#[test]
fn validation_constraints_emit_erange_checks() {
    //* Given
    let doc = serde_json::json!({
        "$defs": {
            "Profile": {
                "type": "object",
                "required": ["nick"],
                "properties": {
                    "nick": {"type": "string", "minLength": 2, "maxLength": 16, "pattern": "^pet"},
                    "age": {"type": "integer", "minimum": 0, "maximum": 120}
                }
            }
        }
    });
    let types = coapi::load_schemas(&doc).expect("schemas load");

    //* When
    let source = coapi::emit_source(&types, "api").expect("source emits");

    //* Then
    assert!(source.contains("if (strlen(val) < 2) { Profile_cleanup(ret); return ERANGE; }"));
    assert!(source.contains("if (strlen(val) > 16) { Profile_cleanup(ret); return ERANGE; }"));
    assert!(source.contains("if (!coapi_pattern_match(\"^pet\", val)) { Profile_cleanup(ret); return ERANGE; }"));
    assert!(source.contains("if (ret->age < 0) { Profile_cleanup(ret); return ERANGE; }"));
    assert!(source.contains("if (ret->age > 120) { Profile_cleanup(ret); return ERANGE; }"));
    assert!(
        source.contains("if (val == NULL) { Profile_cleanup(ret); return EINVAL; }"),
        "missing required fields return EINVAL"
    );
}

#[test]
fn root_array_schema_generates_items_len_functions() {
    //* Given
    let doc = serde_json::json!({
        "$defs": {
            "Pet": {"type": "object", "properties": {"name": {"type": "string"}}},
            "PetList": {"type": "array", "items": {"$ref": "#/$defs/Pet"}}
        }
    });
    let types = coapi::load_schemas(&doc).expect("schemas load");

    //* When
    let header = coapi::emit_header(&types, "api").expect("header emits");
    let source = coapi::emit_source(&types, "api").expect("source emits");

    //* Then
    assert!(header.contains(
        "extern int PetList_from_json(const char *json, struct Pet ***out, size_t *len);"
    ));
    assert!(header.contains(
        "extern int PetList_to_json(struct Pet *const *in, size_t len, char **out);"
    ));
    assert!(header.contains("extern void PetList_cleanup(struct Pet **in, size_t len);"));
    assert!(source.contains("count = json_array_get_count(arr);"));
}

#[test]
fn generated_output_is_deterministic() {
    //* Given
    let types = types_from(haze_header());

    //* When
    let first = coapi::emit_source(&types, "api").expect("first emission");
    let second = coapi::emit_source(&types, "api").expect("second emission");

    //* Then
    assert_eq!(first, second, "same model, byte-identical output");
}
