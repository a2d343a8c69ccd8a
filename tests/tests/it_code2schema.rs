//! Integration tests for deriving JSON Schema from C headers and loading
//! it back.

#[test]
fn header_types_translate_to_schema_objects() {
    //* Given
    let header = "enum Tank { BIG, SMALL, UNKNOWN = -1 };\n\
                  struct HazE { const char *bzr; enum Tank tank; };\n\
                  struct Shelf {\n\
                      struct HazE **items;\n\
                      size_t n_items;\n\
                      double weight;\n\
                      _Bool open;\n\
                  };\n";
    let tokens = coapi::tokenize(header);
    let types = coapi::extract_types(&tokens).expect("extraction succeeds");

    //* When
    let mut schemas = serde_json::Map::new();
    for def in &types {
        let value =
            serde_json::to_value(coapi::schema_from_typedef(def)).expect("schema serializes");
        schemas.insert(def.name().to_string(), value);
    }

    //* Then
    assert_eq!(schemas["Tank"]["type"], "string");
    assert_eq!(schemas["Tank"]["enum"], serde_json::json!(["BIG", "SMALL"]));
    assert_eq!(schemas["HazE"]["type"], "object");
    assert_eq!(
        schemas["HazE"]["properties"]["tank"]["$ref"],
        "#/components/schemas/Tank"
    );
    assert_eq!(
        schemas["Shelf"]["properties"]["items"]["items"]["$ref"],
        "#/components/schemas/HazE"
    );
    assert_eq!(schemas["Shelf"]["properties"]["weight"]["type"], "number");
    assert_eq!(schemas["Shelf"]["properties"]["open"]["type"], "boolean");
}

#[test]
fn derived_schema_loads_back_with_the_same_shape() {
    //* Given
    let header = "enum Mood { HAPPY, GRUMPY };\n\
                  struct Pet { const char *name; enum Mood mood; int age; };\n";
    let tokens = coapi::tokenize(header);
    let types = coapi::extract_types(&tokens).expect("extraction succeeds");
    let mut schemas = serde_json::Map::new();
    for def in &types {
        let value =
            serde_json::to_value(coapi::schema_from_typedef(def)).expect("schema serializes");
        schemas.insert(def.name().to_string(), value);
    }
    let doc = serde_json::json!({ "components": { "schemas": schemas } });

    //* When
    let reloaded = coapi::load_schemas(&doc).expect("derived schema loads");

    //* Then
    let names: Vec<&str> = reloaded.iter().map(|d| d.name()).collect();
    assert!(names.contains(&"Mood") && names.contains(&"Pet"));
    let pet = reloaded
        .iter()
        .find_map(|d| match d {
            coapi::TypeDefinition::Struct { name, fields } if name == "Pet" => Some(fields),
            _ => None,
        })
        .expect("Pet struct");
    assert!(
        pet.get("mood").is_some_and(|f| f.ref_name.as_deref() == Some("Mood")),
        "the enum reference survives the round trip"
    );
    assert!(pet.get("age").is_some(), "scalar fields survive");
}

#[test]
fn derived_schema_feeds_the_c_generator_again() {
    //* Given
    let header = "struct Pet { const char *name; int age; };\n";
    let tokens = coapi::tokenize(header);
    let types = coapi::extract_types(&tokens).expect("extraction succeeds");

    //* When
    let regenerated = coapi::emit_header(&types, "roundtrip").expect("header emits");

    //* Then
    assert!(regenerated.contains("struct Pet {\n  const char *name;\n  int age;\n};"));
}
