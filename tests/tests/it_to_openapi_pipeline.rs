//! Integration tests for the C-source → OpenAPI pipeline.

use std::ops::ControlFlow;
use std::path::Path;

use pretty_assertions::assert_eq;

fn write_file(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("write source file");
}

#[test]
fn scan_annotated_route_builds_path_parameter_and_response() {
    //* Given
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(
        dir.path(),
        "pets.c",
        "/**\n\
         \x20* @route GET /pets/{id}\n\
         \x20* @param id [in:path][required] Pet ID\n\
         \x20* @return 200 [contentType:application/json] Single pet\n\
         \x20*/\n\
         int get_pet(void) { return 0; }\n",
    );

    //* When
    let mut spec = coapi::scan_dir(dir.path()).expect("scan should succeed");
    coapi::ensure_info_defaults(&mut spec, "pets");
    let json = coapi::emit_json(&spec).expect("emission should succeed");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    //* Then
    let op = &value["paths"]["/pets/{id}"]["get"];
    assert_eq!(op["parameters"][0]["name"], "id");
    assert_eq!(op["parameters"][0]["in"], "path");
    assert_eq!(op["parameters"][0]["required"], true);
    let response = &op["responses"]["200"];
    assert_eq!(response["description"], "Single pet");
    assert!(
        response["content"]["application/json"].is_object(),
        "content type from the return attribute"
    );
}

#[test]
fn scanning_twice_yields_byte_identical_documents() {
    //* Given
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(
        dir.path(),
        "types.h",
        "enum Mood { HAPPY, GRUMPY };\n\
         struct Pet { const char *name; enum Mood mood; };\n",
    );
    write_file(
        dir.path(),
        "routes.c",
        "/**\n\
         \x20* @route GET /pets\n\
         \x20* @tag pets\n\
         \x20* @return 200 [contentType:application/json][itemSchema:Pet] Every pet\n\
         \x20*/\n",
    );

    //* When
    let emit = || {
        let mut spec = coapi::scan_dir(dir.path()).expect("scan should succeed");
        coapi::ensure_info_defaults(&mut spec, "pets");
        coapi::emit_json(&spec).expect("emission should succeed")
    };
    let first = emit();
    let second = emit();

    //* Then
    assert_eq!(first, second, "unchanged tree must emit identical bytes");
}

#[test]
fn registering_the_same_schema_across_files_keeps_one_entry() {
    //* Given
    let dir = tempfile::tempdir().expect("tempdir");
    let definition = "struct Pet { const char *name; };\n";
    write_file(dir.path(), "a.h", definition);
    write_file(dir.path(), "b.h", definition);
    write_file(dir.path(), "c.h", definition);

    //* When
    let mut spec = coapi::scan_dir(dir.path()).expect("scan should succeed");
    coapi::ensure_info_defaults(&mut spec, "pets");
    let json = coapi::emit_json(&spec).expect("emission should succeed");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    //* Then
    let schemas = value["components"]["schemas"]
        .as_object()
        .expect("schemas object");
    assert_eq!(schemas.len(), 1, "first registration wins, duplicates skipped");
    assert!(schemas.contains_key("Pet"));
}

#[test]
fn conditional_include_scan_reports_only_the_live_branch() {
    //* Given
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(dir.path(), "a.h", "/* a */\n");
    write_file(dir.path(), "b.h", "/* b */\n");
    let source = "#ifdef FOO\n#include \"a.h\"\n#else\n#include \"b.h\"\n#endif\n";
    let mut ctx = coapi::PreprocContext::new();
    let mut seen: Vec<String> = Vec::new();

    //* When
    coapi::scan_source(&mut ctx, source, Some(dir.path()), &mut |inc| {
        seen.push(inc.spelled.clone());
        ControlFlow::Continue(())
    })
    .expect("scan should succeed");

    //* Then
    assert_eq!(
        seen,
        vec!["b.h".to_string()],
        "with FOO undefined only b.h resolves"
    );
}

#[test]
fn global_metadata_and_servers_reach_the_document_root() {
    //* Given
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(
        dir.path(),
        "api.c",
        "/**\n\
         \x20* @infoTitle Pet Store\n\
         \x20* @infoVersion 2.0.0\n\
         \x20* @license [identifier:Apache-2.0] Apache 2.0\n\
         \x20* @server https://{region}.example.com/v1 Production\n\
         \x20* @serverVar region [default:eu][enum:eu,us] Deployment region\n\
         \x20* @tagMeta pets [summary:Pet operations][kind:nav] Everything about pets\n\
         \x20*/\n",
    );

    //* When
    let spec = coapi::scan_dir(dir.path()).expect("scan should succeed");
    let json = coapi::emit_json(&spec).expect("emission should succeed");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    //* Then
    assert_eq!(value["info"]["title"], "Pet Store");
    assert_eq!(value["info"]["version"], "2.0.0");
    assert_eq!(value["info"]["license"]["identifier"], "Apache-2.0");
    let server = &value["servers"][0];
    assert_eq!(server["url"], "https://{region}.example.com/v1");
    assert_eq!(server["variables"]["region"]["default"], "eu");
    assert_eq!(
        value["tags"][0]["summary"],
        "Pet operations",
        "tagMeta fills tag metadata"
    );
}

#[test]
fn webhook_blocks_land_under_webhooks() {
    //* Given
    let dir = tempfile::tempdir().expect("tempdir");
    write_file(
        dir.path(),
        "hooks.c",
        "/**\n\
         \x20* @webhook POST newPet\n\
         \x20* @operationId notifyNewPet\n\
         \x20* @return 200 Receipt acknowledged\n\
         \x20*/\n",
    );

    //* When
    let spec = coapi::scan_dir(dir.path()).expect("scan should succeed");
    let json = coapi::emit_json(&spec).expect("emission should succeed");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    //* Then
    let hook = &value["webhooks"]["newPet"]["post"];
    assert_eq!(hook["operationId"], "notifyNewPet");
    assert!(value["paths"].as_object().expect("paths").is_empty());
}
