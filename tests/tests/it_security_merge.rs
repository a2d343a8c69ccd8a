//! Integration tests for security-scheme merging across files.

use coapi::Spec;

fn apply_block(spec: &mut Spec, block: &str) -> Result<(), coapi::Error> {
    let meta = coapi::parse_block(block).expect("block should parse");
    spec.apply_global_meta(&meta)?;
    spec.apply_doc_security(&meta)
}

#[test]
fn disjoint_flows_for_one_scheme_merge_into_both() {
    //* Given
    let first = "/**\n\
                 \x20* @securityScheme petAuth [type:oauth2][flow:password]\
                 [tokenUrl:https://auth.example.com/token][scopes:read=Read access]\n\
                 \x20*/";
    let second = "/**\n\
                  \x20* @securityScheme petAuth [type:oauth2][flow:clientCredentials]\
                  [tokenUrl:https://auth.example.com/token][scopes:write=Write access]\n\
                  \x20*/";
    let mut spec = Spec::new();

    //* When
    apply_block(&mut spec, first).expect("first file merges");
    apply_block(&mut spec, second).expect("second file merges");

    //* Then
    let json = coapi::emit_json(&spec).expect("emission succeeds");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    let flows = &value["components"]["securitySchemes"]["petAuth"]["flows"];
    assert!(
        flows["password"].is_object(),
        "first file's flow survives the merge"
    );
    assert!(
        flows["clientCredentials"].is_object(),
        "second file's flow is merged in"
    );
    assert_eq!(flows["password"]["scopes"]["read"], "Read access");
    assert_eq!(flows["clientCredentials"]["scopes"]["write"], "Write access");
}

#[test]
fn conflicting_token_urls_for_one_flow_are_rejected() {
    //* Given
    let first = "/** @securityScheme petAuth [type:oauth2][flow:password]\
                 [tokenUrl:https://auth.example.com/token] */";
    let second = "/** @securityScheme petAuth [type:oauth2][flow:password]\
                  [tokenUrl:https://elsewhere.example.com/token] */";
    let mut spec = Spec::new();
    apply_block(&mut spec, first).expect("first file merges");

    //* When
    let result = apply_block(&mut spec, second);

    //* Then
    assert!(
        matches!(result, Err(coapi::Error::Conflict { .. })),
        "a differing tokenUrl must be a conflict"
    );
}

#[test]
fn scheme_type_disagreement_is_rejected() {
    //* Given
    let first = "/** @securityScheme auth [type:http][scheme:bearer] */";
    let second = "/** @securityScheme auth [type:apiKey][in:header][name:X-Key] */";
    let mut spec = Spec::new();
    apply_block(&mut spec, first).expect("first file merges");

    //* When
    let result = apply_block(&mut spec, second);

    //* Then
    assert!(
        matches!(result, Err(coapi::Error::Conflict { .. })),
        "mismatched scheme types must be a conflict"
    );
}

#[test]
fn operation_level_security_requirements_attach_to_the_operation() {
    //* Given
    let block = "/**\n\
                 \x20* @route DELETE /pets/{id}\n\
                 \x20* @security petAuth write\n\
                 \x20* @return 204 Deleted\n\
                 \x20*/";
    let mut spec = Spec::new();
    let meta = coapi::parse_block(block).expect("block should parse");

    //* When
    spec.add_operation(&meta).expect("operation aggregates");

    //* Then
    let op = spec
        .document
        .paths
        .get("/pets/{id}")
        .and_then(|item| item.delete.as_ref())
        .expect("DELETE operation");
    let security = op.security.as_ref().expect("security requirements");
    assert_eq!(security.len(), 1);
    assert_eq!(
        security[0].get("petAuth").map(Vec::as_slice),
        Some(&["write".to_string()][..])
    );
}
