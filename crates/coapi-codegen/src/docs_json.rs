//! Per-operation example snippet catalog.
//!
//! Walks a document's paths and produces one C call-site snippet per
//! operation. Import lines and the `main` wrapper are optional so the
//! snippets can be embedded into larger documents.

use coapi_core::{OpenApi, Operation};

use crate::error::EmitError;

/// Catalog rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocsOptions {
    /// Skip the `#include` lines.
    pub no_imports: bool,
    /// Skip the `int main(void)` wrapper.
    pub no_wrapping: bool,
}

/// Builds the snippet catalog for every operation in the document.
pub fn emit_docs_json(document: &OpenApi, options: DocsOptions) -> Result<String, EmitError> {
    let mut entries = Vec::new();
    for (route, item) in &document.paths {
        let slots: [(&str, Option<&Operation>); 9] = [
            ("GET", item.get.as_ref()),
            ("PUT", item.put.as_ref()),
            ("POST", item.post.as_ref()),
            ("DELETE", item.delete.as_ref()),
            ("OPTIONS", item.options.as_ref()),
            ("HEAD", item.head.as_ref()),
            ("PATCH", item.patch.as_ref()),
            ("TRACE", item.trace.as_ref()),
            ("QUERY", item.query.as_ref()),
        ];
        for (verb, op) in slots {
            if let Some(op) = op {
                entries.push(entry_for(route, verb, op, options));
            }
        }
        if let Some(extra) = &item.additional_operations {
            for (verb, op) in extra {
                entries.push(entry_for(route, verb, op, options));
            }
        }
    }

    let catalog = serde_json::json!({ "operations": entries });
    let mut text = serde_json::to_string_pretty(&catalog)?;
    text.push('\n');
    Ok(text)
}

fn entry_for(
    route: &str,
    verb: &str,
    op: &Operation,
    options: DocsOptions,
) -> serde_json::Value {
    let call_name = op
        .operation_id
        .clone()
        .unwrap_or_else(|| derive_call_name(verb, route));

    let mut body = String::new();
    if let Some(summary) = &op.summary {
        body.push_str(&format!("/* {summary} */\n"));
    }
    body.push_str(&format!("rc = {call_name}(/* ... */);\n"));

    let mut snippet = String::new();
    if !options.no_imports {
        snippet.push_str("#include <stdio.h>\n\n#include \"generated_client.h\"\n\n");
    }
    if options.no_wrapping {
        snippet.push_str(&body);
    } else {
        snippet.push_str("int main(void) {\n  int rc;\n\n");
        for line in body.lines() {
            snippet.push_str("  ");
            snippet.push_str(line);
            snippet.push('\n');
        }
        snippet.push_str("  return rc;\n}\n");
    }

    serde_json::json!({
        "method": verb,
        "path": route,
        "operationId": op.operation_id,
        "summary": op.summary,
        "deprecated": op.deprecated.unwrap_or(false),
        "snippet": snippet,
    })
}

/// A C identifier derived from the verb and route template.
fn derive_call_name(verb: &str, route: &str) -> String {
    let mut name = verb.to_lowercase();
    for c in route.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coapi_core::{DocMetadata, Spec, docmeta::RouteDoc};

    fn sample_document() -> OpenApi {
        let mut spec = Spec::new();
        let mut meta = DocMetadata::new();
        meta.route = Some(RouteDoc {
            verb: Some("GET".to_string()),
            path: "/pets/{id}".to_string(),
            webhook: false,
        });
        meta.operation_id = Some("getPet".to_string());
        meta.summary = Some("Fetch one pet".to_string());
        spec.add_operation(&meta).expect("operation aggregates");
        spec.document
    }

    #[test]
    fn emit_docs_json_lists_operations_with_snippets() {
        //* Given
        let document = sample_document();

        //* When
        let text = emit_docs_json(&document, DocsOptions::default()).expect("catalog emits");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");

        //* Then
        let ops = value["operations"].as_array().expect("operations array");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0]["method"], "GET");
        assert_eq!(ops[0]["path"], "/pets/{id}");
        assert_eq!(ops[0]["operationId"], "getPet");
        let snippet = ops[0]["snippet"].as_str().expect("snippet text");
        assert!(snippet.contains("#include \"generated_client.h\""));
        assert!(snippet.contains("int main(void)"));
        assert!(snippet.contains("rc = getPet(/* ... */);"));
    }

    #[test]
    fn emit_docs_json_flags_drop_imports_and_wrapping() {
        //* Given
        let document = sample_document();

        //* When
        let text = emit_docs_json(
            &document,
            DocsOptions {
                no_imports: true,
                no_wrapping: true,
            },
        )
        .expect("catalog emits");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");

        //* Then
        let snippet = value["operations"][0]["snippet"].as_str().expect("snippet");
        assert!(!snippet.contains("#include"), "--no-imports drops includes");
        assert!(!snippet.contains("int main"), "--no-wrapping drops the wrapper");
        assert!(snippet.contains("rc = getPet(/* ... */);"));
    }
}
