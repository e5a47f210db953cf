// gemini-mcp - OpenAPI schema contract test

use utoipa::OpenApi;

#[test]
fn openapi_schema_is_valid_json() {
    let schema = serde_json::to_string_pretty(&gemini_mcp::ApiDoc::openapi())
        .expect("OpenAPI schema should serialize to JSON");
    assert!(!schema.is_empty(), "Schema should not be empty");
}

#[test]
fn openapi_schema_documents_rest_facade() {
    let schema = serde_json::to_string_pretty(&gemini_mcp::ApiDoc::openapi())
        .expect("OpenAPI schema should serialize to JSON");
    for path in ["/health", "/generate", "/chat", "/analyze", "/models"] {
        assert!(schema.contains(path), "Schema should document {path}");
    }
    assert!(schema.contains("gemini-mcp"), "Schema should contain project name");
}

#[test]
fn openapi_schema_parses_to_valid_structure() {
    let doc = gemini_mcp::ApiDoc::openapi();
    let value = serde_json::to_value(&doc).expect("Schema should convert to Value");
    assert!(value.get("info").is_some(), "Schema should have 'info' section");
    assert!(value["paths"].get("/generate").is_some());
    assert!(value["components"]["schemas"].get("GenerateParams").is_some());
}
