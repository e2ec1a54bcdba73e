//! Custom assertions para tests.

use serde_json::Value;

/// Verifica que el body tenga la forma del envelope de error.
pub fn assert_error_envelope(json: &Value) {
    assert!(json.is_object(), "Error body should be a JSON object");

    let obj = json.as_object().unwrap();

    // Campos requeridos
    assert!(obj["message"].is_string(), "'message' should be a string");
    assert!(obj["statusCode"].is_u64(), "'statusCode' should be an integer");
    assert!(obj["errors"].is_array(), "'errors' should be an array");

    if let Some(errors) = obj["errors"].as_array() {
        for error in errors {
            assert!(error.is_string(), "every entry of 'errors' should be a string");
        }
    }

    // Solo message, statusCode, errors y stack
    for key in obj.keys() {
        assert!(
            matches!(key.as_str(), "message" | "statusCode" | "errors" | "stack"),
            "Unexpected field '{}' in error body",
            key
        );
    }

    if let Some(stack) = obj.get("stack") {
        assert!(stack.is_string(), "'stack' should be a string when present");
    }
}

/// Retorna `errors` como lista de strings.
pub fn error_messages(json: &Value) -> Vec<String> {
    json["errors"]
        .as_array()
        .expect("'errors' should be an array")
        .iter()
        .map(|v| v.as_str().expect("error entries are strings").to_string())
        .collect()
}
