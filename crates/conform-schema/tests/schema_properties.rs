//! Integration tests: schema-level and value-level behaviour through the
//! public entry points, including a YAML-authored schema.

use conform_schema::{validate_schema, validate_value, Schema};
use serde_json::{json, Value};
use std::path::PathBuf;

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_yaml::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

// ─── oneOf exclusivity ───────────────────────────────────────────────

#[test]
fn test_one_of_string_or_integer() {
    let schema = json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
    assert_eq!(validate_value("v", &schema, &json!("1")).unwrap(), json!("1"));
    assert_eq!(validate_value("v", &schema, &json!(1)).unwrap(), json!(1));
    assert!(validate_value("v", &schema, &json!(true)).is_err());
}

#[test]
fn test_one_of_overlapping_branches_fail() {
    let schema = json!({"oneOf": [{"type": "number"}, {"type": "integer"}]});
    let err = validate_value("v", &schema, &json!(1)).unwrap_err();
    assert_eq!(err.code(), "v");
    assert!(err.message().contains("matches 2 schemas"));
    // 1.5 is a number but not an integer, so exactly one branch matches.
    assert!(validate_value("v", &schema, &json!(1.5)).is_ok());
}

// ─── Range boundaries ────────────────────────────────────────────────

#[test]
fn test_integer_range_is_inclusive() {
    let schema = json!({"type": "integer", "minimum": 0, "maximum": 10});
    assert!(validate_value("v", &schema, &json!(0)).is_ok());
    assert!(validate_value("v", &schema, &json!(10)).is_ok());
    assert!(validate_value("v", &schema, &json!(11)).is_err());
}

#[test]
fn test_exclusive_minimum_flag() {
    let schema = json!({"type": "integer", "minimum": 0, "maximum": 10, "exclusiveMinimum": true});
    let err = validate_value("v", &schema, &json!(0)).unwrap_err();
    assert!(err.message().contains('0'));
    assert!(validate_value("v", &schema, &json!(1)).is_ok());
}

#[test]
fn test_number_bounds_tolerate_epsilon() {
    let schema = json!({"type": "number", "maximum": 0.3});
    assert!(validate_value("v", &schema, &json!(0.1 + 0.2)).is_ok());
    assert!(validate_value("v", &schema, &json!(0.300_009)).is_ok());
    assert!(validate_value("v", &schema, &json!(0.300_1)).is_err());
}

// ─── Defaults ────────────────────────────────────────────────────────

#[test]
fn test_default_substitution_for_missing_required_property() {
    let schema = json!({
        "type": "object",
        "properties": {"id": {"type": "integer", "default": "0"}},
        "required": ["id"]
    });
    assert_eq!(validate_value("v", &schema, &json!({})).unwrap(), json!({"id": 0}));
}

// ─── Malformed schemas ───────────────────────────────────────────────

#[test]
fn test_malformed_schemas_are_rejected_before_any_value() {
    let cases = [
        (json!({"type": "integer", "minimum": 5, "maximum": 3}), "s.minimum"),
        (json!({"type": "array", "uniqueItems": true}), "s.items"),
        (json!({"oneOf": [{"type": "string"}, {"type": "strnig"}]}), "s.oneOf[1].type"),
        (json!({"type": "string", "oneOf": [{"type": "string"}]}), "s.type"),
        (json!({"type": "object", "properties": {"n": {"type": "integer", "multipleOf": -2}}}), "s.n.multipleOf"),
        (json!({"type": "string", "enum": ["a", "a"]}), "s.enum[1]"),
    ];
    for (schema, code) in cases {
        let err = validate_schema("s", &schema).unwrap_err();
        assert_eq!(err.code(), code, "schema {schema}");
    }
}

#[test]
fn test_schema_error_reported_by_validate_value() {
    let schema = json!({"type": "number", "minimum": 2, "maximum": 1});
    let err = validate_value("s", &schema, &json!(1.5)).unwrap_err();
    assert_eq!(err.code(), "s.minimum");
}

// ─── YAML-authored schema ────────────────────────────────────────────

#[test]
fn test_yaml_schema_normalizes_document() {
    let schema = Schema::compile("profile", &fixture("profile.schema.yaml")).unwrap();
    let out = schema
        .validate(&json!({
            "kind": "person",
            "name": "  Ada Lovelace ",
            "norms": [{"attribute": "height", "value": 170}],
            "tags": ["math"]
        }))
        .unwrap();
    assert_eq!(
        out,
        json!({
            "name": "Ada Lovelace",
            "kind": "person",
            "locale": "en-US",
            "norms": [{"attribute": "height", "value": 170}],
            "tags": ["math"]
        })
    );
}

#[test]
fn test_yaml_schema_error_codes() {
    let schema = Schema::compile("profile", &fixture("profile.schema.yaml")).unwrap();
    let base = json!({"name": "Ada", "kind": "person"});

    let with = |key: &str, value: Value| {
        let mut doc = base.clone();
        doc[key] = value;
        schema.validate(&doc).unwrap_err().code().to_string()
    };

    assert_eq!(with("kind", json!("robot")), "profile.kind");
    assert_eq!(with("email", json!("not-an-email")), "profile.email");
    assert_eq!(with("score", json!(1.5)), "profile.score");
    assert_eq!(with("norms", json!([{"attribute": "ok"}, {"attribute": "Bad"}])), "profile.norms[1].attribute");
    assert_eq!(with("norms", json!([{"attribute": "a", "value": true}])), "profile.norms[0].value");
    assert_eq!(with("norms", json!([{"attribute": "a"}, {"attribute": "a"}])), "profile.norms[1]");
    assert_eq!(with("unexpected", json!(1)), "profile.unexpected");
}

#[test]
fn test_path_codes_are_deterministic() {
    let schema = Schema::compile("profile", &fixture("profile.schema.yaml")).unwrap();
    let doc = json!({"name": "", "kind": "robot", "score": 7});
    let first = schema.validate(&doc).unwrap_err();
    let second = schema.validate(&doc).unwrap_err();
    assert_eq!(first.code(), second.code());
    // `name` is declared first, so its violation wins.
    assert_eq!(first.code(), "profile.name");
}
