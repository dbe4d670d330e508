//! End-to-end conversion tests.

use serde_json::{json, Value};
use tyshape_core::{convert, convert_with_diagnostics, OutputShape, TypeDescriptor};

fn to_json(shape: &OutputShape) -> Value {
    serde_json::to_value(shape).expect("shape serializes")
}

#[test]
fn test_names_are_lowercased() {
    for name in ["Foo", "FOO", "foo"] {
        let shape = convert(&format!("interface {name} {{ id: number }}"));
        assert!(shape.contains("foo"), "missing key for {name}");
        assert_eq!(shape.len(), 1);
    }
}

#[test]
fn test_field_names_keep_their_case() {
    let shape = convert("type Row = { userId: number; UserName: string };");
    assert_eq!(to_json(&shape), json!({ "row": { "userId": "number", "UserName": "string" } }));
}

#[test]
fn test_fields_are_preserved() {
    let shape = convert("interface Item { id: number; name: string }");
    assert_eq!(to_json(&shape), json!({ "item": { "id": "number", "name": "string" } }));
}

#[test]
fn test_union_keeps_source_order() {
    let shape = convert(r#"interface Account { status: "active" | "inactive" }"#);
    assert_eq!(
        to_json(&shape),
        json!({ "account": { "status": ["\"active\"", "\"inactive\""] } })
    );
}

#[test]
fn test_non_object_alias_is_a_descriptor() {
    let shape = convert("type InlineDeclare = string | number;\n");
    assert_eq!(
        shape.descriptor("inlinedeclare"),
        Some(&TypeDescriptor::Alternatives(vec![
            "string".to_string(),
            "number".to_string()
        ]))
    );
    assert!(shape.fields("inlinedeclare").is_none());
}

#[test]
fn test_conversion_is_idempotent() {
    let src = r#"
        interface User { id: number; tags: string[] }
        type Mode = "light" | "dark";
        type Settings = { mode: Mode; user: User };
    "#;
    assert_eq!(convert(src), convert(src));
    assert_eq!(to_json(&convert(src)), to_json(&convert(src)));
}

#[test]
fn test_intersection_of_literals_is_not_merged() {
    let shape = convert("type ComplexAlias = { id: number; name: string; } & { age: number };\n");
    assert_eq!(
        to_json(&shape),
        json!({ "complexalias": ["{ id: number; name: string; }", "{ age: number }"] })
    );
}

#[test]
fn test_member_without_type_contributes_nothing() {
    let shape = convert("interface Partial { known: string; unknown; maybe?; }");
    assert_eq!(to_json(&shape), json!({ "partial": { "known": "string" } }));
}

#[test]
fn test_redeclaration_merges_last_member_wins() {
    let shape = convert(
        "interface Window { title: string; width: number }\n\
         interface Window { width: string; height: number }",
    );
    assert_eq!(
        to_json(&shape),
        json!({ "window": { "title": "string", "width": "string", "height": "number" } })
    );
}

#[test]
fn test_alias_and_interface_with_same_name_merge() {
    let shape = convert("type Config = { a: string };\ninterface config { b: number }");
    assert_eq!(to_json(&shape), json!({ "config": { "a": "string", "b": "number" } }));
}

#[test]
fn test_non_object_alias_overwrites_shape() {
    let shape = convert("interface Id { raw: string }\ntype ID = string | number;");
    assert_eq!(to_json(&shape), json!({ "id": ["string", "number"] }));
}

#[test]
fn test_shape_after_descriptor_starts_fresh() {
    let shape = convert("type Key = string;\ninterface Key { code: number }");
    assert_eq!(to_json(&shape), json!({ "key": { "code": "number" } }));
}

#[test]
fn test_quoted_property_keys_are_verbatim() {
    let shape = convert(r#"interface Headers { "content-type": string; 'x-id'?: number }"#);
    let fields = shape.fields("headers").expect("headers shape");
    assert!(fields.contains_key("\"content-type\""));
    assert!(fields.contains_key("'x-id'"));
}

#[test]
fn test_other_declarations_are_ignored() {
    let shape = convert(
        "declare function f(x: number): void;\n\
         declare const v: { a: string };\n\
         declare class K { p: string }\n\
         enum E { A, B }",
    );
    assert!(shape.is_empty());
}

#[test]
fn test_malformed_input_still_converts() {
    let conversion = convert_with_diagnostics(
        "interface Good { a: string }\ninterface { oops }\ntype Alias = ;\ntype Ok = boolean;",
    );
    assert!(!conversion.errors.is_empty());
    assert_eq!(
        to_json(&conversion.shape),
        json!({ "good": { "a": "string" }, "ok": "boolean" })
    );
}

#[test]
fn test_empty_source() {
    assert!(convert("").is_empty());
    assert!(convert("// nothing here\n").is_empty());
}

// The built-in demo samples.

#[test]
fn test_game_response_sample() {
    let src = r#"type GameResponse = {
  id: number;
  date: string;
  time: string;
  timestamp: number;
  timezone: string;
  stage: string | null;
  week: string | null;
  venue: string | null;
  status: Status;
  winner: "home" | "away";
  identfier: "true";
};"#;
    assert_eq!(
        to_json(&convert(src)),
        json!({
            "gameresponse": {
                "id": "number",
                "date": "string",
                "time": "string",
                "timestamp": "number",
                "timezone": "string",
                "stage": ["string", "null"],
                "week": ["string", "null"],
                "venue": ["string", "null"],
                "status": "Status",
                "winner": ["\"home\"", "\"away\""],
                "identfier": "\"true\""
            }
        })
    );
}

#[test]
fn test_button_sample() {
    let src = "type Button = {\n    variant: \"solid\" | \"text\";\n    };";
    assert_eq!(
        to_json(&convert(src)),
        json!({ "button": { "variant": ["\"solid\"", "\"text\""] } })
    );
}

#[test]
fn test_user_sample() {
    let src = "interface User {\n  id: number;\n  name: string;\n  status: \"active\" | \"inactive\";\n}";
    assert_eq!(
        to_json(&convert(src)),
        json!({
            "user": {
                "id": "number",
                "name": "string",
                "status": ["\"active\"", "\"inactive\""]
            }
        })
    );
}

#[test]
fn test_declarations_inside_function_bodies() {
    let shape = convert("function f() { type Inner = string; interface I { x: number } }");
    assert_eq!(
        to_json(&shape),
        json!({ "inner": "string", "i": { "x": "number" } })
    );
}

#[test]
fn test_declarations_inside_class_methods() {
    let src = r#"
        class Store {
            load(id: string): void {
                if (id) {
                    type InMethod = number;
                }
            }
        }
    "#;
    assert_eq!(to_json(&convert(src)), json!({ "inmethod": "number" }));
}

#[test]
fn test_deeply_nested_types_do_not_abort() {
    let depth = 5000;
    let src = format!(
        "type Deep = {}string{};\ninterface After {{ ok: boolean }}",
        "{ a: ".repeat(depth),
        " }".repeat(depth)
    );
    let conversion = convert_with_diagnostics(&src);
    assert_eq!(conversion.errors.len(), 1);
    assert!(conversion.shape.fields("deep").is_some_and(|f| f.contains_key("a")));
    assert_eq!(to_json(&conversion.shape)["after"], json!({ "ok": "boolean" }));
}
