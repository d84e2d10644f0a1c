//! Snapshot of the exact event sequence for a moderately complex document.
//! Catches unintended changes in event order or payloads.

use insta::assert_snapshot;

use crate::{ParseEvent, parse_with_sink};

fn render(input: &str) -> String {
    let mut events: Vec<ParseEvent<'_>> = Vec::new();
    parse_with_sink(input.as_bytes(), &mut events).expect("document should parse");
    events
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn snapshot_complex_document() {
    let json = r#"{
        "users": [
            {"id": 1, "name": "Ada", "admin": true},
            {"id": 2, "name": "Grâce\n", "manager": null}
        ],
        "meta": {"count": 2.0e0, "tags": []}
    }"#;

    assert_snapshot!(render(json), @r#"
    object_begin
    key "users"
    array_begin
    object_begin
    key "id"
    number 1
    key "name"
    string "Ada"
    key "admin"
    boolean true
    object_end
    object_begin
    key "id"
    number 2
    key "name"
    string "Grâce\n"
    key "manager"
    null
    object_end
    array_end
    key "meta"
    object_begin
    key "count"
    number 2.0e0
    key "tags"
    array_begin
    array_end
    object_end
    object_end
    "#);
}

#[test]
fn snapshot_scalar_root() {
    assert_snapshot!(render(r#" "\t " "#), @r#"string "\t ""#);
}
