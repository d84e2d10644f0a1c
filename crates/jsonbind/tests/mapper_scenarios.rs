#![allow(missing_docs)]

mod common;

use common::{CATALOG, Category, Person};
use jsonbind::{Mapper, MapperError, UnknownKeys, Value, from_value, parse, to_value};

#[test_log::test]
fn parse_then_map_a_person() {
    let value = parse(br#"{"name":"Ada","tags":["x","y"]}"#).unwrap();
    let person: Person = from_value(&value).unwrap();
    assert_eq!(
        person,
        Person {
            full_name: "Ada".into(),
            labels: vec!["x".into(), "y".into()],
        }
    );

    let rendered = to_value(&person).unwrap();
    assert_eq!(rendered, value);
    assert_eq!(
        String::from_utf8(rendered.to_json_bytes()).unwrap(),
        r#"{"name":"Ada","tags":["x","y"]}"#
    );
}

#[test_log::test]
fn malformed_input_never_reaches_the_mapper() {
    for input in [&br#"{"a":1,}"#[..], br#"{"a":1"#] {
        assert!(parse(input).is_err());
    }
}

#[test_log::test]
fn recursive_classes() {
    let catalog: Category = from_value(&parse(CATALOG.as_bytes()).unwrap()).unwrap();
    assert_eq!(catalog.children.len(), 2);
    assert_eq!(catalog.children[0].children[1].name, "poetry");
    assert!(catalog.children[0].children[1].children.is_empty());
    assert_eq!(catalog.children[1].position, 2);

    let rendered = to_value(&catalog).unwrap();
    let again: Category = from_value(&rendered).unwrap();
    assert_eq!(again, catalog);
}

#[test_log::test]
fn strict_mapping_rejects_legacy_keys() {
    let value = parse(CATALOG.as_bytes()).unwrap();
    let err = Mapper::default()
        .with_unknown_keys(UnknownKeys::Reject)
        .map::<Category>(&value)
        .unwrap_err();
    assert!(
        matches!(&err, MapperError::UnknownKey { class: "Category", key } if key == "legacy_id")
    );
}

#[test_log::test]
fn root_arrays() {
    let value = parse(br#"[{"name": "a"}, {"name": "b", "tags": []}]"#).unwrap();
    let people: Vec<Person> = Mapper::default().map_array(&value).unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[1].full_name, "b");

    assert!(matches!(
        Mapper::default().map_array::<Person>(&Value::Null),
        Err(MapperError::SourceArrayIsNil)
    ));
}

#[test_log::test]
fn mapper_is_shareable_across_threads() {
    let mapper = Mapper::default();
    let value = parse(CATALOG.as_bytes()).unwrap();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let catalog: Category = mapper.map(&value).unwrap();
                assert_eq!(catalog.name, "root");
            });
        }
    });
}
