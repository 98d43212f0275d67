// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use dynval::*;

fn person() -> Type {
    Type::object([("name", Type::STRING), ("age", Type::NUMBER)])
}

#[test]
fn structural_equality() {
    assert_eq!(Type::list(Type::STRING), Type::list(Type::STRING));
    assert_ne!(Type::list(Type::STRING), Type::set(Type::STRING));
    assert_eq!(person(), person());
    assert_ne!(
        Type::tuple(vec![Type::BOOL, Type::NUMBER]),
        Type::tuple(vec![Type::NUMBER, Type::BOOL])
    );
    assert_ne!(
        Type::object_with_optional_attrs([("x", Type::STRING)], ["x"]),
        Type::object([("x", Type::STRING)])
    );
}

#[test]
fn capsule_types_are_nominal() {
    let a = Type::capsule::<u32>("counter");
    let b = Type::capsule::<u32>("counter");
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn predicates_and_accessors() {
    let ty = Type::map(Type::list(Type::NUMBER));
    assert!(ty.is_map_type());
    assert!(ty.is_collection_type());
    assert!(!ty.is_primitive_type());
    assert_eq!(ty.map_element_type(), Some(&Type::list(Type::NUMBER)));
    assert_eq!(ty.list_element_type(), None);
    assert_eq!(ty.element_type(), &Type::list(Type::NUMBER));

    let tuple = Type::tuple(vec![Type::STRING, Type::BOOL]);
    assert_eq!(tuple.tuple_len(), 2);
    assert_eq!(tuple.tuple_element_types(), &[Type::STRING, Type::BOOL]);
    assert_eq!(Type::empty_tuple().tuple_len(), 0);
}

#[test]
fn object_attributes() {
    let ty = Type::object_with_optional_attrs(
        [("name", Type::STRING), ("nickname", Type::STRING)],
        ["nickname"],
    );
    assert!(ty.has_attribute("name"));
    assert!(!ty.has_attribute("age"));
    assert_eq!(ty.attribute_type("name"), &Type::STRING);
    assert!(ty.attribute_optional("nickname"));
    assert!(!ty.attribute_optional("name"));
    assert_eq!(ty.optional_attributes().len(), 1);
    assert!(Type::empty_object().attribute_types().is_empty());
}

#[test]
fn attribute_names_are_normalized() {
    // "e" followed by a combining acute accent.
    let ty = Type::object([("caf\u{0065}\u{0301}", Type::BOOL)]);
    assert!(ty.has_attribute("caf\u{00e9}"));
}

#[test]
#[should_panic(expected = "not one of the object's attributes")]
fn optional_attribute_must_exist() {
    let _ = Type::object_with_optional_attrs([("a", Type::BOOL)], ["b"]);
}

#[test]
#[should_panic]
fn attribute_type_of_missing_attribute() {
    let _ = person().attribute_type("missing");
}

#[test]
fn dynamic_types() {
    assert!(Type::DYNAMIC.is_dynamic());
    assert!(Type::list(Type::DYNAMIC).has_dynamic_types());
    assert!(Type::object([("a", Type::tuple(vec![Type::DYNAMIC]))]).has_dynamic_types());
    assert!(!person().has_dynamic_types());
}

#[test]
fn without_optional_attributes_deep() {
    let inner = Type::object_with_optional_attrs([("x", Type::NUMBER)], ["x"]);
    let ty = Type::list(inner);
    assert_eq!(
        ty.without_optional_attributes_deep(),
        Type::list(Type::object([("x", Type::NUMBER)]))
    );
}

#[test]
fn friendly_names() {
    assert_eq!(Type::list(Type::STRING).friendly_name(), "list of string");
    assert_eq!(Type::DYNAMIC.friendly_name(), "dynamic");
    assert_eq!(
        Type::set(Type::DYNAMIC).friendly_name_for_constraint(),
        "set of any type"
    );
    assert_eq!(person().friendly_name(), "object");
    assert_eq!(Type::capsule::<String>("label").friendly_name(), "label");
}

#[test]
fn conformance_of_identical_types() {
    assert!(person().test_conformance(&person()).is_empty());
    assert!(person().test_conformance(&Type::DYNAMIC).is_empty());
    assert!(Type::list(Type::BOOL)
        .test_conformance(&Type::list(Type::DYNAMIC))
        .is_empty());
}

#[test]
fn conformance_reports_every_mismatch() {
    let given = Type::object([("name", Type::NUMBER), ("extra", Type::BOOL)]);
    let errors = given.test_conformance(&person());
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "unsupported attribute \"extra\"".to_string(),
            "missing required attribute \"age\"".to_string(),
            "name: string required, but received number".to_string(),
        ]
    );
    assert_eq!(errors[2].path, get_attr_path("name"));
}

#[test]
fn conformance_of_tuples() {
    let errors = Type::tuple(vec![Type::BOOL])
        .test_conformance(&Type::tuple(vec![Type::BOOL, Type::BOOL]));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "2 elements are required, but got 1");

    let errors = Type::tuple(vec![Type::BOOL, Type::STRING])
        .test_conformance(&Type::tuple(vec![Type::BOOL, Type::NUMBER]));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, index_int_path(1));
}

#[test]
fn conformance_of_collections() {
    let errors = Type::list(Type::STRING).test_conformance(&Type::list(Type::NUMBER));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "[*]: number required, but received string");

    let errors = Type::list(Type::STRING).test_conformance(&Type::set(Type::STRING));
    assert_eq!(errors[0].message, "set of string required, but received list of string");
}

#[test]
fn json_primitives() -> Result<()> {
    assert_eq!(Type::from_json_str("\"bool\"")?, Type::BOOL);
    assert_eq!(Type::from_json_str("\"dynamic\"")?, Type::DYNAMIC);
    assert_eq!(Type::NUMBER.to_json_str()?, "\"number\"");
    Ok(())
}

#[test]
fn json_compound_types() -> Result<()> {
    let ty = Type::object([
        ("tags", Type::set(Type::STRING)),
        ("pair", Type::tuple(vec![Type::NUMBER, Type::BOOL])),
        ("env", Type::map(Type::STRING)),
    ]);
    let json = ty.to_json_str()?;
    assert_eq!(
        json,
        r#"["object",{"env":["map","string"],"pair":["tuple",["number","bool"]],"tags":["set","string"]}]"#
    );
    assert_eq!(Type::from_json_str(&json)?, ty);
    Ok(())
}

#[test]
fn json_optional_attributes() -> Result<()> {
    let ty = Type::object_with_optional_attrs([("x", Type::STRING)], ["x"]);
    let json = ty.to_json_str()?;
    assert_eq!(json, r#"["object",{"x":"string"},["x"]]"#);

    let parsed = Type::from_json_str(&json)?;
    assert_eq!(parsed, ty);
    assert!(parsed.attribute_optional("x"));
    Ok(())
}

#[test]
fn json_rejects_bad_descriptions() {
    for json in [
        "\"float\"",
        "[\"list\"]",
        "[\"list\", \"string\", \"extra\"]",
        "[\"widget\", \"string\"]",
        "[\"object\", {\"a\": \"bool\"}, [\"b\"]]",
        "42",
    ] {
        assert!(Type::from_json_str(json).is_err(), "{json} should not parse");
    }
}

#[test]
fn json_capsule_is_an_error() {
    let ty = Type::list(Type::capsule::<u8>("byte"));
    assert!(ty.to_json_str().is_err());
}

#[test]
fn debug_renders_constructors() {
    assert_eq!(format!("{:?}", Type::list(Type::STRING)), "Type::list(Type::STRING)");
    assert_eq!(format!("{}", Type::map(Type::BOOL)), "map of bool");
}
