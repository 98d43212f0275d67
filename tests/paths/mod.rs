// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use dynval::*;

fn config() -> Value {
    Value::object([
        (
            "servers",
            Value::list(vec![
                Value::object([("host", Value::from("a.example"))]),
                Value::object([("host", Value::from("b.example"))]),
            ]),
        ),
        ("env", Value::map([("MODE", Value::from("prod"))])),
        ("tags", Value::set(vec![Value::from("x"), Value::from("y")])),
    ])
}

#[test]
fn apply() -> Result<()> {
    let path = get_attr_path("servers").index_int(1).get_attr("host");
    assert_eq!(path.apply(&config())?, Value::from("b.example"));

    let path = get_attr_path("env").index_string("MODE");
    assert_eq!(path.apply(&config())?, Value::from("prod"));

    assert_eq!(Path::new().apply(&config())?, config());
    Ok(())
}

#[test]
fn apply_into_sets() -> Result<()> {
    let path = get_attr_path("tags").index(Value::from("x"));
    assert_eq!(path.apply(&config())?, Value::from("x"));

    let err = get_attr_path("tags")
        .index(Value::from("z"))
        .apply(&config())
        .unwrap_err();
    assert_eq!(err.message, "set does not contain given element");
    Ok(())
}

#[test]
fn apply_errors() {
    let err = get_attr_path("servers")
        .index_int(5)
        .get_attr("host")
        .apply(&config())
        .unwrap_err();
    assert_eq!(err.path, get_attr_path("servers").index_int(5));
    assert_eq!(err.to_string(), "servers[5]: value does not have given index key");

    let err = get_attr_path("env").index_int(0).apply(&config()).unwrap_err();
    assert_eq!(err.message, "not a list type");

    let err = get_attr_path("servers").get_attr("x").apply(&config()).unwrap_err();
    assert_eq!(err.message, "not an object type");

    let err = index_path(Value::from(true)).apply(&config()).unwrap_err();
    assert_eq!(err.message, "key value not number or string");

    let null = Value::null(Type::object([("a", Type::BOOL)]));
    let err = get_attr_path("a").apply(&null).unwrap_err();
    assert_eq!(err.message, "attempt to access attribute of null value");
}

#[test]
fn apply_through_unknowns() -> Result<()> {
    let u = Value::unknown(Type::object([("items", Type::list(Type::NUMBER))]));
    let v = get_attr_path("items").index_int(0).apply(&u)?;
    assert_eq!(v, Value::unknown(Type::NUMBER));

    let v = get_attr_path("anything").index_int(3).apply(&Value::DYNAMIC)?;
    assert_eq!(v, Value::DYNAMIC);
    Ok(())
}

#[test]
fn last_step() -> Result<()> {
    let path = get_attr_path("servers").index_int(0);
    let (parent, step) = path.last_step(&config())?;
    assert_eq!(parent, config().get_attr("servers"));
    assert_eq!(step, Some(PathStep::Index(Value::from(0i64))));

    let (root, step) = Path::new().last_step(&config())?;
    assert_eq!(root, config());
    assert_eq!(step, None);
    Ok(())
}

#[test]
fn path_building() {
    let mut path = Path::new();
    assert!(path.is_empty());
    path.push(PathStep::GetAttr("a".to_string()));
    path.push(PathStep::Index(Value::from(2i64)));
    assert_eq!(path.len(), 2);
    assert_eq!(path, get_attr_path("a").index_int(2));

    let copy = path.copy();
    assert_eq!(path.pop(), Some(PathStep::Index(Value::from(2i64))));
    assert!(!path.equals(&copy));
    assert!(copy.has_prefix(&path));
    assert!(copy.has_prefix(&Path::new()));
    assert!(!path.has_prefix(&copy));
}

#[test]
fn appending_does_not_alias() {
    let base = get_attr_path("a");
    let left = base.index_int(0);
    let right = base.index_int(1);
    assert_eq!(base.len(), 1);
    assert_ne!(left, right);
}

#[test]
fn display() {
    let path = get_attr_path("a")
        .get_attr("b")
        .index_int(0)
        .index_string("k")
        .index(Value::unknown(Type::NUMBER));
    assert_eq!(path.to_string(), "a.b[0][\"k\"][*]");
    assert_eq!(index_string_path("x").to_string(), "[\"x\"]");
}

#[test]
fn errors_without_path() {
    let err = Path::new().error("boom");
    assert_eq!(err.to_string(), "boom");
    let err = PathError::new(index_int_path(3), "bad");
    assert_eq!(err.to_string(), "[3]: bad");
}

#[test]
fn path_sets() {
    let mut set = PathSet::new();
    set.add(get_attr_path("a").index_int(0));
    set.add(get_attr_path("a").index(Value::parse_number("0.0").unwrap_or_else(|_| Value::zero())));
    assert_eq!(set.len(), 1);

    set.add_all_steps(&get_attr_path("b").get_attr("c"));
    assert_eq!(set.len(), 3);
    assert!(set.has(&get_attr_path("b")));

    let other = PathSet::new_from([get_attr_path("b")]);
    assert!(set.subtract(&other).has(&get_attr_path("b").get_attr("c")));
    assert!(!set.subtract(&other).has(&get_attr_path("b")));
    assert_eq!(set.intersection(&other).len(), 1);
    assert_eq!(set.union(&other).len(), 3);
    assert!(set.union(&other).equal(&set));
}
