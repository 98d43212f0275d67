// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use dynval::set::{Rules, Set};
use dynval::*;

#[test]
fn set_values_deduplicate() {
    let set = Value::set(vec![
        Value::from("a"),
        Value::from("b"),
        Value::from("a"),
    ]);
    assert_eq!(set.length(), Value::from(2i64));
    assert_eq!(set.ty(), &Type::set(Type::STRING));
}

#[test]
fn empty_set_has_length_zero() {
    let set = Value::set_empty(Type::NUMBER);
    assert_eq!(set.length(), Value::zero());
    assert_eq!(set.length_int(), 0);
}

#[test]
fn equal_numbers_in_different_forms() -> anyhow::Result<()> {
    let set = Value::set(vec![Value::from(1i64), Value::parse_number("1.0")?]);
    assert_eq!(set.length_int(), 1);
    Ok(())
}

#[test]
fn unknown_elements_are_all_kept() {
    let set = Value::set(vec![
        Value::unknown(Type::NUMBER),
        Value::unknown(Type::NUMBER),
    ]);
    assert_eq!(set.length_int(), 2);
    assert!(!set.is_wholly_known());
}

#[test]
fn nested_sets() {
    let a = Value::set(vec![Value::from(1i64), Value::from(2i64)]);
    let b = Value::set(vec![Value::from(2i64), Value::from(1i64)]);
    let outer = Value::set(vec![a, b]);
    assert_eq!(outer.length_int(), 1);
}

#[test]
#[should_panic(expected = "inconsistent set element types")]
fn heterogeneous_set() {
    let _ = Value::set(vec![Value::from("a"), Value::TRUE]);
}

#[test]
fn value_set_operations() {
    let a: ValueSet = [1i64, 2, 3].into_iter().map(Value::from).collect();
    let b: ValueSet = [3i64, 4].into_iter().map(Value::from).collect();

    assert_eq!(a.union(&b).len(), 4);
    assert_eq!(a.intersection(&b).values(), vec![Value::from(3i64)]);
    assert_eq!(
        a.subtract(&b).values(),
        vec![Value::from(1i64), Value::from(2i64)]
    );
    assert_eq!(
        a.symmetric_difference(&b).values(),
        vec![
            Value::from(1i64),
            Value::from(2i64),
            Value::from(4i64)
        ]
    );
    assert!(a.same_rules(&b));
}

#[test]
#[should_panic(expected = "sets have different rules")]
fn value_set_operations_need_matching_types() {
    let a: ValueSet = [Value::from(1i64)].into_iter().collect();
    let b: ValueSet = [Value::from("1")].into_iter().collect();
    let _ = a.union(&b);
}

#[test]
fn value_set_order_is_deterministic() {
    let set: ValueSet = ["pear", "apple", "fig"]
        .into_iter()
        .map(Value::from)
        .collect();
    assert_eq!(
        set.values(),
        vec![Value::from("apple"), Value::from("fig"), Value::from("pear")]
    );

    let mut with_null = ValueSet::new(Type::NUMBER);
    with_null.add(Value::unknown(Type::NUMBER));
    with_null.add(Value::null(Type::NUMBER));
    with_null.add(Value::from(5i64));
    let values = with_null.values();
    assert_eq!(values[0], Value::from(5i64));
    assert!(!values[1].is_known());
    assert!(values[2].is_null());
}

#[test]
fn capsule_sets_ignore_insertion_order() {
    let ty = Type::capsule::<u32>("counter");
    let x = Value::capsule(&ty, 1u32);
    let y = Value::capsule(&ty, 2u32);
    let xy = Value::set(vec![x.clone(), y.clone()]);
    let yx = Value::set(vec![y.clone(), x.clone()]);

    assert_eq!(xy.equals(&yx), Value::TRUE);
    assert!(xy.raw_equals(&yx));
    assert_eq!(xy, yx);
    assert_eq!(xy.as_value_set().values(), yx.as_value_set().values());
}

#[test]
fn capsule_sets_deduplicate_by_identity() {
    let ty = Type::capsule::<u32>("counter");
    let x = Value::capsule(&ty, 1u32);
    let twin = Value::capsule(&ty, 1u32);
    let set = Value::set(vec![x.clone(), x.clone(), twin]);
    assert_eq!(set.length_int(), 2);
    assert_eq!(set.has_element(&x), Value::TRUE);
}

#[test]
fn value_set_add_and_remove() {
    let mut set = ValueSet::new(Type::STRING);
    assert!(set.add(Value::from("a")));
    assert!(!set.add(Value::from("a")));
    assert!(set.add(Value::null(Type::DYNAMIC)));
    assert_eq!(set.len(), 2);
    assert_eq!(set.remove(&Value::from("a")), Some(Value::from("a")));
    assert!(!set.has(&Value::from("a")));

    let value = Value::set_from_value_set(set);
    assert_eq!(value.ty(), &Type::set(Type::STRING));
}

#[test]
#[should_panic(expected = "can't add")]
fn value_set_rejects_other_types() {
    let mut set = ValueSet::new(Type::STRING);
    set.add(Value::from(1i64));
}

// Groups integers by their value modulo 10.
#[derive(Clone)]
struct LastDigit;

impl Rules<i64> for LastDigit {
    fn hash(&self, v: &i64) -> u64 {
        v.rem_euclid(10) as u64
    }

    fn equivalent(&self, a: &i64, b: &i64) -> bool {
        a.rem_euclid(10) == b.rem_euclid(10)
    }

    fn same_rules(&self, _other: &Self) -> bool {
        true
    }
}

#[test]
fn generic_sets() {
    let mut set = Set::new(LastDigit);
    assert!(set.add(3));
    assert!(!set.add(13));
    assert!(set.add(4));
    assert_eq!(set.len(), 2);
    assert_eq!(set.get(&23), Some(&3));

    let other = Set::new_from(LastDigit, [14, 15]);
    assert_eq!(set.union(&other).len(), 3);
    assert_eq!(set.intersection(&other).len(), 1);
    assert!(set.subtract(&other).has(&3));
    assert_eq!(set.symmetric_difference(&other).len(), 2);
    assert_eq!(set.copy().len(), set.len());
}
