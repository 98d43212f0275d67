// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use dynval::*;

fn unknown_bool() -> Value {
    Value::unknown(Type::BOOL).refine_not_null()
}

fn num(s: &str) -> Value {
    match Value::parse_number(s) {
        Ok(v) => v,
        Err(e) => panic!("bad test number {s}: {e}"),
    }
}

fn between(lo: i64, hi: i64) -> Value {
    Value::unknown(Type::NUMBER)
        .refine()
        .not_null()
        .number_range_inclusive(&Value::from(lo), &Value::from(hi))
        .new_value()
}

#[test]
fn logic() {
    assert_eq!(Value::TRUE.not(), Value::FALSE);
    assert_eq!(Value::TRUE.and(&Value::FALSE), Value::FALSE);
    assert_eq!(Value::FALSE.or(&Value::TRUE), Value::TRUE);

    let u = Value::unknown(Type::BOOL);
    assert_eq!(u.not(), unknown_bool());
    assert_eq!(u.and(&Value::FALSE), Value::FALSE);
    assert_eq!(u.and(&Value::TRUE), unknown_bool());
    assert_eq!(Value::TRUE.or(&u), Value::TRUE);
    assert_eq!(Value::FALSE.or(&u), unknown_bool());
}

#[test]
#[should_panic(expected = "and: operand is null")]
fn logic_on_null() {
    let _ = Value::TRUE.and(&Value::null(Type::BOOL));
}

#[test]
#[should_panic(expected = "must be Type::BOOL")]
fn logic_on_number() {
    let _ = Value::from(1i64).not();
}

#[test]
fn comparisons() {
    let (one, two) = (Value::from(1i64), Value::from(2i64));
    assert_eq!(one.less_than(&two), Value::TRUE);
    assert_eq!(one.greater_than(&two), Value::FALSE);
    assert_eq!(one.less_than_or_equal_to(&one), Value::TRUE);
    assert_eq!(two.greater_than_or_equal_to(&one), Value::TRUE);
    assert_eq!(Value::negative_infinity().less_than(&one), Value::TRUE);
}

#[test]
fn comparisons_with_ranges() {
    let ten_or_more = Value::unknown(Type::NUMBER)
        .refine()
        .not_null()
        .number_range_lower_bound(&Value::from(10i64), true)
        .new_value();
    assert_eq!(ten_or_more.less_than(&Value::from(5i64)), Value::FALSE);
    assert_eq!(ten_or_more.greater_than(&Value::from(5i64)), Value::TRUE);
    assert_eq!(ten_or_more.less_than(&Value::from(20i64)), unknown_bool());
    assert_eq!(ten_or_more.greater_than_or_equal_to(&Value::from(10i64)), Value::TRUE);
    assert_eq!(ten_or_more.greater_than(&Value::from(10i64)), unknown_bool());

    assert_eq!(between(1, 3).less_than(&between(5, 8)), Value::TRUE);
    assert_eq!(between(1, 5).less_than(&between(5, 8)), unknown_bool());
    assert_eq!(between(1, 5).less_than_or_equal_to(&between(5, 8)), Value::TRUE);
}

#[test]
fn arithmetic() -> Result<()> {
    assert_eq!(Value::from(2i64).add(&Value::from(3i64)), Value::from(5i64));
    assert_eq!(num("0.1").add(&num("0.2")), num("0.3"));
    assert_eq!(Value::from(2i64).subtract(&Value::from(5i64)), Value::from(-3i64));
    assert_eq!(num("1.5").multiply(&Value::from(4i64)), Value::from(6i64));
    assert_eq!(Value::from(1i64).divide(&Value::from(4i64)), num("0.25"));
    assert_eq!(Value::from(7i64).modulo(&Value::from(3i64)), Value::from(1i64));
    assert_eq!(Value::from(-7i64).modulo(&Value::from(3i64)), Value::from(-1i64));
    assert_eq!(Value::from(3i64).negate(), Value::from(-3i64));
    assert_eq!(Value::from(-3i64).absolute(), Value::from(3i64));
    Ok(())
}

#[test]
fn big_numbers_are_exact() {
    let big = num("123456789012345678901234567890");
    assert_eq!(big.add(&Value::from(1i64)), num("123456789012345678901234567891"));
}

#[test]
fn division_by_zero() {
    assert_eq!(
        Value::from(1i64).divide(&Value::zero()),
        Value::positive_infinity()
    );
    assert_eq!(
        Value::from(-1i64).divide(&Value::zero()),
        Value::negative_infinity()
    );
}

#[test]
#[should_panic(expected = "divide")]
fn zero_over_zero() {
    let _ = Value::zero().divide(&Value::zero());
}

#[test]
#[should_panic(expected = "modulo")]
fn modulo_by_zero() {
    let _ = Value::from(1i64).modulo(&Value::zero());
}

#[test]
fn arithmetic_on_ranges() {
    let sum = between(1, 3).add(&between(10, 20));
    let rng = sum.range();
    assert_eq!(rng.number_lower_bound(), (Value::from(11i64), true));
    assert_eq!(rng.number_upper_bound(), (Value::from(23i64), true));
    assert!(rng.definitely_not_null());

    let diff = between(1, 3).subtract(&Value::from(1i64));
    assert_eq!(diff.range().number_lower_bound().0, Value::zero());
    assert_eq!(diff.range().number_upper_bound().0, Value::from(2i64));

    let product = between(-2, 3).multiply(&Value::from(2i64));
    assert_eq!(product.range().number_lower_bound().0, Value::from(-4i64));
    assert_eq!(product.range().number_upper_bound().0, Value::from(6i64));
}

#[test]
fn unknown_arithmetic() {
    let u = Value::unknown(Type::NUMBER);
    let sum = u.add(&Value::from(1i64));
    assert!(!sum.is_known());
    assert!(sum.range().definitely_not_null());
    assert_eq!(sum.range().number_lower_bound(), (Value::negative_infinity(), true));

    let neg = between(1, 3).negate();
    assert_eq!(neg.range().number_lower_bound().0, Value::from(-3i64));
    assert_eq!(neg.range().number_upper_bound().0, Value::from(-1i64));

    let abs = u.absolute();
    assert_eq!(abs.range().number_lower_bound(), (Value::zero(), true));

    assert!(!Value::DYNAMIC.add(&Value::from(1i64)).is_known());
}

#[test]
#[should_panic(expected = "operand is null")]
fn arithmetic_on_null() {
    let _ = Value::from(1i64).add(&Value::null(Type::NUMBER));
}

#[test]
fn marks_propagate() {
    let a = Mark::new("a");
    let b = Mark::new("b");
    let sum = Value::from(1i64)
        .mark(a.clone())
        .add(&Value::from(2i64).mark(b.clone()));
    assert!(sum.has_mark(&a));
    assert!(sum.has_mark(&b));
    assert_eq!(sum.unmark().0, Value::from(3i64));
}

#[test]
fn length_of_unknown_collections() {
    let u = Value::unknown(Type::list(Type::STRING))
        .refine()
        .collection_length_lower_bound(1)
        .collection_length_upper_bound(3)
        .new_value();
    let len = u.length();
    assert!(!len.is_known());
    assert_eq!(len.range().number_lower_bound().0, Value::from(1i64));
    assert_eq!(len.range().number_upper_bound().0, Value::from(3i64));

    let exact = Value::unknown(Type::map(Type::STRING))
        .refine()
        .collection_length(2)
        .new_value();
    assert_eq!(exact.length(), Value::from(2i64));

    let tuple = Value::unknown(Type::tuple(vec![Type::BOOL, Type::BOOL]));
    assert_eq!(tuple.length(), Value::from(2i64));
}

#[test]
fn length_of_sets_with_unknowns() {
    let set = Value::set(vec![
        Value::from("a"),
        Value::unknown(Type::STRING),
        Value::unknown(Type::STRING),
    ]);
    assert_eq!(set.length_int(), 3);
    let len = set.length();
    assert!(!len.is_known());
    assert_eq!(len.range().number_lower_bound().0, Value::from(1i64));
    assert_eq!(len.range().number_upper_bound().0, Value::from(3i64));

    let single = Value::set(vec![Value::unknown(Type::STRING)]);
    assert_eq!(single.length(), Value::from(1i64));
}

#[test]
#[should_panic(expected = "not a collection type")]
fn length_of_string() {
    let _ = Value::from("abc").length();
}

#[test]
fn has_index() {
    let list = Value::list(vec![Value::from(1i64)]);
    assert_eq!(list.has_index(&Value::from(0i64)), Value::TRUE);
    assert_eq!(list.has_index(&Value::from(1i64)), Value::FALSE);
    assert_eq!(list.has_index(&Value::from(-1i64)), Value::FALSE);
    assert_eq!(list.has_index(&Value::from("0")), Value::FALSE);
    assert_eq!(list.has_index(&Value::unknown(Type::NUMBER)), unknown_bool());
    assert_eq!(list.has_index(&Value::DYNAMIC), unknown_bool());

    let tuple = Value::unknown(Type::tuple(vec![Type::BOOL]));
    assert_eq!(tuple.has_index(&Value::from(0i64)), Value::TRUE);
}

#[test]
fn has_element() {
    let set = Value::set(vec![Value::from("a"), Value::from("b")]);
    assert_eq!(set.has_element(&Value::from("a")), Value::TRUE);
    assert_eq!(set.has_element(&Value::from("z")), Value::FALSE);
    assert_eq!(set.has_element(&Value::from(1i64)), Value::FALSE);
    assert_eq!(set.has_element(&Value::unknown(Type::STRING)), unknown_bool());

    let partial = Value::set(vec![Value::from("a"), Value::unknown(Type::STRING)]);
    assert_eq!(partial.has_element(&Value::from("a")), Value::TRUE);
    assert_eq!(partial.has_element(&Value::from("z")), unknown_bool());
}

#[test]
fn index_marks() {
    let mark = Mark::new("list");
    let list = Value::list(vec![Value::from(1i64).mark(mark.clone())]);
    assert!(list.has_mark(&mark));
    let elem = list.index(&Value::from(0i64));
    assert!(elem.has_mark(&mark));
}

#[test]
fn get_attr_normalizes_names() {
    let obj = Value::object([("caf\u{00e9}", Value::from(1i64))]);
    assert_eq!(obj.get_attr("cafe\u{0301}"), Value::from(1i64));
}
