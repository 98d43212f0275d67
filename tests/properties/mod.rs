// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use dynval::*;
use proptest::prelude::*;

fn number() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        (-1_000_000i64..1_000_000, 0u32..6).prop_map(|(m, scale)| {
            let text = format!("{m}e-{scale}");
            Value::parse_number(&text).unwrap_or_else(|_| Value::zero())
        }),
    ]
}

fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        number(),
        "[a-z\u{00e9}\u{0301}]{0,6}".prop_map(Value::from),
        Just(Value::null(Type::STRING)),
        Just(Value::unknown(Type::NUMBER)),
    ]
}

fn ty() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::BOOL),
        Just(Type::NUMBER),
        Just(Type::STRING),
        Just(Type::DYNAMIC),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Type::list),
            inner.clone().prop_map(Type::map),
            inner.clone().prop_map(Type::set),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Type::tuple),
            (prop::collection::btree_map("[a-c]{1,2}", inner, 0..4), any::<bool>()).prop_map(
                |(attrs, first_optional)| {
                    let optional: Vec<String> = attrs
                        .keys()
                        .take(usize::from(first_optional))
                        .cloned()
                        .collect();
                    Type::object_with_optional_attrs(attrs, optional)
                }
            ),
        ]
    })
}

proptest! {
    #[test]
    fn type_json_round_trips(t in ty()) {
        let json = t.to_json_str().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let parsed = Type::from_json_str(&json).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(parsed, t);
    }

    #[test]
    fn types_conform_to_themselves(t in ty()) {
        prop_assert!(t.test_conformance(&t).is_empty());
    }

    #[test]
    fn refinement_only_narrows(a in -50i64..50, b in -50i64..50) {
        let first = Value::unknown(Type::NUMBER)
            .refine()
            .number_range_lower_bound(&Value::from(a), true)
            .new_value();
        let second = first
            .refine()
            .number_range_lower_bound(&Value::from(b), true)
            .new_value();
        let (lower, _) = second.range().number_lower_bound();
        prop_assert_eq!(lower, Value::from(a.max(b)));
    }

    #[test]
    fn equality_is_symmetric(a in primitive(), b in primitive()) {
        prop_assert!(a.equals(&b).raw_equals(&b.equals(&a)));
    }

    #[test]
    fn known_values_equal_themselves(a in primitive()) {
        prop_assume!(a.is_known());
        prop_assert_eq!(a.equals(&a), Value::TRUE);
    }

    #[test]
    fn addition_commutes(a in number(), b in number()) {
        prop_assert_eq!(a.add(&b), b.add(&a));
    }

    #[test]
    fn subtraction_undoes_addition(a in number(), b in number()) {
        prop_assert_eq!(a.add(&b).subtract(&b), a);
    }

    #[test]
    fn comparison_is_consistent(a in number(), b in number()) {
        let lt = a.less_than(&b).as_bool();
        let ge = a.greater_than_or_equal_to(&b).as_bool();
        prop_assert_ne!(lt, ge);
    }

    #[test]
    fn normalization_is_idempotent(s in "\\PC{0,12}") {
        let once = normalize_string(&s);
        prop_assert_eq!(normalize_string(&once), once);
    }

    #[test]
    fn sets_hold_distinct_elements(xs in prop::collection::vec(0i64..20, 1..30)) {
        let set = Value::set(xs.iter().copied().map(Value::from).collect());
        let mut distinct = xs.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(set.length_int(), distinct.len());
        for x in xs {
            prop_assert_eq!(set.has_element(&Value::from(x)), Value::TRUE);
        }
    }

    #[test]
    fn known_values_are_in_their_own_range(a in number()) {
        prop_assert_ne!(a.range().includes(&a), Value::FALSE);
    }

    #[test]
    fn refined_bounds_are_respected(lo in -100i64..100, width in 1i64..100, x in -300i64..300) {
        let v = Value::unknown(Type::NUMBER)
            .refine()
            .not_null()
            .number_range_inclusive(&Value::from(lo), &Value::from(lo + width))
            .new_value();
        let inside = x >= lo && x <= lo + width;
        let eq = v.equals(&Value::from(x));
        if inside {
            prop_assert!(!eq.is_known());
        } else {
            prop_assert_eq!(eq, Value::FALSE);
        }
    }
}
