// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::refinement::{Bound, Refinement};
use crate::value::Repr;
use crate::{Tristate, Type, Value};

/// What is known about the range of possible values a value could take.
///
/// For an unknown value this reflects its refinement. A known value has the
/// narrowest possible range, so callers can treat known and unknown values
/// alike.
#[derive(Clone, Debug)]
pub struct ValueRange {
    ty: Type,
    raw: Refinement,
}

impl Value {
    /// The range of the value. Marks are ignored.
    pub fn range(&self) -> ValueRange {
        let ty = self.ty.clone();
        let raw = match &self.v {
            Repr::Unknown(Some(r)) => r.as_ref().clone(),
            Repr::Unknown(None) => Refinement::for_type(&ty),
            Repr::Null => {
                let mut r = Refinement::for_type(&ty);
                r.set_null(Tristate::True);
                r
            }
            Repr::String(s) => Refinement::String {
                null: Tristate::False,
                prefix: s.to_string(),
            },
            Repr::Number(n) => Refinement::Number {
                null: Tristate::False,
                lower: Bound::exactly(n),
                upper: Bound::exactly(n),
            },
            Repr::Seq(elems) if ty.is_list_type() => exact_length(elems.len()),
            Repr::Map(elems) if ty.is_map_type() => exact_length(elems.len()),
            Repr::Set(set) => exact_length(set.len()),
            _ => Refinement::Nullable {
                null: Tristate::False,
            },
        };
        ValueRange { ty, raw }
    }
}

fn exact_length(len: usize) -> Refinement {
    Refinement::Collection {
        null: Tristate::False,
        min_len: len,
        max_len: Some(len),
    }
}

impl ValueRange {
    pub fn type_constraint(&self) -> &Type {
        &self.ty
    }

    pub fn nullness(&self) -> Tristate {
        self.raw.null()
    }

    pub fn could_be_null(&self) -> bool {
        self.raw.null() != Tristate::False
    }

    pub fn definitely_not_null(&self) -> bool {
        self.raw.null() == Tristate::False
    }

    fn assert_type(&self, want: &Type, what: &str) {
        if self.ty != *want {
            panic!("{what} called on range of {:?}", self.ty);
        }
    }

    pub(crate) fn number_bounds(&self) -> Option<(Bound, Bound)> {
        match &self.raw {
            Refinement::Number { lower, upper, .. } => Some((lower.clone(), upper.clone())),
            _ => None,
        }
    }

    /// The lower bound of a number and whether it is inclusive. Unbounded
    /// ranges report negative infinity. A range of unknown type reports an
    /// unknown bound.
    ///
    /// # Panics
    /// If the range is for a type other than number or dynamic.
    pub fn number_lower_bound(&self) -> (Value, bool) {
        if self.ty.is_dynamic() {
            return (Value::unknown(Type::NUMBER), false);
        }
        self.assert_type(&Type::NUMBER, "number_lower_bound");
        match self.number_bounds() {
            Some((lower, _)) => (Value::number(lower.value), lower.inclusive),
            None => (Value::negative_infinity(), true),
        }
    }

    /// The upper bound of a number and whether it is inclusive.
    ///
    /// # Panics
    /// If the range is for a type other than number or dynamic.
    pub fn number_upper_bound(&self) -> (Value, bool) {
        if self.ty.is_dynamic() {
            return (Value::unknown(Type::NUMBER), false);
        }
        self.assert_type(&Type::NUMBER, "number_upper_bound");
        match self.number_bounds() {
            Some((_, upper)) => (Value::number(upper.value), upper.inclusive),
            None => (Value::positive_infinity(), true),
        }
    }

    /// A prefix every possible string starts with, possibly empty.
    ///
    /// # Panics
    /// If the range is for a type other than string or dynamic.
    pub fn string_prefix(&self) -> &str {
        if self.ty.is_dynamic() {
            return "";
        }
        self.assert_type(&Type::STRING, "string_prefix");
        match &self.raw {
            Refinement::String { prefix, .. } => prefix,
            _ => "",
        }
    }

    /// # Panics
    /// If the range is not for a collection type or dynamic.
    pub fn length_lower_bound(&self) -> usize {
        if self.ty.is_dynamic() {
            return 0;
        }
        if !self.ty.is_collection_type() {
            panic!("length_lower_bound called on range of {:?}", self.ty);
        }
        match &self.raw {
            Refinement::Collection { min_len, .. } => *min_len,
            _ => 0,
        }
    }

    /// The largest possible length, or `None` when unbounded.
    ///
    /// # Panics
    /// If the range is not for a collection type or dynamic.
    pub fn length_upper_bound(&self) -> Option<usize> {
        if self.ty.is_dynamic() {
            return None;
        }
        if !self.ty.is_collection_type() {
            panic!("length_upper_bound called on range of {:?}", self.ty);
        }
        match &self.raw {
            Refinement::Collection { max_len, .. } => *max_len,
            _ => None,
        }
    }

    /// Whether `v` is inside the range: known true, known false, or unknown.
    ///
    /// A known true result is only given for null values checked against
    /// ranges that admit null. Otherwise the result is false when the range
    /// excludes `v`, and unknown when it cannot tell.
    pub fn includes(&self, v: &Value) -> Value {
        let (v, _) = v.unmark_deep();
        let unknown = Value::unknown(Type::BOOL).refine_not_null();

        match self.raw.null() {
            Tristate::True => return Value::bool(v.is_null()),
            Tristate::False if v.is_null() => return Value::FALSE,
            _ => {}
        }
        if v.is_null() {
            return Value::TRUE;
        }
        if v.ty.is_dynamic() {
            return unknown;
        }
        if !v.ty.test_conformance(&self.ty).is_empty() {
            return Value::FALSE;
        }

        match &self.raw {
            Refinement::Nullable { .. } => {}
            Refinement::String { prefix, .. } => {
                if let Some(s) = v.known_str() {
                    if !s.starts_with(prefix.as_str()) {
                        return Value::FALSE;
                    }
                }
            }
            Refinement::Number { lower, upper, .. } => {
                let min = Value::number(lower.value.clone());
                let max = Value::number(upper.value.clone());
                let min_ok = if lower.inclusive {
                    v.greater_than_or_equal_to(&min)
                } else {
                    v.greater_than(&min)
                };
                let max_ok = if upper.inclusive {
                    v.less_than_or_equal_to(&max)
                } else {
                    v.less_than(&max)
                };
                if min_ok.known_bool() == Some(false) || max_ok.known_bool() == Some(false) {
                    return Value::FALSE;
                }
            }
            Refinement::Collection {
                min_len, max_len, ..
            } => {
                let len = v.length();
                if len.less_than(&Value::from(*min_len)).known_bool() == Some(true) {
                    return Value::FALSE;
                }
                if let Some(max_len) = max_len {
                    if len.greater_than(&Value::from(*max_len)).known_bool() == Some(true) {
                        return Value::FALSE;
                    }
                }
            }
        }
        unknown
    }
}
