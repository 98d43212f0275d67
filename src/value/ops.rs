// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Operations on values.
//!
//! Operations accept marked operands and carry their marks over to the
//! result. Unknown operands give unknown results, refined as far as the
//! operands' ranges allow.

use crate::number::{Number, NumberError};
use crate::unicode::normalize_string;
use crate::value::Repr;
use crate::{Type, Value, ValueMarks, ValueRange};

type NumberOp = fn(&Number, &Number) -> Result<Number, NumberError>;

// Panics on operands of the wrong type or known nulls. Returns whether any
// operand is unknown.
fn check_operands(op: &str, want: &Type, operands: &[&Value]) -> bool {
    let mut unknown = false;
    for v in operands {
        if v.ty != *want && !v.ty.is_dynamic() {
            panic!("{op}: operand of type {:?} must be {want:?}", v.ty);
        }
        if v.is_null() {
            panic!("{op}: operand is null");
        }
        unknown |= !v.is_known();
    }
    unknown
}

fn merge(mut a: ValueMarks, b: ValueMarks) -> ValueMarks {
    a.extend(b);
    a
}

fn unknown_bool() -> Value {
    Value::unknown(Type::BOOL).refine_not_null()
}

fn unknown_number() -> Value {
    Value::unknown(Type::NUMBER).refine_not_null()
}

// Decides `lhs < rhs` (or `<=`) from the operands' numeric ranges when the
// ranges do not overlap.
fn compare_ranges(lhs: &ValueRange, rhs: &ValueRange, or_equal: bool) -> Option<bool> {
    let (l_lo, l_hi) = lhs.number_bounds()?;
    let (r_lo, r_hi) = rhs.number_bounds()?;
    if or_equal {
        if l_hi.value <= r_lo.value {
            return Some(true);
        }
        if l_lo.value > r_hi.value
            || (l_lo.value == r_hi.value && (!l_lo.inclusive || !r_hi.inclusive))
        {
            return Some(false);
        }
    } else {
        if l_hi.value < r_lo.value
            || (l_hi.value == r_lo.value && (!l_hi.inclusive || !r_lo.inclusive))
        {
            return Some(true);
        }
        if l_lo.value >= r_hi.value {
            return Some(false);
        }
    }
    None
}

// Bounds of `op` applied to every combination of the operands' bounds.
fn range_arithmetic(op: NumberOp, a: &ValueRange, b: &ValueRange) -> Option<(Number, Number)> {
    let (a_lo, a_hi) = a.number_bounds()?;
    let (b_lo, b_hi) = b.number_bounds()?;
    let results = [
        op(&a_lo.value, &b_lo.value).ok()?,
        op(&a_lo.value, &b_hi.value).ok()?,
        op(&a_hi.value, &b_lo.value).ok()?,
        op(&a_hi.value, &b_hi.value).ok()?,
    ];
    let min = results.iter().min()?.clone();
    let max = results.iter().max()?.clone();
    Some((min, max))
}

fn refine_number_range(v: Value, lower: Option<Number>, upper: Option<Number>) -> Value {
    let mut builder = v.refine();
    if let Some(lower) = lower.filter(|n| *n != Number::NegInfinity) {
        builder = builder.number_range_lower_bound(&Value::number(lower), true);
    }
    if let Some(upper) = upper.filter(|n| *n != Number::PosInfinity) {
        builder = builder.number_range_upper_bound(&Value::number(upper), true);
    }
    builder.new_value()
}

impl Value {
    /// # Panics
    /// If the operand is not a bool or is null.
    pub fn not(&self) -> Value {
        let (v, marks) = self.unmark();
        if check_operands("not", &Type::BOOL, &[&v]) {
            return unknown_bool().mark_with_marks(marks);
        }
        Value::bool(!v.as_bool()).mark_with_marks(marks)
    }

    /// Logical and. A known false operand decides the result even when the
    /// other operand is unknown.
    ///
    /// # Panics
    /// If an operand is not a bool or is null.
    pub fn and(&self, other: &Value) -> Value {
        let (a, a_marks) = self.unmark();
        let (b, b_marks) = other.unmark();
        let marks = merge(a_marks, b_marks);
        if check_operands("and", &Type::BOOL, &[&a, &b]) {
            if a.known_bool() == Some(false) || b.known_bool() == Some(false) {
                return Value::FALSE.mark_with_marks(marks);
            }
            return unknown_bool().mark_with_marks(marks);
        }
        Value::bool(a.as_bool() && b.as_bool()).mark_with_marks(marks)
    }

    /// Logical or. A known true operand decides the result even when the
    /// other operand is unknown.
    ///
    /// # Panics
    /// If an operand is not a bool or is null.
    pub fn or(&self, other: &Value) -> Value {
        let (a, a_marks) = self.unmark();
        let (b, b_marks) = other.unmark();
        let marks = merge(a_marks, b_marks);
        if check_operands("or", &Type::BOOL, &[&a, &b]) {
            if a.known_bool() == Some(true) || b.known_bool() == Some(true) {
                return Value::TRUE.mark_with_marks(marks);
            }
            return unknown_bool().mark_with_marks(marks);
        }
        Value::bool(a.as_bool() || b.as_bool()).mark_with_marks(marks)
    }

    pub fn not_equal(&self, other: &Value) -> Value {
        self.equals(other).not()
    }

    fn compare(&self, other: &Value, op: &str, or_equal: bool) -> Value {
        let (a, a_marks) = self.unmark();
        let (b, b_marks) = other.unmark();
        let marks = merge(a_marks, b_marks);
        if check_operands(op, &Type::NUMBER, &[&a, &b]) {
            return match compare_ranges(&a.range(), &b.range(), or_equal) {
                Some(result) => Value::bool(result),
                None => unknown_bool(),
            }
            .mark_with_marks(marks);
        }
        let (x, y) = (a.as_number(), b.as_number());
        Value::bool(if or_equal { x <= y } else { x < y }).mark_with_marks(marks)
    }

    /// # Panics
    /// If an operand is not a number or is null.
    pub fn less_than(&self, other: &Value) -> Value {
        self.compare(other, "less_than", false)
    }

    /// # Panics
    /// If an operand is not a number or is null.
    pub fn greater_than(&self, other: &Value) -> Value {
        other.compare(self, "greater_than", false)
    }

    /// # Panics
    /// If an operand is not a number or is null.
    pub fn less_than_or_equal_to(&self, other: &Value) -> Value {
        self.compare(other, "less_than_or_equal_to", true)
    }

    /// # Panics
    /// If an operand is not a number or is null.
    pub fn greater_than_or_equal_to(&self, other: &Value) -> Value {
        other.compare(self, "greater_than_or_equal_to", true)
    }

    fn arithmetic(&self, other: &Value, op: &str, f: NumberOp, bounded: bool) -> Value {
        let (a, a_marks) = self.unmark();
        let (b, b_marks) = other.unmark();
        let marks = merge(a_marks, b_marks);
        if check_operands(op, &Type::NUMBER, &[&a, &b]) {
            let result = match range_arithmetic(f, &a.range(), &b.range()) {
                Some((lower, upper)) if bounded => {
                    refine_number_range(unknown_number(), Some(lower), Some(upper))
                }
                _ => unknown_number(),
            };
            return result.mark_with_marks(marks);
        }
        match f(a.as_number(), b.as_number()) {
            Ok(n) => Value::number(n).mark_with_marks(marks),
            Err(e) => panic!("{op}: {e}"),
        }
    }

    /// # Panics
    /// If an operand is not a number or is null, or the sum is undefined.
    pub fn add(&self, other: &Value) -> Value {
        self.arithmetic(other, "add", Number::add, true)
    }

    /// # Panics
    /// If an operand is not a number or is null, or the difference is
    /// undefined.
    pub fn subtract(&self, other: &Value) -> Value {
        self.arithmetic(other, "subtract", Number::sub, true)
    }

    /// # Panics
    /// If an operand is not a number or is null, or the product is undefined.
    pub fn multiply(&self, other: &Value) -> Value {
        self.arithmetic(other, "multiply", Number::mul, true)
    }

    /// Division by zero gives an infinity of the dividend's sign.
    ///
    /// # Panics
    /// If an operand is not a number or is null, or the quotient is
    /// undefined (`0/0`, `inf/inf`).
    pub fn divide(&self, other: &Value) -> Value {
        self.arithmetic(other, "divide", Number::divide, false)
    }

    /// Remainder of truncated division.
    ///
    /// # Panics
    /// If an operand is not a number or is null, or `other` is zero.
    pub fn modulo(&self, other: &Value) -> Value {
        self.arithmetic(other, "modulo", Number::modulo, false)
    }

    /// # Panics
    /// If the operand is not a number or is null.
    pub fn negate(&self) -> Value {
        let (v, marks) = self.unmark();
        if check_operands("negate", &Type::NUMBER, &[&v]) {
            let bounds = v.range().number_bounds();
            let result = match bounds {
                Some((lo, hi)) => {
                    refine_number_range(unknown_number(), Some(hi.value.neg()), Some(lo.value.neg()))
                }
                None => unknown_number(),
            };
            return result.mark_with_marks(marks);
        }
        Value::number(v.as_number().neg()).mark_with_marks(marks)
    }

    /// # Panics
    /// If the operand is not a number or is null.
    pub fn absolute(&self) -> Value {
        let (v, marks) = self.unmark();
        if check_operands("absolute", &Type::NUMBER, &[&v]) {
            return refine_number_range(unknown_number(), Some(Number::zero()), None)
                .mark_with_marks(marks);
        }
        Value::number(v.as_number().abs()).mark_with_marks(marks)
    }

    /// The number of elements in a collection or tuple, as a number value.
    ///
    /// The length of an unknown collection is unknown but bounded by the
    /// collection's refined length. A known set whose unknown elements may
    /// still turn out equal to others has an unknown length of at least one.
    ///
    /// # Panics
    /// If the value is not a collection or tuple, or is null.
    pub fn length(&self) -> Value {
        let (v, marks) = self.unmark();
        if v.ty.is_tuple_type() {
            return Value::from(v.ty.tuple_len()).mark_with_marks(marks);
        }
        if !v.is_known() {
            if !v.ty.is_collection_type() && !v.ty.is_dynamic() {
                panic!("length: {:?} is not a collection type", v.ty);
            }
            let rng = v.range();
            let upper = rng.length_upper_bound().map(Number::from);
            return refine_number_range(
                unknown_number(),
                Some(Number::from(rng.length_lower_bound())),
                upper,
            )
            .mark_with_marks(marks);
        }
        if let Repr::Set(set) = &v.v {
            let store_len = set.len();
            if store_len == 1 || set.is_wholly_known() {
                return Value::from(store_len).mark_with_marks(marks);
            }
            return unknown_number()
                .refine()
                .number_range_inclusive(&Value::number_int(1), &Value::from(store_len))
                .new_value()
                .mark_with_marks(marks);
        }
        Value::from(v.length_int()).mark_with_marks(marks)
    }

    /// The number of elements in a known collection, tuple or object.
    ///
    /// Unlike [`Value::length`], every element stored in a set counts, even
    /// unknown ones that might later coalesce with others.
    ///
    /// # Panics
    /// If the value is marked, unknown, null or not a collection.
    pub fn length_int(&self) -> usize {
        if self.is_marked() {
            panic!("length_int: value is marked, so must be unmarked first");
        }
        if self.ty.is_tuple_type() {
            return self.ty.tuple_len();
        }
        if self.ty.is_object_type() {
            return self.ty.attribute_types().len();
        }
        match &self.v {
            Repr::Null => panic!("length_int: value is null"),
            Repr::Unknown(_) => panic!("length_int: value is unknown"),
            Repr::Seq(elems) => elems.len(),
            Repr::Map(elems) => elems.len(),
            Repr::Set(set) => set.len(),
            _ => panic!("length_int: {:?} is not a collection type", self.ty),
        }
    }

    /// The element of a list, map or tuple at `key`.
    ///
    /// # Panics
    /// If the value is not a list, map or tuple, is null, the key has the
    /// wrong type, or there is no element at `key`.
    pub fn index(&self, key: &Value) -> Value {
        let (v, v_marks) = self.unmark();
        let (key, key_marks) = key.unmark();
        let marks = merge(v_marks, key_marks);
        if v.ty.is_dynamic() {
            return Value::DYNAMIC.mark_with_marks(marks);
        }
        if v.is_null() {
            panic!("index: value is null");
        }

        let elem = match &v.ty {
            Type::List(elem_ty) => {
                check_key("list", &key, &Type::NUMBER);
                if !key.is_known() || !v.is_known() {
                    return Value::unknown(elem_ty.as_ref().clone()).mark_with_marks(marks);
                }
                let Repr::Seq(elems) = &v.v else {
                    panic!("index: corrupt list value")
                };
                elems[seq_index(&key, elems.len(), "list")].clone()
            }
            Type::Map(elem_ty) => {
                check_key("map", &key, &Type::STRING);
                if !key.is_known() || !v.is_known() {
                    return Value::unknown(elem_ty.as_ref().clone()).mark_with_marks(marks);
                }
                let Repr::Map(elems) = &v.v else {
                    panic!("index: corrupt map value")
                };
                let name = key.as_string();
                match elems.get(name) {
                    Some(elem) => elem.clone(),
                    None => panic!("index: map has no element for key {name:?}"),
                }
            }
            Type::Tuple(elem_tys) => {
                check_key("tuple", &key, &Type::NUMBER);
                if !key.is_known() {
                    return Value::DYNAMIC.mark_with_marks(marks);
                }
                let idx = seq_index(&key, elem_tys.len(), "tuple");
                match &v.v {
                    Repr::Seq(elems) => elems[idx].clone(),
                    _ => Value::unknown(elem_tys[idx].clone()),
                }
            }
            _ => panic!("index: {:?} is not a list, map or tuple type", v.ty),
        };
        elem.mark_with_marks(marks)
    }

    /// Whether [`Value::index`] would find an element at `key`.
    ///
    /// # Panics
    /// If the value is not a list, map or tuple, or is null.
    pub fn has_index(&self, key: &Value) -> Value {
        let (v, v_marks) = self.unmark();
        let (key, key_marks) = key.unmark();
        let marks = merge(v_marks, key_marks);
        if v.ty.is_dynamic() || key.ty.is_dynamic() {
            return unknown_bool().mark_with_marks(marks);
        }
        if v.is_null() {
            panic!("has_index: value is null");
        }

        let result = match &v.ty {
            Type::List(_) | Type::Tuple(_) => {
                if key.ty != Type::NUMBER {
                    Value::FALSE
                } else if !key.is_known() || (v.ty.is_list_type() && !v.is_known()) {
                    unknown_bool()
                } else {
                    let len = match &v.v {
                        Repr::Seq(elems) => elems.len(),
                        _ => v.ty.tuple_len(),
                    };
                    match key.as_number().as_usize() {
                        Some(idx) => Value::bool(idx < len),
                        None => Value::FALSE,
                    }
                }
            }
            Type::Map(_) => {
                if key.ty != Type::STRING {
                    Value::FALSE
                } else if !key.is_known() || !v.is_known() {
                    unknown_bool()
                } else {
                    match &v.v {
                        Repr::Map(elems) => Value::bool(elems.contains_key(key.as_string())),
                        _ => panic!("has_index: corrupt map value"),
                    }
                }
            }
            _ => panic!("has_index: {:?} is not a list, map or tuple type", v.ty),
        };
        result.mark_with_marks(marks)
    }

    /// The named attribute of an object. The name is NFC-normalized first.
    ///
    /// # Panics
    /// If the value is not an object, is null, or has no such attribute.
    pub fn get_attr(&self, name: &str) -> Value {
        let (v, marks) = self.unmark();
        if v.ty.is_dynamic() {
            return Value::DYNAMIC.mark_with_marks(marks);
        }
        if !v.ty.is_object_type() {
            panic!("get_attr: {:?} is not an object type", v.ty);
        }
        let name = normalize_string(name);
        let attr_ty = v.ty.attribute_type(&name);
        match &v.v {
            Repr::Null => panic!("get_attr: can't get attribute {name:?} of a null value"),
            Repr::Unknown(_) => Value::unknown(attr_ty.clone()).mark_with_marks(marks),
            Repr::Map(attrs) => match attrs.get(&name) {
                Some(attr) => attr.clone().mark_with_marks(marks),
                None => panic!("get_attr: corrupt object value"),
            },
            _ => panic!("get_attr: corrupt object value"),
        }
    }

    /// Whether a set contains `elem`. The result is unknown when the set or
    /// element is not wholly known and no equal element is found.
    ///
    /// # Panics
    /// If the value is not a set, or is null.
    pub fn has_element(&self, elem: &Value) -> Value {
        let (v, v_marks) = self.unmark();
        let (elem, elem_marks) = elem.unmark_deep();
        let marks = merge(v_marks, elem_marks);
        if v.is_null() {
            panic!("has_element: value is null");
        }
        let Type::Set(elem_ty) = &v.ty else {
            panic!("has_element: {:?} is not a set type", v.ty)
        };
        if !v.is_known() || !elem.is_known() {
            return unknown_bool().mark_with_marks(marks);
        }
        if **elem_ty != elem.ty && !elem_ty.is_dynamic() && !elem.ty.is_dynamic() {
            return Value::FALSE.mark_with_marks(marks);
        }
        let Repr::Set(set) = &v.v else {
            panic!("has_element: corrupt set value")
        };
        let result = if set.has(&elem) {
            Value::TRUE
        } else if !set.is_wholly_known() || !elem.is_wholly_known() {
            unknown_bool()
        } else {
            Value::FALSE
        };
        result.mark_with_marks(marks)
    }
}

fn check_key(kind: &str, key: &Value, want: &Type) {
    if key.ty != *want && !key.ty.is_dynamic() {
        panic!("index: element key for {kind} must be {want:?}, not {:?}", key.ty);
    }
    if key.is_null() {
        panic!("index: element key for {kind} is null");
    }
}

fn seq_index(key: &Value, len: usize, kind: &str) -> usize {
    let n = key.as_number();
    match n.as_usize() {
        Some(idx) if idx < len => idx,
        _ => panic!("index: {n} is out of range for {kind} of length {len}"),
    }
}
