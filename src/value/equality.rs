// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Repr;
use crate::{Rc, Type, Value};

impl Value {
    /// Compares two values for equality, returning a bool value.
    ///
    /// Nulls of any type are equal to each other. The result is unknown when
    /// either side is unknown, unless the unknown side's range shows that
    /// the two can never be equal. Marks from both sides, at any depth, are
    /// carried by the result.
    ///
    /// # Panics
    /// If a capsule `equals` hook returns something other than a bool.
    pub fn equals(&self, other: &Value) -> Value {
        if self.contains_marked() || other.contains_marked() {
            let (lhs, mut marks) = self.unmark_deep();
            let (rhs, rhs_marks) = other.unmark_deep();
            marks.extend(rhs_marks);
            return lhs.equals(&rhs).mark_with_marks(marks);
        }
        equals_unmarked(self, other)
    }

    /// Exact comparison of two values, including types, marks and
    /// refinements. No value is treated as unknown here: two unknown values
    /// are equal when their types and refinements are.
    pub fn raw_equals(&self, other: &Value) -> bool {
        if self.ty != other.ty || !self.has_same_marks(other) {
            return false;
        }
        match (&self.v, &other.v) {
            (Repr::Null, Repr::Null) => true,
            (Repr::Unknown(_), Repr::Unknown(_)) => self.refinement() == other.refinement(),
            (Repr::Bool(a), Repr::Bool(b)) => a == b,
            (Repr::Number(a), Repr::Number(b)) => a == b,
            (Repr::String(a), Repr::String(b)) => a == b,
            (Repr::Seq(a), Repr::Seq(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.raw_equals(y)))
            }
            (Repr::Map(a), Repr::Map(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter()
                            .zip(b.iter())
                            .all(|((ka, va), (kb, vb))| ka == kb && va.raw_equals(vb)))
            }
            (Repr::Set(a), Repr::Set(b)) => {
                // Set order is deterministic, so equal sets list equal values
                // at the same positions.
                let (a, b) = (a.values(), b.values());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.raw_equals(y))
            }
            (Repr::Capsule(a), Repr::Capsule(b)) => match self.ty.capsule_ops().raw_equals {
                Some(hook) => hook(a.as_ref(), b.as_ref()),
                None => same_native(a, b),
            },
            _ => false,
        }
    }

    /// Whether the value's type, and the type of every nested value, is
    /// known. A null value always has a wholly known type.
    pub fn has_wholly_known_type(&self) -> bool {
        match &self.v {
            Repr::Null => true,
            Repr::Unknown(_) => !self.ty.has_dynamic_types(),
            Repr::Seq(elems) => elems.iter().all(Value::has_wholly_known_type),
            Repr::Map(elems) => elems.values().all(Value::has_wholly_known_type),
            Repr::Set(set) => set.iter().all(Value::has_wholly_known_type),
            _ => true,
        }
    }
}

/// Exact equality, as [`Value::raw_equals`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.raw_equals(other)
    }
}

pub(crate) fn same_native(
    a: &Rc<dyn core::any::Any + Send + Sync>,
    b: &Rc<dyn core::any::Any + Send + Sync>,
) -> bool {
    core::ptr::eq(
        Rc::as_ptr(a) as *const u8,
        Rc::as_ptr(b) as *const u8,
    )
}

fn unknown_bool() -> Value {
    Value::unknown(Type::BOOL).refine_not_null()
}

fn equals_unmarked(lhs: &Value, rhs: &Value) -> Value {
    match (lhs.is_known(), rhs.is_known()) {
        (false, false) => return unknown_bool(),
        (true, false) => return equals_known_unknown(lhs, rhs),
        (false, true) => return equals_known_unknown(rhs, lhs),
        (true, true) => {}
    }

    match (lhs.is_null(), rhs.is_null()) {
        (true, true) => return Value::TRUE,
        (true, false) | (false, true) => return Value::FALSE,
        (false, false) => {}
    }

    if !lhs.has_wholly_known_type() || !rhs.has_wholly_known_type() {
        return unknown_bool();
    }
    // A dynamic element type may still settle on the other side's type.
    if lhs.ty.has_dynamic_types() || rhs.ty.has_dynamic_types() {
        return unknown_bool();
    }
    if lhs.ty != rhs.ty {
        return Value::FALSE;
    }

    match (&lhs.v, &rhs.v) {
        (Repr::Bool(a), Repr::Bool(b)) => Value::bool(a == b),
        (Repr::Number(a), Repr::Number(b)) => Value::bool(a == b),
        (Repr::String(a), Repr::String(b)) => Value::bool(a == b),
        (Repr::Seq(a), Repr::Seq(b)) => {
            if a.len() != b.len() {
                return Value::FALSE;
            }
            all_equal(a.iter().zip(b.iter()))
        }
        (Repr::Map(a), Repr::Map(b)) => {
            if a.len() != b.len() || a.keys().ne(b.keys()) {
                return Value::FALSE;
            }
            all_equal(a.values().zip(b.values()))
        }
        (Repr::Set(a), Repr::Set(b)) => {
            if !a.is_wholly_known() || !b.is_wholly_known() {
                // Unknown elements may still coalesce with others.
                return unknown_bool();
            }
            let equal = a.len() == b.len()
                && a.iter().all(|v| b.has(v))
                && b.iter().all(|v| a.has(v));
            Value::bool(equal)
        }
        (Repr::Capsule(a), Repr::Capsule(b)) => {
            let ops = lhs.ty.capsule_ops();
            if let Some(hook) = ops.equals {
                let result = hook(a.as_ref(), b.as_ref());
                if result.ty != Type::BOOL {
                    panic!("capsule equals hook returned {:?}, not a bool", result.ty);
                }
                return result;
            }
            match ops.raw_equals {
                Some(hook) => Value::bool(hook(a.as_ref(), b.as_ref())),
                None => Value::bool(same_native(a, b)),
            }
        }
        _ => Value::FALSE,
    }
}

// Any known false decides the comparison, even when other pairs are unknown.
fn all_equal<'a>(pairs: impl Iterator<Item = (&'a Value, &'a Value)>) -> Value {
    let mut unknown = false;
    for (a, b) in pairs {
        let eq = a.equals(b);
        match eq.known_bool() {
            Some(false) => return Value::FALSE,
            Some(true) => {}
            None => unknown = true,
        }
    }
    if unknown {
        unknown_bool()
    } else {
        Value::TRUE
    }
}

fn equals_known_unknown(known: &Value, unknown: &Value) -> Value {
    if unknown.range().includes(known).known_bool() == Some(false) {
        return Value::FALSE;
    }
    if known.is_null() || unknown.ty.has_dynamic_types() {
        // Nulls of any type are equal, so the unknown side's type is not
        // enough to decide.
        return unknown_bool();
    }
    if known.ty != unknown.ty {
        return Value::FALSE;
    }
    unknown_bool()
}
