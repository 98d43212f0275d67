// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::cmp::Ordering;
use core::fmt::{self, Write};
use core::hash::Hasher;

use rustc_hash::FxHasher;

use crate::set::{Rules, Set};
use crate::value::Repr;
use crate::{Rc, Type, Value};

/// Set rules for values of one element type.
///
/// Values are equivalent when [`Value::equals`] is known to be true, so
/// unknown values are never equivalent to anything and are all kept.
#[derive(Clone, Debug)]
pub struct ValueRules {
    element_type: Type,
}

impl Rules<Value> for ValueRules {
    fn hash(&self, v: &Value) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(hash_key(v).as_bytes());
        hasher.finish()
    }

    fn equivalent(&self, a: &Value, b: &Value) -> bool {
        a.equals(b).known_bool() == Some(true)
    }

    fn same_rules(&self, other: &Self) -> bool {
        self.element_type == other.element_type
    }

    fn compare(&self, a: &Value, b: &Value) -> Option<Ordering> {
        Some(compare_values(a, b))
    }
}

// Null values sort after everything else, then unknown after known.
// Primitives use their natural order; everything else falls back to the hash
// key.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        (true, true) => return Ordering::Equal,
        (false, false) => {}
    }
    match (a.is_known(), b.is_known()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => return Ordering::Equal,
        (true, true) => {}
    }
    match (&a.v, &b.v) {
        (Repr::Bool(x), Repr::Bool(y)) => x.cmp(y),
        (Repr::Number(x), Repr::Number(y)) => x.cmp(y),
        (Repr::String(x), Repr::String(y)) => x.cmp(y),
        _ => hash_key(a).cmp(&hash_key(b)),
    }
}

/// A string that is the same for any two values that are equal. Marks are
/// ignored.
pub(crate) fn hash_key(v: &Value) -> String {
    let mut buf = String::new();
    append_hash_key(v, &mut buf);
    buf
}

fn append_hash_key(v: &Value, buf: &mut String) {
    match &v.v {
        Repr::Unknown(_) => buf.push('?'),
        Repr::Null => buf.push('~'),
        Repr::Bool(true) => buf.push('T'),
        Repr::Bool(false) => buf.push('F'),
        Repr::Number(n) => buf.push_str(&n.to_string()),
        Repr::String(s) => {
            let _ = write!(buf, "{s:?}");
        }
        Repr::Seq(elems) => {
            buf.push('[');
            for elem in elems.iter() {
                append_hash_key(elem, buf);
                buf.push(';');
            }
            buf.push(']');
        }
        Repr::Map(elems) => {
            buf.push('{');
            for (k, elem) in elems.iter() {
                let _ = write!(buf, "{k:?}:");
                append_hash_key(elem, buf);
                buf.push(';');
            }
            buf.push('}');
        }
        Repr::Set(set) => {
            buf.push('[');
            for elem in set.values() {
                append_hash_key(&elem, buf);
                buf.push(';');
            }
            buf.push(']');
        }
        Repr::Capsule(native) => {
            let ops = v.ty.capsule_ops();
            match ops.hash_key {
                Some(hook) => buf.push_str(&hook(native.as_ref())),
                // Without any equality hook capsules compare by identity, so
                // the native pointer is a stable key.
                None if ops.equals.is_none() && ops.raw_equals.is_none() => {
                    let _ = write!(buf, "<{:p}>", Rc::as_ptr(native));
                }
                // Equality hooks without a hash hook share one bucket.
                None => buf.push('*'),
            }
        }
    }
}

/// The set behind set values: a [`Set`] of values of a single element type.
///
/// Elements are stored without marks. Iteration order is deterministic.
#[derive(Clone)]
pub struct ValueSet {
    inner: Set<Value, ValueRules>,
}

impl ValueSet {
    pub fn new(element_type: Type) -> ValueSet {
        ValueSet {
            inner: Set::new(ValueRules { element_type }),
        }
    }

    pub fn element_type(&self) -> &Type {
        &self.inner.rules().element_type
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Adds `v` unless an equal value is present. A null or unknown value of
    /// dynamic type takes on the set's element type.
    ///
    /// # Panics
    /// If `v` has a different type than the set's elements.
    pub fn add(&mut self, mut v: Value) -> bool {
        let elem_ty = self.element_type();
        if v.ty != *elem_ty {
            if v.ty.is_dynamic() {
                v.ty = elem_ty.clone();
            } else if !elem_ty.is_dynamic() {
                panic!("can't add {:?} to a set of {elem_ty:?}", v.ty);
            }
        }
        self.inner.add(v)
    }

    pub fn remove(&mut self, v: &Value) -> Option<Value> {
        self.inner.remove(v)
    }

    pub fn has(&self, v: &Value) -> bool {
        self.inner.has(v)
    }

    /// Iterates in hash order. Use [`ValueSet::values`] for the sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.inner.iter()
    }

    /// The elements in sorted order.
    pub fn values(&self) -> Vec<Value> {
        self.inner.values().into_iter().cloned().collect()
    }

    pub fn is_wholly_known(&self) -> bool {
        self.iter().all(Value::is_wholly_known)
    }

    pub fn same_rules(&self, other: &ValueSet) -> bool {
        self.inner.same_rules(&other.inner)
    }

    /// # Panics
    /// If the element types differ.
    pub fn union(&self, other: &ValueSet) -> ValueSet {
        ValueSet {
            inner: self.inner.union(&other.inner),
        }
    }

    /// # Panics
    /// If the element types differ.
    pub fn intersection(&self, other: &ValueSet) -> ValueSet {
        ValueSet {
            inner: self.inner.intersection(&other.inner),
        }
    }

    /// # Panics
    /// If the element types differ.
    pub fn subtract(&self, other: &ValueSet) -> ValueSet {
        ValueSet {
            inner: self.inner.subtract(&other.inner),
        }
    }

    /// # Panics
    /// If the element types differ.
    pub fn symmetric_difference(&self, other: &ValueSet) -> ValueSet {
        ValueSet {
            inner: self.inner.symmetric_difference(&other.inner),
        }
    }
}

impl FromIterator<Value> for ValueSet {
    /// Collects values into a set typed after the first value.
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut iter = iter.into_iter().peekable();
        let elem_ty = match iter.peek() {
            Some(v) => v.ty.clone(),
            None => Type::DYNAMIC,
        };
        let mut set = ValueSet::new(elem_ty);
        for v in iter {
            set.add(v);
        }
        set
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values()).finish()
    }
}
