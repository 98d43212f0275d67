// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeMap;

use crate::value::Repr;
use crate::{Rc, Value, ValueSet};

/// Iterates the elements of a known collection, tuple or object as
/// `(key, element)` pairs.
///
/// Keys are index numbers for lists and tuples, names for maps and objects,
/// and the elements themselves for sets. Maps and objects iterate in key
/// order, sets in the set's own order.
pub struct ElementIterator {
    inner: Inner,
}

enum Inner {
    Seq { elems: Rc<Vec<Value>>, next: usize },
    Pairs(std::vec::IntoIter<(Value, Value)>),
}

impl Iterator for ElementIterator {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Seq { elems, next } => {
                let elem = elems.get(*next)?.clone();
                let key = Value::from(*next);
                *next += 1;
                Some((key, elem))
            }
            Inner::Pairs(pairs) => pairs.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.inner {
            Inner::Seq { elems, next } => elems.len().saturating_sub(*next),
            Inner::Pairs(pairs) => pairs.len(),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ElementIterator {}

impl Value {
    /// Whether [`Value::element_iterator`] may be used on this value, given
    /// only that it is known, unmarked and not null.
    pub fn can_iterate_elements(&self) -> bool {
        self.ty.is_collection_type() || self.ty.is_tuple_type() || self.ty.is_object_type()
    }

    /// # Panics
    /// If the value is null, unknown, marked or not iterable.
    pub fn element_iterator(&self) -> ElementIterator {
        self.assert_integration("element_iterator");
        let inner = match &self.v {
            Repr::Seq(elems) => Inner::Seq {
                elems: elems.clone(),
                next: 0,
            },
            Repr::Map(elems) => Inner::Pairs(
                elems
                    .iter()
                    .map(|(k, v)| (Value::string(k), v.clone()))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            Repr::Set(set) => Inner::Pairs(
                set.values()
                    .into_iter()
                    .map(|v| (v.clone(), v))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            _ => panic!("can't iterate over {:?}", self.ty),
        };
        ElementIterator { inner }
    }

    /// Calls `cb` for every element until it returns `true`. Returns whether
    /// iteration was stopped early.
    ///
    /// # Panics
    /// Like [`Value::element_iterator`].
    pub fn for_each_element(&self, mut cb: impl FnMut(Value, Value) -> bool) -> bool {
        for (key, elem) in self.element_iterator() {
            if cb(key, elem) {
                return true;
            }
        }
        false
    }

    /// The elements of a list, set or tuple. A null or unknown value gives an
    /// empty vector.
    ///
    /// # Panics
    /// If the value is marked or of another kind.
    pub fn as_value_slice(&self) -> Vec<Value> {
        if self.is_marked() {
            panic!("as_value_slice: value is marked, so must be unmarked first");
        }
        if !self.ty.is_list_type() && !self.ty.is_set_type() && !self.ty.is_tuple_type() {
            panic!("as_value_slice called on {:?}", self.ty);
        }
        match &self.v {
            Repr::Seq(elems) => elems.as_ref().clone(),
            Repr::Set(set) => set.values(),
            _ => Vec::new(),
        }
    }

    /// The elements of a map or object. A null or unknown value gives an
    /// empty map.
    ///
    /// # Panics
    /// If the value is marked or of another kind.
    pub fn as_value_map(&self) -> BTreeMap<String, Value> {
        if self.is_marked() {
            panic!("as_value_map: value is marked, so must be unmarked first");
        }
        if !self.ty.is_map_type() && !self.ty.is_object_type() {
            panic!("as_value_map called on {:?}", self.ty);
        }
        match &self.v {
            Repr::Map(elems) => elems.as_ref().clone(),
            _ => BTreeMap::new(),
        }
    }

    /// A copy of the elements of a list, set or tuple as a [`ValueSet`].
    ///
    /// # Panics
    /// If the value is marked or of another kind. Tuples must have
    /// elements of a single type.
    pub fn as_value_set(&self) -> ValueSet {
        if let Repr::Set(set) = &self.v {
            if self.is_marked() {
                panic!("as_value_set: value is marked, so must be unmarked first");
            }
            return set.as_ref().clone();
        }
        let elems = self.as_value_slice();
        let elem_ty = match &self.ty {
            crate::Type::List(e) => e.as_ref().clone(),
            _ => match elems.first() {
                Some(first) => first.ty.clone(),
                None => crate::Type::DYNAMIC,
            },
        };
        let mut set = ValueSet::new(elem_ty.clone());
        for elem in elems {
            if elem.ty != elem_ty {
                panic!("as_value_set: tuple elements have differing types");
            }
            set.add(elem);
        }
        set
    }
}
