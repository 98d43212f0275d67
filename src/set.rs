// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A hashed set whose notion of equality is supplied by [`Rules`].
//!
//! Unlike `std::collections::HashSet`, the element type does not need to
//! implement `Eq` or `Hash`. Values that hash alike share a bucket and are
//! told apart with [`Rules::equivalent`].

mod ops;

use core::cmp::Ordering;
use core::fmt;
use std::collections::BTreeMap;

/// The equality and ordering rules of a [`Set`].
pub trait Rules<T> {
    /// A hash that is equal for any two equivalent values.
    fn hash(&self, v: &T) -> u64;

    fn equivalent(&self, a: &T, b: &T) -> bool;

    /// Whether two rule sets treat values the same way. Sets can only be
    /// combined when their rules are the same.
    fn same_rules(&self, other: &Self) -> bool;

    /// An optional total order used by [`Set::values`].
    fn compare(&self, _a: &T, _b: &T) -> Option<Ordering> {
        None
    }
}

#[derive(Clone)]
pub struct Set<T, R> {
    rules: R,
    buckets: BTreeMap<u64, Vec<T>>,
    len: usize,
}

impl<T, R: Rules<T>> Set<T, R> {
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    pub fn new_from(rules: R, values: impl IntoIterator<Item = T>) -> Self {
        let mut set = Self::new(rules);
        for v in values {
            set.add(v);
        }
        set
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn same_rules(&self, other: &Self) -> bool {
        self.rules.same_rules(&other.rules)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `v` unless an equivalent value is already present. Returns
    /// whether it was added.
    pub fn add(&mut self, v: T) -> bool {
        let hash = self.rules.hash(&v);
        let bucket = self.buckets.entry(hash).or_default();
        if bucket.iter().any(|e| self.rules.equivalent(e, &v)) {
            return false;
        }
        bucket.push(v);
        self.len += 1;
        true
    }

    /// Removes the value equivalent to `v`, returning it.
    pub fn remove(&mut self, v: &T) -> Option<T> {
        let hash = self.rules.hash(v);
        let bucket = self.buckets.get_mut(&hash)?;
        let idx = bucket.iter().position(|e| self.rules.equivalent(e, v))?;
        let removed = bucket.remove(idx);
        if bucket.is_empty() {
            self.buckets.remove(&hash);
        }
        self.len -= 1;
        Some(removed)
    }

    pub fn has(&self, v: &T) -> bool {
        self.get(v).is_some()
    }

    /// The stored value equivalent to `v`.
    pub fn get(&self, v: &T) -> Option<&T> {
        self.buckets
            .get(&self.rules.hash(v))?
            .iter()
            .find(|e| self.rules.equivalent(e, v))
    }

    /// Iterates in bucket order, which depends on the hashes only.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.values().flatten()
    }

    /// All values, ordered by [`Rules::compare`] when the rules define an
    /// order and in bucket order otherwise.
    pub fn values(&self) -> Vec<&T> {
        let mut values: Vec<&T> = self.iter().collect();
        values.sort_by(|a, b| self.rules.compare(a, b).unwrap_or(Ordering::Equal));
        values
    }

    pub fn copy(&self) -> Self
    where
        T: Clone,
        R: Clone,
    {
        self.clone()
    }

    fn assert_same_rules(&self, other: &Self, op: &str) {
        if !self.same_rules(other) {
            panic!("{op}: sets have different rules");
        }
    }
}

impl<T: fmt::Debug, R: Rules<T>> fmt::Debug for Set<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values()).finish()
    }
}
