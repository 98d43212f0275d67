// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{Rules, Set};

impl<T: Clone, R: Rules<T> + Clone> Set<T, R> {
    /// Values in either set. Where both sets hold equivalent values, the one
    /// from `self` is kept.
    ///
    /// # Panics
    /// If the sets have different rules.
    pub fn union(&self, other: &Self) -> Self {
        self.assert_same_rules(other, "union");
        let mut result = self.clone();
        for v in other.iter() {
            result.add(v.clone());
        }
        result
    }

    /// # Panics
    /// If the sets have different rules.
    pub fn intersection(&self, other: &Self) -> Self {
        self.assert_same_rules(other, "intersection");
        let mut result = Set::new(self.rules.clone());
        for v in self.iter().filter(|v| other.has(v)) {
            result.add(v.clone());
        }
        result
    }

    /// Values of `self` that are not in `other`.
    ///
    /// # Panics
    /// If the sets have different rules.
    pub fn subtract(&self, other: &Self) -> Self {
        self.assert_same_rules(other, "subtract");
        let mut result = Set::new(self.rules.clone());
        for v in self.iter().filter(|v| !other.has(v)) {
            result.add(v.clone());
        }
        result
    }

    /// # Panics
    /// If the sets have different rules.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.assert_same_rules(other, "symmetric_difference");
        let mut result = self.subtract(other);
        for v in other.iter().filter(|v| !self.has(v)) {
            result.add(v.clone());
        }
        result
    }
}
