// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Refinements narrow the range of an unknown value.
//!
//! A refinement is built with a [`RefinementBuilder`] and is only ever made
//! narrower: a constraint that is already implied is ignored, and one that
//! contradicts what is known is a bug in the caller and panics.

use core::fmt;

use crate::number::Number;
use crate::unicode::normalize_string;
use crate::value::Repr;
use crate::{Rc, Type, Value, ValueMarks};

/// A three-valued truth value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tristate {
    #[default]
    Unknown,
    True,
    False,
}

impl Tristate {
    pub fn is_known(self) -> bool {
        self != Tristate::Unknown
    }

    pub fn to_bool(self) -> Option<bool> {
        match self {
            Tristate::Unknown => None,
            Tristate::True => Some(true),
            Tristate::False => Some(false),
        }
    }
}

impl From<bool> for Tristate {
    fn from(b: bool) -> Self {
        if b {
            Tristate::True
        } else {
            Tristate::False
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Bound {
    pub(crate) value: Number,
    pub(crate) inclusive: bool,
}

impl Bound {
    fn unbounded_below() -> Bound {
        Bound {
            value: Number::NegInfinity,
            inclusive: true,
        }
    }

    fn unbounded_above() -> Bound {
        Bound {
            value: Number::PosInfinity,
            inclusive: true,
        }
    }

    pub(crate) fn exactly(n: &Number) -> Bound {
        Bound {
            value: n.clone(),
            inclusive: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Refinement {
    // Bool, object, tuple, capsule and dynamic values.
    Nullable {
        null: Tristate,
    },
    String {
        null: Tristate,
        prefix: String,
    },
    Number {
        null: Tristate,
        lower: Bound,
        upper: Bound,
    },
    Collection {
        null: Tristate,
        min_len: usize,
        max_len: Option<usize>,
    },
}

impl Refinement {
    /// The empty refinement for values of `ty`.
    pub(crate) fn for_type(ty: &Type) -> Refinement {
        let null = Tristate::Unknown;
        match ty {
            Type::Primitive(crate::PrimitiveType::String) => Refinement::String {
                null,
                prefix: String::new(),
            },
            Type::Primitive(crate::PrimitiveType::Number) => Refinement::Number {
                null,
                lower: Bound::unbounded_below(),
                upper: Bound::unbounded_above(),
            },
            Type::List(_) | Type::Map(_) | Type::Set(_) => Refinement::Collection {
                null,
                min_len: 0,
                max_len: None,
            },
            _ => Refinement::Nullable { null },
        }
    }

    pub(crate) fn null(&self) -> Tristate {
        match self {
            Refinement::Nullable { null }
            | Refinement::String { null, .. }
            | Refinement::Number { null, .. }
            | Refinement::Collection { null, .. } => *null,
        }
    }

    pub(crate) fn set_null(&mut self, value: Tristate) {
        match self {
            Refinement::Nullable { null }
            | Refinement::String { null, .. }
            | Refinement::Number { null, .. }
            | Refinement::Collection { null, .. } => *null = value,
        }
    }

    fn is_trivial(&self) -> bool {
        if self.null().is_known() {
            return false;
        }
        match self {
            Refinement::Nullable { .. } => true,
            Refinement::String { prefix, .. } => prefix.is_empty(),
            Refinement::Number { lower, upper, .. } => {
                *lower == Bound::unbounded_below() && *upper == Bound::unbounded_above()
            }
            Refinement::Collection {
                min_len, max_len, ..
            } => *min_len == 0 && max_len.is_none(),
        }
    }

    // Writes the builder calls that would produce this refinement.
    pub(crate) fn fmt_builder_calls(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.null() {
            Tristate::True => f.write_str(".null()")?,
            Tristate::False => f.write_str(".not_null()")?,
            Tristate::Unknown => {}
        }
        match self {
            Refinement::Nullable { .. } => {}
            Refinement::String { prefix, .. } => {
                if !prefix.is_empty() {
                    write!(f, ".string_prefix_full({prefix:?})")?;
                }
            }
            Refinement::Number { lower, upper, .. } => {
                if *lower != Bound::unbounded_below() {
                    write!(
                        f,
                        ".number_range_lower_bound(&{:?}, {})",
                        Value::number(lower.value.clone()),
                        lower.inclusive
                    )?;
                }
                if *upper != Bound::unbounded_above() {
                    write!(
                        f,
                        ".number_range_upper_bound(&{:?}, {})",
                        Value::number(upper.value.clone()),
                        upper.inclusive
                    )?;
                }
            }
            Refinement::Collection {
                min_len, max_len, ..
            } => {
                if *min_len > 0 {
                    write!(f, ".collection_length_lower_bound({min_len})")?;
                }
                if let Some(max_len) = max_len {
                    write!(f, ".collection_length_upper_bound({max_len})")?;
                }
            }
        }
        Ok(())
    }
}

/// Builds a narrower version of a value. Obtained from [`Value::refine`].
///
/// Refining a known value only checks that the value satisfies the
/// constraints. Refining an unknown value records them, and
/// [`RefinementBuilder::new_value`] returns a known value instead when the
/// constraints leave only one possibility.
#[must_use]
pub struct RefinementBuilder {
    orig: Value,
    marks: ValueMarks,
    wip: Option<Refinement>,
}

impl Value {
    /// Starts refining the value. Marks are kept on the result.
    pub fn refine(&self) -> RefinementBuilder {
        let (orig, marks) = self.unmark();
        let wip = match &orig.v {
            Repr::Unknown(Some(r)) => Some(r.as_ref().clone()),
            Repr::Unknown(None) if !orig.ty.is_dynamic() => Some(Refinement::for_type(&orig.ty)),
            _ => None,
        };
        RefinementBuilder { orig, marks, wip }
    }

    /// Applies `f` to a builder for this value and returns the result.
    pub fn refine_with(&self, f: impl FnOnce(RefinementBuilder) -> RefinementBuilder) -> Value {
        f(self.refine()).new_value()
    }

    /// Shorthand for `refine().not_null().new_value()`.
    pub fn refine_not_null(&self) -> Value {
        self.refine().not_null().new_value()
    }
}

impl RefinementBuilder {
    fn assert_refineable(&self) {
        if !self.orig.is_known() && self.orig.ty.is_dynamic() {
            panic!("can't refine Value::DYNAMIC, the unknown value of unknown type");
        }
    }

    fn assert_type(&self, want: &Type, what: &str) {
        if self.orig.ty != *want {
            panic!("can't refine {what} of {:?}", self.orig.ty);
        }
    }

    /// # Panics
    /// If the value is known to be null.
    pub fn not_null(mut self) -> Self {
        self.assert_refineable();
        if self.orig.is_null() {
            panic!("refining null value as non-null");
        }
        if let Some(wip) = &mut self.wip {
            if wip.null() == Tristate::True {
                panic!("refining null value as non-null");
            }
            wip.set_null(Tristate::False);
        }
        self
    }

    /// # Panics
    /// If the value is known not to be null.
    pub fn null(mut self) -> Self {
        self.assert_refineable();
        if self.orig.is_known() && !self.orig.is_null() {
            panic!("refining non-null value as null");
        }
        if let Some(wip) = &mut self.wip {
            if wip.null() == Tristate::False {
                panic!("refining non-null value as null");
            }
            wip.set_null(Tristate::True);
        }
        self
    }

    /// Whether the value is known to be null, known not to be, or neither.
    pub fn nullness(&self) -> Tristate {
        match &self.wip {
            Some(wip) => wip.null(),
            None if self.orig.is_null() => Tristate::True,
            None if self.orig.is_known() => Tristate::False,
            None => Tristate::Unknown,
        }
    }

    // A known, non-null bound number, or `None` when the bound is unknown.
    fn bound_number(bound: &Value, what: &str) -> Option<Number> {
        let (bound, _) = bound.unmark();
        if !bound.is_known() {
            return None;
        }
        match bound.known_number() {
            Some(n) => Some(n.clone()),
            None if bound.is_null() => panic!("{what} must not be null"),
            None => panic!("{what} must be a number, not {:?}", bound.ty),
        }
    }

    /// Constrains a number to be at least `min` (or above it when not
    /// `inclusive`). An unknown `min` is ignored.
    ///
    /// # Panics
    /// If the value is not a number, a known value is below the bound, or
    /// the bound is above an existing upper bound.
    pub fn number_range_lower_bound(mut self, min: &Value, inclusive: bool) -> Self {
        self.assert_refineable();
        self.assert_type(&Type::NUMBER, "number bounds");
        let Some(min) = Self::bound_number(min, "lower bound") else {
            return self;
        };

        if let Some(v) = self.orig.known_number() {
            if *v < min || (!inclusive && *v == min) {
                panic!("refining known value {v} as out of range (lower bound {min})");
            }
            return self;
        }
        if let Some(Refinement::Number { lower, upper, .. }) = &mut self.wip {
            if min == Number::NegInfinity {
                return self;
            }
            let tighter = min > lower.value || (min == lower.value && !inclusive && lower.inclusive);
            if !tighter {
                return self;
            }
            if min > upper.value || (min == upper.value && !(inclusive && upper.inclusive)) {
                panic!("number lower bound {min} must be less than upper bound {}", upper.value);
            }
            *lower = Bound {
                value: min,
                inclusive,
            };
        }
        self
    }

    /// Constrains a number to be at most `max` (or below it when not
    /// `inclusive`). An unknown `max` is ignored.
    ///
    /// # Panics
    /// If the value is not a number, a known value is above the bound, or
    /// the bound is below an existing lower bound.
    pub fn number_range_upper_bound(mut self, max: &Value, inclusive: bool) -> Self {
        self.assert_refineable();
        self.assert_type(&Type::NUMBER, "number bounds");
        let Some(max) = Self::bound_number(max, "upper bound") else {
            return self;
        };

        if let Some(v) = self.orig.known_number() {
            if *v > max || (!inclusive && *v == max) {
                panic!("refining known value {v} as out of range (upper bound {max})");
            }
            return self;
        }
        if let Some(Refinement::Number { lower, upper, .. }) = &mut self.wip {
            if max == Number::PosInfinity {
                return self;
            }
            let tighter = max < upper.value || (max == upper.value && !inclusive && upper.inclusive);
            if !tighter {
                return self;
            }
            if max < lower.value || (max == lower.value && !(inclusive && lower.inclusive)) {
                panic!("number upper bound {max} must be greater than lower bound {}", lower.value);
            }
            *upper = Bound {
                value: max,
                inclusive,
            };
        }
        self
    }

    /// Constrains a number to the inclusive range `[min, max]`.
    ///
    /// # Panics
    /// Like the single-bound methods.
    pub fn number_range_inclusive(self, min: &Value, max: &Value) -> Self {
        self.number_range_lower_bound(min, true)
            .number_range_upper_bound(max, true)
    }

    fn assert_collection(&self) {
        if !self.orig.ty.is_collection_type() {
            panic!("can't refine collection length of {:?}", self.orig.ty);
        }
    }

    /// # Panics
    /// If the value is not a list, map or set, a known value is shorter, or
    /// the bound is above an existing upper bound.
    pub fn collection_length_lower_bound(mut self, min: usize) -> Self {
        self.assert_refineable();
        self.assert_collection();
        if self.orig.is_known() {
            if !self.orig.is_null() {
                let len = self.orig.length_int();
                if len < min {
                    panic!("refining collection of length {len} with lower bound {min}");
                }
            }
            return self;
        }
        if let Some(Refinement::Collection {
            min_len, max_len, ..
        }) = &mut self.wip
        {
            if min <= *min_len {
                return self;
            }
            if let Some(max) = max_len {
                if min > *max {
                    panic!("collection length lower bound {min} must not exceed upper bound {max}");
                }
            }
            *min_len = min;
        }
        self
    }

    /// # Panics
    /// If the value is not a list, map or set, a known value is longer, or
    /// the bound is below an existing lower bound.
    pub fn collection_length_upper_bound(mut self, max: usize) -> Self {
        self.assert_refineable();
        self.assert_collection();
        if self.orig.is_known() {
            if !self.orig.is_null() {
                let len = self.orig.length_int();
                if len > max {
                    panic!("refining collection of length {len} with upper bound {max}");
                }
            }
            return self;
        }
        if let Some(Refinement::Collection {
            min_len, max_len, ..
        }) = &mut self.wip
        {
            if max_len.is_some_and(|m| max >= m) {
                return self;
            }
            if max < *min_len {
                panic!(
                    "collection length upper bound {max} must not be below lower bound {min_len}"
                );
            }
            *max_len = Some(max);
        }
        self
    }

    /// Constrains a collection to exactly `len` elements.
    ///
    /// # Panics
    /// Like the single-bound methods.
    pub fn collection_length(self, len: usize) -> Self {
        self.collection_length_lower_bound(len)
            .collection_length_upper_bound(len)
    }

    /// Constrains a string to start with `prefix`.
    ///
    /// The last character of the normalized prefix is dropped, since it
    /// might combine with whatever follows it in the final string. Use
    /// [`RefinementBuilder::string_prefix_full`] when that cannot happen.
    ///
    /// # Panics
    /// Like [`RefinementBuilder::string_prefix_full`].
    pub fn string_prefix(self, prefix: &str) -> Self {
        let mut prefix = normalize_string(prefix);
        prefix.pop();
        self.string_prefix_full(&prefix)
    }

    /// Constrains a string to start with exactly `prefix`, after
    /// normalization.
    ///
    /// # Panics
    /// If the value is not a string, a known value does not start with
    /// `prefix`, or `prefix` conflicts with an existing prefix.
    pub fn string_prefix_full(mut self, prefix: &str) -> Self {
        self.assert_refineable();
        self.assert_type(&Type::STRING, "string prefix");
        let prefix = normalize_string(prefix);
        if prefix.is_empty() {
            return self;
        }

        if let Some(s) = self.orig.known_str() {
            if !s.starts_with(&prefix) {
                panic!("refining known string {s:?} as having prefix {prefix:?}");
            }
            return self;
        }
        if let Some(Refinement::String {
            prefix: existing, ..
        }) = &mut self.wip
        {
            if existing.starts_with(&prefix) {
                return self;
            }
            if !prefix.starts_with(existing.as_str()) {
                panic!("refining string prefix {prefix:?} conflicts with existing prefix {existing:?}");
            }
            *existing = prefix;
        }
        self
    }

    /// Finishes refinement.
    ///
    /// Known values come back unchanged. An unknown value that the
    /// refinement narrows to a single possibility becomes that known value:
    /// null when refined as null, the bound when a non-null number's bounds
    /// are equal and inclusive, or an empty collection when a non-null
    /// collection's length is at most zero.
    pub fn new_value(self) -> Value {
        let RefinementBuilder { orig, marks, wip } = self;
        let Some(wip) = wip else {
            return orig.mark_with_marks(marks);
        };

        let collapsed = match (&wip, wip.null()) {
            (_, Tristate::True) => Some(Value::null(orig.ty.clone())),
            (Refinement::Number { lower, upper, .. }, Tristate::False)
                if lower.inclusive && upper.inclusive && lower.value == upper.value =>
            {
                Some(Value::number(lower.value.clone()))
            }
            (
                Refinement::Collection {
                    max_len: Some(0), ..
                },
                Tristate::False,
            ) => Some(match &orig.ty {
                Type::List(e) => Value::list_empty(e.as_ref().clone()),
                Type::Map(e) => Value::map_empty(e.as_ref().clone()),
                _ => Value::set_empty(orig.ty.element_type().clone()),
            }),
            _ => None,
        };

        let v = match collapsed {
            Some(v) => {
                tracing::trace!(ty = %orig.ty, value = ?v, "refinement resolved unknown value");
                v
            }
            None if wip.is_trivial() => Value::unknown(orig.ty.clone()),
            None => Value::from_repr(orig.ty.clone(), Repr::Unknown(Some(Rc::new(wip)))),
        };
        v.mark_with_marks(marks)
    }
}
