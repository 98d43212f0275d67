// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod elements;
mod equality;
mod ops;

use core::any::Any;
use core::fmt;
use std::collections::BTreeMap;

use crate::number::{Number, NumberError};
use crate::refinement::Refinement;
use crate::unicode::normalize_string;
use crate::{Rc, Type, ValueMarks, ValueSet};

pub use elements::ElementIterator;

/// An immutable value together with its type.
///
/// A value is null, unknown (optionally refined) or known. Any of these may
/// also carry marks. Values are cheap to clone: compound payloads are shared.
#[derive(Clone)]
pub struct Value {
    pub(crate) ty: Type,
    pub(crate) v: Repr,
    pub(crate) marks: Option<Rc<ValueMarks>>,
}

#[derive(Clone)]
pub(crate) enum Repr {
    Null,
    Unknown(Option<Rc<Refinement>>),
    Bool(bool),
    Number(Number),
    String(Rc<str>),
    // List and tuple elements.
    Seq(Rc<Vec<Value>>),
    // Map and object elements.
    Map(Rc<BTreeMap<String, Value>>),
    Set(Rc<ValueSet>),
    Capsule(Rc<dyn Any + Send + Sync>),
}

impl Value {
    pub const TRUE: Value = Value {
        ty: Type::BOOL,
        v: Repr::Bool(true),
        marks: None,
    };

    pub const FALSE: Value = Value {
        ty: Type::BOOL,
        v: Repr::Bool(false),
        marks: None,
    };

    /// The unknown value of unknown type. It can never be refined.
    pub const DYNAMIC: Value = Value {
        ty: Type::DYNAMIC,
        v: Repr::Unknown(None),
        marks: None,
    };

    pub(crate) fn from_repr(ty: Type, v: Repr) -> Value {
        Value { ty, v, marks: None }
    }

    pub fn null(ty: Type) -> Value {
        Value::from_repr(ty, Repr::Null)
    }

    /// An unknown value of the given type, with no refinements.
    pub fn unknown(ty: Type) -> Value {
        Value::from_repr(ty, Repr::Unknown(None))
    }

    pub fn bool(b: bool) -> Value {
        if b {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }

    pub fn number(n: Number) -> Value {
        Value::from_repr(Type::NUMBER, Repr::Number(n))
    }

    pub fn number_int(n: i64) -> Value {
        Value::number(Number::from(n))
    }

    pub fn number_uint(n: u64) -> Value {
        Value::number(Number::from(n))
    }

    /// # Panics
    /// If `f` is NaN.
    pub fn number_float(f: f64) -> Value {
        match Number::from_f64(f) {
            Some(n) => Value::number(n),
            None => panic!("can't use NaN as a number value"),
        }
    }

    pub fn parse_number(s: &str) -> Result<Value, NumberError> {
        Ok(Value::number(s.parse()?))
    }

    pub fn zero() -> Value {
        Value::number(Number::zero())
    }

    pub fn positive_infinity() -> Value {
        Value::number(Number::PosInfinity)
    }

    pub fn negative_infinity() -> Value {
        Value::number(Number::NegInfinity)
    }

    /// A string value. The text is NFC-normalized.
    pub fn string(s: &str) -> Value {
        Value::from_repr(Type::STRING, Repr::String(normalize_string(s).into()))
    }

    /// A list of the given elements.
    ///
    /// All elements must have the same type, except that elements of
    /// [`Type::DYNAMIC`] take on the type of the others. Element marks are
    /// moved onto the list.
    ///
    /// # Panics
    /// If `elems` is empty or the element types are inconsistent.
    pub fn list(elems: Vec<Value>) -> Value {
        if elems.is_empty() {
            panic!("must not call Value::list with an empty vec");
        }
        let (elem_ty, elems, marks) = unify_elements(elems, "list");
        Value::from_repr(Type::list(elem_ty), Repr::Seq(Rc::new(elems))).mark_with_marks(marks)
    }

    pub fn list_empty(elem_ty: Type) -> Value {
        Value::from_repr(Type::list(elem_ty), Repr::Seq(Rc::new(Vec::new())))
    }

    /// A map of the given elements. Keys are NFC-normalized and follow the
    /// same element type rules as [`Value::list`].
    ///
    /// # Panics
    /// If there are no elements or the element types are inconsistent.
    pub fn map<K: AsRef<str>>(elems: impl IntoIterator<Item = (K, Value)>) -> Value {
        let (keys, values): (Vec<String>, Vec<Value>) = elems
            .into_iter()
            .map(|(k, v)| (normalize_string(k.as_ref()), v))
            .unzip();
        if values.is_empty() {
            panic!("must not call Value::map with no elements");
        }
        let (elem_ty, values, marks) = unify_elements(values, "map");
        let map: BTreeMap<String, Value> = keys.into_iter().zip(values).collect();
        Value::from_repr(Type::map(elem_ty), Repr::Map(Rc::new(map))).mark_with_marks(marks)
    }

    pub fn map_empty(elem_ty: Type) -> Value {
        Value::from_repr(Type::map(elem_ty), Repr::Map(Rc::new(BTreeMap::new())))
    }

    /// A set of the given elements. Equal elements are stored once.
    ///
    /// # Panics
    /// If `elems` is empty or the element types are inconsistent.
    pub fn set(elems: Vec<Value>) -> Value {
        if elems.is_empty() {
            panic!("must not call Value::set with an empty vec");
        }
        let (elem_ty, elems, marks) = unify_elements(elems, "set");
        let mut set = ValueSet::new(elem_ty);
        for elem in elems {
            set.add(elem);
        }
        Value::set_from_value_set(set).mark_with_marks(marks)
    }

    pub fn set_empty(elem_ty: Type) -> Value {
        Value::set_from_value_set(ValueSet::new(elem_ty))
    }

    /// Wraps an already-built set. Its elements must be unmarked and of the
    /// set's element type.
    pub fn set_from_value_set(set: ValueSet) -> Value {
        Value::from_repr(Type::set(set.element_type().clone()), Repr::Set(Rc::new(set)))
    }

    /// A tuple of the given elements. Element marks stay on the elements.
    pub fn tuple(elems: Vec<Value>) -> Value {
        let ty = Type::tuple(elems.iter().map(|e| e.ty.clone()).collect());
        Value::from_repr(ty, Repr::Seq(Rc::new(elems)))
    }

    pub fn empty_tuple() -> Value {
        Value::tuple(Vec::new())
    }

    /// An object with the given attributes. Attribute names are
    /// NFC-normalized. Attribute marks stay on the attributes.
    pub fn object<K: AsRef<str>>(attrs: impl IntoIterator<Item = (K, Value)>) -> Value {
        let attrs: BTreeMap<String, Value> = attrs
            .into_iter()
            .map(|(k, v)| (normalize_string(k.as_ref()), v))
            .collect();
        let ty = Type::object(attrs.iter().map(|(k, v)| (k, v.ty.clone())));
        Value::from_repr(ty, Repr::Map(Rc::new(attrs)))
    }

    pub fn empty_object() -> Value {
        Value::object(core::iter::empty::<(&str, Value)>())
    }

    /// Wraps a native value in a value of the given capsule type.
    ///
    /// # Panics
    /// If `ty` is not a capsule type or was not declared for native type `T`.
    pub fn capsule<T: Any + Send + Sync>(ty: &Type, native: T) -> Value {
        match ty.capsule_type() {
            Some(c) if c.accepts::<T>() => {}
            Some(c) => panic!(
                "capsule type {:?} wraps {}, not {}",
                c.name(),
                c.native_type_name(),
                core::any::type_name::<T>()
            ),
            None => panic!("{ty:?} is not a capsule type"),
        }
        Value::from_repr(ty.clone(), Repr::Capsule(Rc::new(native)))
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Whether the value is null. Marks are ignored.
    pub fn is_null(&self) -> bool {
        matches!(self.v, Repr::Null)
    }

    /// Whether the value is known. Marks are ignored, and a null value is
    /// known.
    pub fn is_known(&self) -> bool {
        !matches!(self.v, Repr::Unknown(_))
    }

    /// Whether the value and everything nested inside it is known.
    pub fn is_wholly_known(&self) -> bool {
        match &self.v {
            Repr::Unknown(_) => false,
            Repr::Seq(elems) => elems.iter().all(Value::is_wholly_known),
            Repr::Map(elems) => elems.values().all(Value::is_wholly_known),
            Repr::Set(set) => set.iter().all(Value::is_wholly_known),
            _ => true,
        }
    }

    pub(crate) fn refinement(&self) -> Option<&Refinement> {
        match &self.v {
            Repr::Unknown(r) => r.as_deref(),
            _ => None,
        }
    }

    // Integration accessors refuse anything that is not a plain known value.
    fn assert_integration(&self, what: &str) {
        if self.is_marked() {
            panic!("{what}: value is marked, so must be unmarked first");
        }
        match self.v {
            Repr::Null => panic!("{what}: value is null"),
            Repr::Unknown(_) => panic!("{what}: value is unknown"),
            _ => {}
        }
    }

    /// # Panics
    /// If the value is not a known, unmarked bool.
    pub fn as_bool(&self) -> bool {
        self.assert_integration("as_bool");
        match self.v {
            Repr::Bool(b) => b,
            _ => panic!("as_bool called on {:?}, which is not a bool", self.ty),
        }
    }

    /// # Panics
    /// If the value is not a known, unmarked number.
    pub fn as_number(&self) -> &Number {
        self.assert_integration("as_number");
        match &self.v {
            Repr::Number(n) => n,
            _ => panic!("as_number called on {:?}, which is not a number", self.ty),
        }
    }

    /// # Panics
    /// If the value is not a known, unmarked string.
    pub fn as_string(&self) -> &str {
        self.assert_integration("as_string");
        match &self.v {
            Repr::String(s) => s,
            _ => panic!("as_string called on {:?}, which is not a string", self.ty),
        }
    }

    /// The native value inside a capsule.
    ///
    /// # Panics
    /// If the value is not a known, unmarked capsule wrapping a `T`.
    pub fn encapsulated<T: Any>(&self) -> &T {
        self.assert_integration("encapsulated");
        match &self.v {
            Repr::Capsule(native) => match native.downcast_ref::<T>() {
                Some(t) => t,
                None => panic!(
                    "capsule {:?} does not wrap {}",
                    self.ty,
                    core::any::type_name::<T>()
                ),
            },
            _ => panic!("encapsulated called on {:?}, which is not a capsule", self.ty),
        }
    }

    // Known bool content regardless of marks.
    pub(crate) fn known_bool(&self) -> Option<bool> {
        match self.v {
            Repr::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub(crate) fn known_number(&self) -> Option<&Number> {
        match &self.v {
            Repr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn known_str(&self) -> Option<&str> {
        match &self.v {
            Repr::String(s) => Some(s),
            _ => None,
        }
    }
}

// Computes the unified element type of a homogeneous collection and strips
// marks from the elements.
fn unify_elements(elems: Vec<Value>, kind: &str) -> (Type, Vec<Value>, ValueMarks) {
    let mut marks = ValueMarks::default();
    let mut elem_ty = Type::DYNAMIC;
    let mut unmarked = Vec::with_capacity(elems.len());
    for elem in elems {
        let (elem, elem_marks) = elem.unmark_deep();
        marks.extend(elem_marks);
        if elem_ty.is_dynamic() {
            elem_ty = elem.ty.clone();
        } else if !elem.ty.is_dynamic() && elem.ty != elem_ty {
            panic!(
                "inconsistent {kind} element types (was {elem_ty:?}, now {:?})",
                elem.ty
            );
        }
        unmarked.push(elem);
    }

    if !elem_ty.is_dynamic() {
        for elem in unmarked.iter_mut() {
            if elem.ty.is_dynamic() {
                elem.ty = elem_ty.clone();
            }
        }
    }
    (elem_ty, unmarked, marks)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::number_int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::number_int(i64::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::number_uint(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::number_float(f)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(&s)
    }
}

// Renders the constructor expression that would build the value.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_unmarked(f)?;
        if let Some(marks) = &self.marks {
            let marks: Vec<_> = marks.iter().collect();
            write!(f, ".mark_with_marks({marks:?})")?;
        }
        Ok(())
    }
}

impl Value {
    fn fmt_unmarked(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.v {
            Repr::Null => write!(f, "Value::null({:?})", self.ty),
            Repr::Unknown(None) if self.ty.is_dynamic() => f.write_str("Value::DYNAMIC"),
            Repr::Unknown(None) => write!(f, "Value::unknown({:?})", self.ty),
            Repr::Unknown(Some(r)) => {
                write!(f, "Value::unknown({:?}).refine()", self.ty)?;
                r.fmt_builder_calls(f)?;
                f.write_str(".new_value()")
            }
            Repr::Bool(true) => f.write_str("Value::TRUE"),
            Repr::Bool(false) => f.write_str("Value::FALSE"),
            Repr::Number(Number::Int(i)) => write!(f, "Value::number_int({i})"),
            Repr::Number(n) => write!(f, "Value::parse_number({:?})", n.to_string()),
            Repr::String(s) => write!(f, "Value::string({s:?})"),
            Repr::Seq(elems) if self.ty.is_tuple_type() => {
                if elems.is_empty() {
                    f.write_str("Value::empty_tuple()")
                } else {
                    write!(f, "Value::tuple(vec!{elems:?})")
                }
            }
            Repr::Seq(elems) if elems.is_empty() => {
                write!(f, "Value::list_empty({:?})", self.ty.element_type())
            }
            Repr::Seq(elems) => write!(f, "Value::list(vec!{elems:?})"),
            Repr::Map(elems) if self.ty.is_object_type() => {
                if elems.is_empty() {
                    f.write_str("Value::empty_object()")
                } else {
                    let attrs: Vec<_> = elems.iter().collect();
                    write!(f, "Value::object({attrs:?})")
                }
            }
            Repr::Map(elems) if elems.is_empty() => {
                write!(f, "Value::map_empty({:?})", self.ty.element_type())
            }
            Repr::Map(elems) => {
                let elems: Vec<_> = elems.iter().collect();
                write!(f, "Value::map({elems:?})")
            }
            Repr::Set(set) if set.is_empty() => {
                write!(f, "Value::set_empty({:?})", set.element_type())
            }
            Repr::Set(set) => write!(f, "Value::set(vec!{:?})", set.values()),
            Repr::Capsule(native) => match self.ty.capsule_ops().debug_string {
                Some(hook) => f.write_str(&hook(native.as_ref())),
                None => write!(f, "Value::capsule(&{:?}, ..)", self.ty),
            },
        }
    }
}
