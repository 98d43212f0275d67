// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The closed set of types that values can have.
//!
//! Types compare structurally, except for capsule types which compare by
//! identity: two capsule types are equal only when they are the same
//! instance. [`Type::DYNAMIC`] is a placeholder meaning "not yet known"
//! and is equal only to itself.

mod capsule;
mod conformance;
mod json;
mod object;

use core::any::Any;
use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

use crate::unicode::normalize_string;
use crate::Rc;

pub use capsule::{CapsuleConversion, CapsuleOps, CapsuleType};
pub use object::ObjectType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Bool,
    Number,
    String,
}

#[derive(Clone)]
pub enum Type {
    Primitive(PrimitiveType),
    List(Rc<Type>),
    Map(Rc<Type>),
    Set(Rc<Type>),
    Tuple(Rc<Vec<Type>>),
    Object(Rc<ObjectType>),
    Capsule(Rc<CapsuleType>),
    // Placeholder for a type that is not known yet.
    DynamicPseudo,
}

impl Type {
    pub const BOOL: Type = Type::Primitive(PrimitiveType::Bool);
    pub const NUMBER: Type = Type::Primitive(PrimitiveType::Number);
    pub const STRING: Type = Type::Primitive(PrimitiveType::String);
    pub const DYNAMIC: Type = Type::DynamicPseudo;

    pub fn list(element: Type) -> Type {
        Type::List(Rc::new(element))
    }

    pub fn map(element: Type) -> Type {
        Type::Map(Rc::new(element))
    }

    pub fn set(element: Type) -> Type {
        Type::Set(Rc::new(element))
    }

    pub fn tuple(elements: Vec<Type>) -> Type {
        Type::Tuple(Rc::new(elements))
    }

    pub fn empty_tuple() -> Type {
        Type::tuple(Vec::new())
    }

    /// An object type with the given attributes, all of them required.
    /// Attribute names are NFC-normalized.
    pub fn object<K: AsRef<str>>(attrs: impl IntoIterator<Item = (K, Type)>) -> Type {
        Type::Object(Rc::new(ObjectType::new(normalize_attrs(attrs), BTreeSet::new())))
    }

    pub fn empty_object() -> Type {
        Type::object(core::iter::empty::<(&str, Type)>())
    }

    /// An object type where the named attributes are optional.
    ///
    /// # Panics
    /// If an optional attribute name is not one of the attributes.
    pub fn object_with_optional_attrs<K, S>(
        attrs: impl IntoIterator<Item = (K, Type)>,
        optional: impl IntoIterator<Item = S>,
    ) -> Type
    where
        K: AsRef<str>,
        S: AsRef<str>,
    {
        let attr_types = normalize_attrs(attrs);
        let mut optional_names = BTreeSet::new();
        for name in optional {
            let name = normalize_string(name.as_ref());
            if !attr_types.contains_key(&name) {
                panic!("optional attribute {name:?} is not one of the object's attributes");
            }
            optional_names.insert(name);
        }
        Type::Object(Rc::new(ObjectType::new(attr_types, optional_names)))
    }

    /// A new capsule type wrapping native values of type `T`.
    ///
    /// Each call creates a distinct type, even for the same name and `T`.
    pub fn capsule<T: Any + Send + Sync>(name: impl Into<String>) -> Type {
        Type::capsule_with_ops::<T>(name, CapsuleOps::default())
    }

    pub fn capsule_with_ops<T: Any + Send + Sync>(name: impl Into<String>, ops: CapsuleOps) -> Type {
        Type::Capsule(Rc::new(CapsuleType::new::<T>(name.into(), ops)))
    }

    pub fn is_primitive_type(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::DynamicPseudo)
    }

    pub fn is_list_type(&self) -> bool {
        matches!(self, Type::List(_))
    }

    pub fn is_map_type(&self) -> bool {
        matches!(self, Type::Map(_))
    }

    pub fn is_set_type(&self) -> bool {
        matches!(self, Type::Set(_))
    }

    pub fn is_collection_type(&self) -> bool {
        matches!(self, Type::List(_) | Type::Map(_) | Type::Set(_))
    }

    pub fn is_tuple_type(&self) -> bool {
        matches!(self, Type::Tuple(_))
    }

    pub fn is_object_type(&self) -> bool {
        matches!(self, Type::Object(_))
    }

    pub fn is_capsule_type(&self) -> bool {
        matches!(self, Type::Capsule(_))
    }

    pub fn list_element_type(&self) -> Option<&Type> {
        match self {
            Type::List(e) => Some(e),
            _ => None,
        }
    }

    pub fn map_element_type(&self) -> Option<&Type> {
        match self {
            Type::Map(e) => Some(e),
            _ => None,
        }
    }

    pub fn set_element_type(&self) -> Option<&Type> {
        match self {
            Type::Set(e) => Some(e),
            _ => None,
        }
    }

    /// # Panics
    /// If the type is not a list, map or set type.
    pub fn element_type(&self) -> &Type {
        match self {
            Type::List(e) | Type::Map(e) | Type::Set(e) => e,
            _ => panic!("element_type called on {self:?}, which is not a collection type"),
        }
    }

    /// # Panics
    /// If the type is not an object type.
    pub fn attribute_types(&self) -> &BTreeMap<String, Type> {
        self.object_type().attribute_types()
    }

    /// # Panics
    /// If the type is not an object type.
    pub fn has_attribute(&self, name: &str) -> bool {
        match self {
            Type::Object(o) => o.attribute_types().contains_key(name),
            _ => panic!("has_attribute called on {self:?}, which is not an object type"),
        }
    }

    /// # Panics
    /// If the type is not an object type or has no such attribute.
    pub fn attribute_type(&self, name: &str) -> &Type {
        match self.object_type().attribute_types().get(name) {
            Some(ty) => ty,
            None => panic!("{self:?} has no attribute {name:?}"),
        }
    }

    /// # Panics
    /// If the type is not an object type or has no such attribute.
    pub fn attribute_optional(&self, name: &str) -> bool {
        let obj = self.object_type();
        if !obj.attribute_types().contains_key(name) {
            panic!("{self:?} has no attribute {name:?}");
        }
        obj.optional_attributes().contains(name)
    }

    /// # Panics
    /// If the type is not an object type.
    pub fn optional_attributes(&self) -> &BTreeSet<String> {
        self.object_type().optional_attributes()
    }

    fn object_type(&self) -> &ObjectType {
        match self {
            Type::Object(o) => o,
            _ => panic!("attribute access on {self:?}, which is not an object type"),
        }
    }

    /// # Panics
    /// If the type is not a tuple type.
    pub fn tuple_element_types(&self) -> &[Type] {
        match self {
            Type::Tuple(elems) => elems,
            _ => panic!("tuple_element_types called on {self:?}, which is not a tuple type"),
        }
    }

    /// Number of elements of a tuple type.
    ///
    /// # Panics
    /// If the type is not a tuple type.
    pub fn tuple_len(&self) -> usize {
        self.tuple_element_types().len()
    }

    /// # Panics
    /// If the type is not a capsule type.
    pub fn capsule_ops(&self) -> &CapsuleOps {
        match self {
            Type::Capsule(c) => c.ops(),
            _ => panic!("capsule_ops called on {self:?}, which is not a capsule type"),
        }
    }

    pub(crate) fn capsule_type(&self) -> Option<&CapsuleType> {
        match self {
            Type::Capsule(c) => Some(c),
            _ => None,
        }
    }

    /// Whether the type contains [`Type::DYNAMIC`] anywhere inside it.
    pub fn has_dynamic_types(&self) -> bool {
        match self {
            Type::DynamicPseudo => true,
            Type::Primitive(_) | Type::Capsule(_) => false,
            Type::List(e) | Type::Map(e) | Type::Set(e) => e.has_dynamic_types(),
            Type::Tuple(elems) => elems.iter().any(Type::has_dynamic_types),
            Type::Object(o) => o.attribute_types().values().any(Type::has_dynamic_types),
        }
    }

    /// The same type with every optional-attribute marking removed, at any
    /// depth.
    pub fn without_optional_attributes_deep(&self) -> Type {
        match self {
            Type::Primitive(_) | Type::Capsule(_) | Type::DynamicPseudo => self.clone(),
            Type::List(e) => Type::list(e.without_optional_attributes_deep()),
            Type::Map(e) => Type::map(e.without_optional_attributes_deep()),
            Type::Set(e) => Type::set(e.without_optional_attributes_deep()),
            Type::Tuple(elems) => Type::tuple(
                elems
                    .iter()
                    .map(Type::without_optional_attributes_deep)
                    .collect(),
            ),
            Type::Object(o) => Type::object(
                o.attribute_types()
                    .iter()
                    .map(|(k, t)| (k, t.without_optional_attributes_deep())),
            ),
        }
    }

    /// A human-readable name for the type as the type of an actual value.
    pub fn friendly_name(&self) -> String {
        self.friendly(false)
    }

    /// A human-readable name for the type when it is a required type, where
    /// [`Type::DYNAMIC`] reads as "any type".
    pub fn friendly_name_for_constraint(&self) -> String {
        self.friendly(true)
    }

    fn friendly(&self, constraint: bool) -> String {
        match self {
            Type::Primitive(PrimitiveType::Bool) => "bool".to_string(),
            Type::Primitive(PrimitiveType::Number) => "number".to_string(),
            Type::Primitive(PrimitiveType::String) => "string".to_string(),
            Type::DynamicPseudo if constraint => "any type".to_string(),
            Type::DynamicPseudo => "dynamic".to_string(),
            Type::List(e) => format!("list of {}", e.friendly(constraint)),
            Type::Map(e) => format!("map of {}", e.friendly(constraint)),
            Type::Set(e) => format!("set of {}", e.friendly(constraint)),
            Type::Tuple(_) => "tuple".to_string(),
            Type::Object(_) => "object".to_string(),
            Type::Capsule(c) => c.name().to_string(),
        }
    }
}

fn normalize_attrs<K: AsRef<str>>(attrs: impl IntoIterator<Item = (K, Type)>) -> BTreeMap<String, Type> {
    attrs
        .into_iter()
        .map(|(k, t)| (normalize_string(k.as_ref()), t))
        .collect()
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::DynamicPseudo, Type::DynamicPseudo) => true,
            (Type::List(a), Type::List(b))
            | (Type::Map(a), Type::Map(b))
            | (Type::Set(a), Type::Set(b)) => Rc::ptr_eq(a, b) || a == b,
            (Type::Tuple(a), Type::Tuple(b)) => Rc::ptr_eq(a, b) || a == b,
            (Type::Object(a), Type::Object(b)) => Rc::ptr_eq(a, b) || a == b,
            (Type::Capsule(a), Type::Capsule(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.friendly_name())
    }
}

// Renders the constructor expression that would build the type.
impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(PrimitiveType::Bool) => f.write_str("Type::BOOL"),
            Type::Primitive(PrimitiveType::Number) => f.write_str("Type::NUMBER"),
            Type::Primitive(PrimitiveType::String) => f.write_str("Type::STRING"),
            Type::DynamicPseudo => f.write_str("Type::DYNAMIC"),
            Type::List(e) => write!(f, "Type::list({e:?})"),
            Type::Map(e) => write!(f, "Type::map({e:?})"),
            Type::Set(e) => write!(f, "Type::set({e:?})"),
            Type::Tuple(elems) => write!(f, "Type::tuple(vec!{elems:?})"),
            Type::Object(o) => {
                let attrs: Vec<_> = o.attribute_types().iter().collect();
                if o.optional_attributes().is_empty() {
                    write!(f, "Type::object({attrs:?})")
                } else {
                    let optional: Vec<_> = o.optional_attributes().iter().collect();
                    write!(f, "Type::object_with_optional_attrs({attrs:?}, {optional:?})")
                }
            }
            Type::Capsule(c) => match c.ops().type_debug_string {
                Some(hook) => f.write_str(&hook()),
                None => write!(f, "Type::capsule({:?})", c.name()),
            },
        }
    }
}
