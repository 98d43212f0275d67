// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! JSON descriptions of types.
//!
//! Primitive types and the dynamic pseudo-type are bare strings. Compound
//! types are arrays whose first element names the kind:
//!
//! ```text
//! "bool" | "number" | "string" | "dynamic"
//! ["list", <type>]   ["map", <type>]   ["set", <type>]
//! ["tuple", [<type>, ...]]
//! ["object", {"attr": <type>, ...}]
//! ["object", {"attr": <type>, ...}, ["optional-attr", ...]]
//! ```
//!
//! Capsule types have no description and cannot be serialized.

use core::fmt;
use std::collections::BTreeMap;

use anyhow::Result;
use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::types::PrimitiveType;
use crate::Type;

impl Serialize for Type {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error;
        match self {
            Type::Primitive(PrimitiveType::Bool) => serializer.serialize_str("bool"),
            Type::Primitive(PrimitiveType::Number) => serializer.serialize_str("number"),
            Type::Primitive(PrimitiveType::String) => serializer.serialize_str("string"),
            Type::DynamicPseudo => serializer.serialize_str("dynamic"),
            Type::List(e) | Type::Map(e) | Type::Set(e) => {
                let kind = match self {
                    Type::List(_) => "list",
                    Type::Map(_) => "map",
                    _ => "set",
                };
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(kind)?;
                seq.serialize_element(e.as_ref())?;
                seq.end()
            }
            Type::Tuple(elems) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("tuple")?;
                seq.serialize_element(elems.as_ref())?;
                seq.end()
            }
            Type::Object(o) => {
                let optional = o.optional_attributes();
                let len = if optional.is_empty() { 2 } else { 3 };
                let mut seq = serializer.serialize_seq(Some(len))?;
                seq.serialize_element("object")?;
                seq.serialize_element(o.attribute_types())?;
                if !optional.is_empty() {
                    seq.serialize_element(optional)?;
                }
                seq.end()
            }
            Type::Capsule(_) => Err(S::Error::custom(format!(
                "type not allowed: {}",
                self.friendly_name()
            ))),
        }
    }
}

struct TypeVisitor;

impl<'de> Visitor<'de> for TypeVisitor {
    type Value = Type;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a type description")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match s {
            "bool" => Ok(Type::BOOL),
            "number" => Ok(Type::NUMBER),
            "string" => Ok(Type::STRING),
            "dynamic" => Ok(Type::DYNAMIC),
            _ => Err(E::custom(format!("invalid primitive type name {s:?}"))),
        }
    }

    fn visit_seq<V>(self, mut seq: V) -> Result<Self::Value, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let kind: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::custom("missing complex type kind name"))?;

        let missing = || de::Error::custom(format!("missing element type for {kind:?}"));
        let ty = match kind.as_str() {
            "list" => Type::list(seq.next_element()?.ok_or_else(missing)?),
            "map" => Type::map(seq.next_element()?.ok_or_else(missing)?),
            "set" => Type::set(seq.next_element()?.ok_or_else(missing)?),
            "tuple" => {
                let elems: Vec<Type> = seq.next_element()?.ok_or_else(missing)?;
                Type::tuple(elems)
            }
            "object" => {
                let attrs: BTreeMap<String, Type> = seq.next_element()?.ok_or_else(missing)?;
                match seq.next_element::<Vec<String>>()? {
                    Some(optional) => {
                        if let Some(name) = optional.iter().find(|n| !attrs.contains_key(*n)) {
                            return Err(de::Error::custom(format!(
                                "optional attribute {name:?} is not declared"
                            )));
                        }
                        Type::object_with_optional_attrs(attrs, optional)
                    }
                    None => Type::object(attrs),
                }
            }
            _ => {
                return Err(de::Error::custom(format!(
                    "invalid complex type kind name {kind:?}"
                )))
            }
        };

        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::custom("unexpected extra data in type description"));
        }
        Ok(ty)
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D>(deserializer: D) -> Result<Type, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TypeVisitor)
    }
}

impl Type {
    pub fn from_json_str(json: &str) -> Result<Type> {
        match serde_json::from_str(json) {
            Ok(ty) => Ok(ty),
            Err(e) => {
                tracing::debug!(error = %e, "invalid type description");
                Err(e.into())
            }
        }
    }

    pub fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
