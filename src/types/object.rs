// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::{BTreeMap, BTreeSet};

use crate::Type;

/// Attribute layout of an object type. Attribute names iterate in sorted
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectType {
    attr_types: BTreeMap<String, Type>,
    optional: BTreeSet<String>,
}

impl ObjectType {
    pub(crate) fn new(attr_types: BTreeMap<String, Type>, optional: BTreeSet<String>) -> Self {
        Self {
            attr_types,
            optional,
        }
    }

    pub fn attribute_types(&self) -> &BTreeMap<String, Type> {
        &self.attr_types
    }

    pub fn optional_attributes(&self) -> &BTreeSet<String> {
        &self.optional
    }
}
