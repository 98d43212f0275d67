// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::any::{Any, TypeId};
use core::fmt;

use crate::{Path, PathError, Rc, Value};

/// Converts a value for the external conversion layer. Returned by the
/// [`CapsuleOps::conversion_from`] and [`CapsuleOps::conversion_to`] hooks.
pub type CapsuleConversion =
    Rc<dyn Fn(&Value, &Path) -> Result<Value, PathError> + Send + Sync>;

/// Optional behaviour hooks for a capsule type.
///
/// Every hook receives the encapsulated native values. A missing hook falls
/// back to identity semantics: values are equal only when they wrap the same
/// native allocation, and all values share one hash bucket.
#[derive(Clone, Default)]
pub struct CapsuleOps {
    /// Renders a native value for `Debug` output of the wrapping value.
    pub debug_string: Option<fn(&dyn Any) -> String>,
    /// Renders the capsule type itself for `Debug` output.
    pub type_debug_string: Option<fn() -> String>,
    /// Equality that may return an unknown result. Must return a bool value.
    pub equals: Option<fn(&dyn Any, &dyn Any) -> Value>,
    /// Exact equality, also used by `equals` when that hook is absent.
    pub raw_equals: Option<fn(&dyn Any, &dyn Any) -> bool>,
    /// A string that is equal for any two native values that are equal.
    pub hash_key: Option<fn(&dyn Any) -> String>,
    /// Conversion from a value of the given type into this capsule type.
    pub conversion_from: Option<fn(&crate::Type) -> Option<CapsuleConversion>>,
    /// Conversion from this capsule type into a value of the given type.
    pub conversion_to: Option<fn(&crate::Type) -> Option<CapsuleConversion>>,
}

impl fmt::Debug for CapsuleOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapsuleOps")
            .field("debug_string", &self.debug_string.is_some())
            .field("type_debug_string", &self.type_debug_string.is_some())
            .field("equals", &self.equals.is_some())
            .field("raw_equals", &self.raw_equals.is_some())
            .field("hash_key", &self.hash_key.is_some())
            .field("conversion_from", &self.conversion_from.is_some())
            .field("conversion_to", &self.conversion_to.is_some())
            .finish()
    }
}

pub struct CapsuleType {
    name: String,
    native: TypeId,
    native_name: &'static str,
    ops: CapsuleOps,
}

impl CapsuleType {
    pub(crate) fn new<T: Any + Send + Sync>(name: String, ops: CapsuleOps) -> Self {
        Self {
            name,
            native: TypeId::of::<T>(),
            native_name: core::any::type_name::<T>(),
            ops,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ops(&self) -> &CapsuleOps {
        &self.ops
    }

    pub fn native_type_name(&self) -> &'static str {
        self.native_name
    }

    pub(crate) fn accepts<T: Any>(&self) -> bool {
        self.native == TypeId::of::<T>()
    }
}

impl fmt::Debug for CapsuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapsuleType")
            .field("name", &self.name)
            .field("native", &self.native_name)
            .field("ops", &self.ops)
            .finish()
    }
}
