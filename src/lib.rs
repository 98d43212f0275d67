// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A dynamic type system and immutable value model.
//!
//! Values carry their [`Type`] and are either null, unknown (optionally
//! refined to a narrower range) or known. Values may also carry opaque
//! [`Mark`]s that propagate through operations. Nested structures can be
//! addressed with [`Path`]s and visited with [`walk`] and [`transform`].

mod marks;
mod number;
mod path;
mod path_set;
mod range;
mod refinement;
mod types;
mod unicode;
mod value;
mod value_set;
mod walk;

pub mod set;

#[cfg(feature = "arc")]
pub(crate) use std::sync::Arc as Rc;

#[cfg(not(feature = "arc"))]
pub(crate) use std::rc::Rc;

pub use marks::{Mark, PathValueMarks, ValueMarks};
pub use number::{Number, NumberError, DIVISION_DIGITS};
pub use path::{
    get_attr_path, index_int_path, index_path, index_string_path, Path, PathError, PathStep,
};
pub use path_set::PathSet;
pub use range::ValueRange;
pub use refinement::{RefinementBuilder, Tristate};
pub use types::{CapsuleConversion, CapsuleOps, CapsuleType, ObjectType, PrimitiveType, Type};
pub use unicode::normalize_string;
pub use value::{ElementIterator, Value};
pub use value_set::{ValueRules, ValueSet};
pub use walk::{transform, transform_with_transformer, walk, Transformer};
