// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Path, PathError, PathStep, Type, Value};

impl Type {
    /// Checks whether a value of type `self` could be used where `want` is
    /// required, without any conversion.
    ///
    /// Every mismatch in the structure is reported, each tagged with the path
    /// where it was found. An empty result means the types conform. A `want`
    /// of [`Type::DYNAMIC`], at any depth, accepts anything in that position.
    pub fn test_conformance(&self, want: &Type) -> Vec<PathError> {
        let mut errors = Vec::new();
        let mut path = Path::default();
        test_conformance(self, want, &mut path, &mut errors);
        if !errors.is_empty() {
            tracing::trace!(
                given = %self.friendly_name(),
                want = %want.friendly_name_for_constraint(),
                mismatches = errors.len(),
                "type does not conform"
            );
        }
        errors
    }
}

fn test_conformance(given: &Type, want: &Type, path: &mut Path, errors: &mut Vec<PathError>) {
    if want.is_dynamic() || given == want {
        return;
    }

    match (given, want) {
        (Type::Object(got), Type::Object(wanted)) => {
            for name in got.attribute_types().keys() {
                if !wanted.attribute_types().contains_key(name) {
                    errors.push(path.error(format!("unsupported attribute {name:?}")));
                }
            }
            for name in wanted.attribute_types().keys() {
                if !got.attribute_types().contains_key(name) {
                    errors.push(path.error(format!("missing required attribute {name:?}")));
                }
            }
            for (name, want_ty) in wanted.attribute_types() {
                if let Some(got_ty) = got.attribute_types().get(name) {
                    path.push(PathStep::GetAttr(name.clone()));
                    test_conformance(got_ty, want_ty, path, errors);
                    path.pop();
                }
            }
        }
        (Type::Tuple(got), Type::Tuple(wanted)) => {
            if got.len() != wanted.len() {
                errors.push(path.error(format!(
                    "{} elements are required, but got {}",
                    wanted.len(),
                    got.len()
                )));
                return;
            }
            for (i, (got_ty, want_ty)) in got.iter().zip(wanted.iter()).enumerate() {
                path.push(PathStep::Index(Value::from(i)));
                test_conformance(got_ty, want_ty, path, errors);
                path.pop();
            }
        }
        (Type::List(got), Type::List(wanted)) => {
            path.push(PathStep::Index(Value::unknown(Type::NUMBER)));
            test_conformance(got, wanted, path, errors);
            path.pop();
        }
        (Type::Map(got), Type::Map(wanted)) => {
            path.push(PathStep::Index(Value::unknown(Type::STRING)));
            test_conformance(got, wanted, path, errors);
            path.pop();
        }
        (Type::Set(got), Type::Set(wanted)) => {
            path.push(PathStep::Index(Value::unknown((**got).clone())));
            test_conformance(got, wanted, path, errors);
            path.pop();
        }
        _ => errors.push(path.error(format!(
            "{} required, but received {}",
            want.friendly_name_for_constraint(),
            given.friendly_name()
        ))),
    }
}
