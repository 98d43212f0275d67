// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;

use crate::{Type, Value};

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq)]
pub enum PathStep {
    /// Selects an object attribute by name.
    GetAttr(String),
    /// Selects an element by key: a number for lists and tuples, a string
    /// for maps, or the element itself for sets.
    Index(Value),
}

/// A sequence of steps leading into a nested value.
///
/// Paths compare exactly: index keys must be raw-equal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    steps: Vec<PathStep>,
}

/// An error tagged with the path where it happened.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{}{message}", path_prefix(.path))]
pub struct PathError {
    pub path: Path,
    pub message: String,
}

fn path_prefix(path: &Path) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}: ")
    }
}

impl PathError {
    pub fn new(path: Path, message: impl Into<String>) -> PathError {
        PathError {
            path,
            message: message.into(),
        }
    }
}

pub fn get_attr_path(name: &str) -> Path {
    Path::default().get_attr(name)
}

pub fn index_path(key: Value) -> Path {
    Path::default().index(key)
}

pub fn index_int_path(idx: i64) -> Path {
    Path::default().index_int(idx)
}

pub fn index_string_path(key: &str) -> Path {
    Path::default().index_string(key)
}

impl Path {
    pub fn new() -> Path {
        Path::default()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Option<PathStep> {
        self.steps.pop()
    }

    /// A copy of the path with an attribute step appended.
    pub fn get_attr(&self, name: &str) -> Path {
        self.with_step(PathStep::GetAttr(name.to_string()))
    }

    /// A copy of the path with an index step appended.
    pub fn index(&self, key: Value) -> Path {
        self.with_step(PathStep::Index(key))
    }

    pub fn index_int(&self, idx: i64) -> Path {
        self.index(Value::number_int(idx))
    }

    pub fn index_string(&self, key: &str) -> Path {
        self.index(Value::string(key))
    }

    fn with_step(&self, step: PathStep) -> Path {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Path { steps }
    }

    pub fn copy(&self) -> Path {
        self.clone()
    }

    pub fn equals(&self, other: &Path) -> bool {
        self == other
    }

    pub fn has_prefix(&self, prefix: &Path) -> bool {
        prefix.len() <= self.len() && self.steps[..prefix.len()] == prefix.steps[..]
    }

    /// An error at this path.
    pub fn error(&self, message: impl Into<String>) -> PathError {
        PathError::new(self.clone(), message)
    }

    /// Follows the path into `val`.
    ///
    /// The error reports the path up to and including the step that failed.
    pub fn apply(&self, val: &Value) -> Result<Value, PathError> {
        let mut current = val.clone();
        for (i, step) in self.steps.iter().enumerate() {
            current = match step.apply(&current) {
                Ok(v) => v,
                Err(message) => {
                    let failed = Path {
                        steps: self.steps[..=i].to_vec(),
                    };
                    tracing::debug!(path = %failed, %message, "path does not apply");
                    return Err(PathError::new(failed, message));
                }
            };
        }
        Ok(current)
    }

    /// Follows all but the last step, returning the value reached and the
    /// final step. An empty path gives `val` itself and no step.
    pub fn last_step(&self, val: &Value) -> Result<(Value, Option<PathStep>), PathError> {
        let Some((last, journey)) = self.steps.split_last() else {
            return Ok((val.clone(), None));
        };
        let journey = Path {
            steps: journey.to_vec(),
        };
        Ok((journey.apply(val)?, Some(last.clone())))
    }
}

impl PathStep {
    /// Takes this step from `val`.
    pub fn apply(&self, val: &Value) -> Result<Value, String> {
        if val.ty().is_dynamic() && !val.is_known() {
            return Ok(Value::DYNAMIC);
        }
        match self {
            PathStep::GetAttr(name) => {
                if val.is_null() {
                    return Err("attempt to access attribute of null value".to_string());
                }
                if !val.ty().is_object_type() {
                    return Err("not an object type".to_string());
                }
                if !val.ty().has_attribute(name) {
                    return Err(format!("object has no attribute {name:?}"));
                }
                Ok(val.get_attr(name))
            }
            PathStep::Index(key) => {
                if val.is_null() {
                    return Err("cannot index a null value".to_string());
                }
                if val.ty().is_set_type() {
                    return apply_set_step(val, key);
                }
                if *key.ty() == Type::NUMBER {
                    if !val.ty().is_list_type() && !val.ty().is_tuple_type() {
                        return Err("not a list type".to_string());
                    }
                } else if *key.ty() == Type::STRING {
                    if !val.ty().is_map_type() {
                        return Err("not a map type".to_string());
                    }
                } else {
                    return Err("key value not number or string".to_string());
                }
                match val.has_index(key).known_bool() {
                    None => Ok(match val.ty() {
                        Type::List(e) | Type::Map(e) => Value::unknown(e.as_ref().clone()),
                        _ => Value::DYNAMIC,
                    }),
                    Some(true) => Ok(val.index(key)),
                    Some(false) => Err("value does not have given index key".to_string()),
                }
            }
        }
    }
}

fn apply_set_step(set: &Value, elem: &Value) -> Result<Value, String> {
    let elem_ty = set.ty().element_type();
    if elem.ty() != elem_ty && !elem.ty().is_dynamic() {
        return Err(format!("set element must be {}", elem_ty.friendly_name()));
    }
    match set.has_element(elem).known_bool() {
        Some(true) => Ok(elem.clone().with_same_marks([set])),
        Some(false) => Err("set does not contain given element".to_string()),
        None => Ok(Value::unknown(elem_ty.clone()).with_same_marks([set])),
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::GetAttr(name) if i == 0 => f.write_str(name)?,
                PathStep::GetAttr(name) => write!(f, ".{name}")?,
                PathStep::Index(key) => {
                    let (key, _) = key.unmark();
                    if !key.is_known() {
                        f.write_str("[*]")?;
                    } else if let Some(n) = key.known_number() {
                        write!(f, "[{n}]")?;
                    } else if let Some(s) = key.known_str() {
                        write!(f, "[{s:?}]")?;
                    } else {
                        write!(f, "[{key:?}]")?;
                    }
                }
            }
        }
        Ok(())
    }
}
