// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Repr;
use crate::{Path, PathStep, Value};

/// Visits `val` and everything nested inside it, parents first.
///
/// `cb` returns whether to descend into the children of the value it was
/// given. Null and unknown values have no children. An error from `cb`
/// stops the walk and is returned.
pub fn walk<E>(
    val: &Value,
    mut cb: impl FnMut(&Path, &Value) -> Result<bool, E>,
) -> Result<(), E> {
    let mut path = Path::new();
    walk_inner(&mut path, val, &mut cb).inspect_err(|_| {
        tracing::debug!(path = %path, "walk aborted");
    })
}

fn walk_inner<E>(
    path: &mut Path,
    val: &Value,
    cb: &mut impl FnMut(&Path, &Value) -> Result<bool, E>,
) -> Result<(), E> {
    if !cb(path, val)? {
        return Ok(());
    }
    // The callback has seen the marks, children may carry their own.
    let (val, _) = val.unmark();
    match &val.v {
        Repr::Map(attrs) if val.ty.is_object_type() => {
            for (name, attr) in attrs.iter() {
                path.push(PathStep::GetAttr(name.clone()));
                walk_inner(path, attr, cb)?;
                path.pop();
            }
        }
        Repr::Seq(_) | Repr::Map(_) | Repr::Set(_) => {
            for (key, elem) in val.element_iterator() {
                path.push(PathStep::Index(key));
                walk_inner(path, &elem, cb)?;
                path.pop();
            }
        }
        _ => {}
    }
    Ok(())
}

/// Rewrites values during [`transform_with_transformer`].
pub trait Transformer<E> {
    /// Called before a value's children are transformed. The returned value
    /// is the one whose children are visited.
    fn enter(&mut self, _path: &Path, val: Value) -> Result<Value, E> {
        Ok(val)
    }

    /// Called after a value has been rebuilt from its transformed children.
    fn exit(&mut self, path: &Path, val: Value) -> Result<Value, E>;
}

struct PostOrder<F>(F);

impl<E, F> Transformer<E> for PostOrder<F>
where
    F: FnMut(&Path, Value) -> Result<Value, E>,
{
    fn exit(&mut self, path: &Path, val: Value) -> Result<Value, E> {
        (self.0)(path, val)
    }
}

/// Rebuilds `val` bottom-up: children are transformed first, the parent is
/// rebuilt from them with its marks kept, and then `cb` is called on it.
///
/// Callers must keep element types consistent within lists, maps and sets.
pub fn transform<E>(
    val: &Value,
    cb: impl FnMut(&Path, Value) -> Result<Value, E>,
) -> Result<Value, E> {
    transform_with_transformer(val, &mut PostOrder(cb))
}

/// Like [`transform`], with both an `enter` and an `exit` hook.
pub fn transform_with_transformer<E>(
    val: &Value,
    t: &mut impl Transformer<E>,
) -> Result<Value, E> {
    let mut path = Path::new();
    transform_inner(&mut path, val.clone(), t).inspect_err(|_| {
        tracing::debug!(path = %path, "transform aborted");
    })
}

fn transform_inner<E>(
    path: &mut Path,
    val: Value,
    t: &mut impl Transformer<E>,
) -> Result<Value, E> {
    let val = t.enter(path, val)?;
    if val.is_null() || !val.is_known() {
        return t.exit(path, val);
    }
    let (val, marks) = val.unmark();

    let rebuilt = match &val.v {
        Repr::Seq(elems) if elems.is_empty() => val.clone(),
        Repr::Map(elems) if elems.is_empty() => val.clone(),
        Repr::Set(set) if set.is_empty() => val.clone(),
        Repr::Map(attrs) if val.ty.is_object_type() => {
            let mut new_attrs = Vec::with_capacity(attrs.len());
            for (name, attr) in attrs.iter() {
                path.push(PathStep::GetAttr(name.clone()));
                new_attrs.push((name.as_str(), transform_inner(path, attr.clone(), t)?));
                path.pop();
            }
            let mut obj = Value::object(new_attrs);
            // Keep optional-attribute markings when the attribute types survive.
            if obj.ty.attribute_types() == val.ty.attribute_types() {
                obj.ty = val.ty.clone();
            }
            obj
        }
        Repr::Seq(_) | Repr::Map(_) | Repr::Set(_) => {
            let mut keys = Vec::with_capacity(val.length_int());
            let mut elems = Vec::with_capacity(val.length_int());
            for (key, elem) in val.element_iterator() {
                path.push(PathStep::Index(key.clone()));
                elems.push(transform_inner(path, elem, t)?);
                path.pop();
                keys.push(key);
            }
            if val.ty.is_tuple_type() {
                Value::tuple(elems)
            } else if val.ty.is_list_type() {
                Value::list(elems)
            } else if val.ty.is_set_type() {
                Value::set(elems)
            } else {
                Value::map(keys.iter().map(|k| k.as_string()).zip(elems))
            }
        }
        _ => val.clone(),
    };
    t.exit(path, rebuilt.mark_with_marks(marks))
}
