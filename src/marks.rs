// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::any::Any;
use core::convert::Infallible;
use core::fmt;
use core::hash::{Hash, Hasher};

use rustc_hash::FxHashSet;

use crate::value::Repr;
use crate::{transform, Path, PathStep, Rc, Value};

trait MarkToken: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_token(&self, other: &dyn MarkToken) -> bool;
    fn hash_token(&self, state: &mut dyn Hasher);
    fn fmt_token(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T> MarkToken for T
where
    T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_token(&self, other: &dyn MarkToken) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn hash_token(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_token(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An opaque tag carried by a value.
///
/// Marks wrap any comparable token. Two marks are equal when their tokens
/// have the same Rust type and compare equal.
#[derive(Clone)]
pub struct Mark(Rc<dyn MarkToken>);

impl Mark {
    pub fn new<T>(token: T) -> Mark
    where
        T: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        Mark(Rc::new(token))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for Mark {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_token(other.0.as_ref())
    }
}

impl Eq for Mark {}

impl Hash for Mark {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_any().type_id().hash(state);
        self.0.hash_token(state);
    }
}

impl fmt::Debug for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mark::new(")?;
        self.0.fmt_token(f)?;
        write!(f, ")")
    }
}

pub type ValueMarks = FxHashSet<Mark>;

/// Marks found at a path inside a value, as reported by
/// [`Value::unmark_deep_with_paths`].
#[derive(Clone, Debug)]
pub struct PathValueMarks {
    pub path: Path,
    pub marks: ValueMarks,
}

impl PartialEq for PathValueMarks {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.marks == other.marks
    }
}

impl Value {
    pub fn is_marked(&self) -> bool {
        self.marks.is_some()
    }

    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.as_ref().is_some_and(|m| m.contains(mark))
    }

    /// A copy of the value's own marks, not including nested ones.
    pub fn marks(&self) -> ValueMarks {
        self.marks.as_deref().cloned().unwrap_or_default()
    }

    pub fn has_same_marks(&self, other: &Value) -> bool {
        match (&self.marks, &other.marks) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }

    /// The value with `mark` added to its marks.
    pub fn mark(&self, mark: Mark) -> Value {
        self.mark_with_marks([mark])
    }

    /// The value with all of `marks` added to its marks. Marking an already
    /// marked value merges the mark sets.
    pub fn mark_with_marks(&self, marks: impl IntoIterator<Item = Mark>) -> Value {
        let mut marks = marks.into_iter().peekable();
        if marks.peek().is_none() {
            return self.clone();
        }
        let mut merged = self.marks();
        merged.extend(marks);
        Value {
            ty: self.ty.clone(),
            v: self.v.clone(),
            marks: Some(Rc::new(merged)),
        }
    }

    /// The value carrying the marks of every value in `sources`.
    pub fn with_same_marks<'a>(&self, sources: impl IntoIterator<Item = &'a Value>) -> Value {
        self.mark_with_marks(sources.into_iter().flat_map(Value::marks))
    }

    /// Removes the value's own marks, returning them alongside.
    pub fn unmark(&self) -> (Value, ValueMarks) {
        match &self.marks {
            None => (self.clone(), ValueMarks::default()),
            Some(marks) => (
                Value {
                    ty: self.ty.clone(),
                    v: self.v.clone(),
                    marks: None,
                },
                marks.as_ref().clone(),
            ),
        }
    }

    /// Whether the value or anything nested inside it is marked.
    pub fn contains_marked(&self) -> bool {
        if self.is_marked() {
            return true;
        }
        // Lists, maps and sets never hold marked elements.
        match &self.v {
            Repr::Seq(elems) if self.ty.is_tuple_type() => elems.iter().any(Value::contains_marked),
            Repr::Map(attrs) if self.ty.is_object_type() => {
                attrs.values().any(Value::contains_marked)
            }
            _ => false,
        }
    }

    /// Removes marks at every depth, returning all of them merged.
    pub fn unmark_deep(&self) -> (Value, ValueMarks) {
        let mut marks = ValueMarks::default();
        let v = self.unmark_deep_into(&mut |_, m| marks.extend(m.iter().cloned()), &mut Path::default());
        (v, marks)
    }

    /// Removes marks at every depth, returning them grouped by where they
    /// were found.
    pub fn unmark_deep_with_paths(&self) -> (Value, Vec<PathValueMarks>) {
        let mut found = Vec::new();
        let v = self.unmark_deep_into(
            &mut |path, m| {
                found.push(PathValueMarks {
                    path: path.clone(),
                    marks: m.clone(),
                })
            },
            &mut Path::default(),
        );
        (v, found)
    }

    fn unmark_deep_into(&self, found: &mut dyn FnMut(&Path, &ValueMarks), path: &mut Path) -> Value {
        if !self.contains_marked() {
            return self.clone();
        }
        let (v, marks) = self.unmark();
        if !marks.is_empty() {
            found(path, &marks);
        }
        match &v.v {
            Repr::Seq(elems) if v.ty.is_tuple_type() => {
                let mut unmarked = Vec::with_capacity(elems.len());
                for (i, elem) in elems.iter().enumerate() {
                    path.push(PathStep::Index(Value::from(i)));
                    unmarked.push(elem.unmark_deep_into(found, path));
                    path.pop();
                }
                Value::tuple(unmarked)
            }
            Repr::Map(attrs) if v.ty.is_object_type() => {
                let mut unmarked = Vec::with_capacity(attrs.len());
                for (name, attr) in attrs.iter() {
                    path.push(PathStep::GetAttr(name.clone()));
                    unmarked.push((name.as_str(), attr.unmark_deep_into(found, path)));
                    path.pop();
                }
                // Keep the declared optional attributes.
                let mut obj = Value::object(unmarked);
                obj.ty = v.ty.clone();
                obj
            }
            _ => v,
        }
    }

    /// Applies marks at the given paths. Marks that land on elements of a
    /// list, map or set move onto the collection.
    pub fn mark_with_paths(&self, marks: &[PathValueMarks]) -> Value {
        let result: Result<Value, Infallible> = transform(self, |path, v| {
            let mut v = v;
            for pvm in marks.iter().filter(|pvm| pvm.path == *path) {
                v = v.mark_with_marks(pvm.marks.iter().cloned());
            }
            Ok(v)
        });
        match result {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }
}
