// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use core::hash::Hasher;

use rustc_hash::FxHasher;

use crate::set::{Rules, Set};
use crate::{Path, PathStep};

// Index keys compare with `Value::equals`, so two paths whose keys are
// unknown are never the same path.
#[derive(Clone, Copy, Debug)]
struct PathRules;

impl Rules<Path> for PathRules {
    fn hash(&self, path: &Path) -> u64 {
        let mut hasher = FxHasher::default();
        for step in path.steps() {
            match step {
                PathStep::GetAttr(name) => hasher.write(name.as_bytes()),
                // All index steps hash alike.
                PathStep::Index(_) => hasher.write_u8(0),
            }
        }
        hasher.finish()
    }

    fn equivalent(&self, a: &Path, b: &Path) -> bool {
        a.len() == b.len()
            && a.steps().iter().zip(b.steps()).all(|pair| match pair {
                (PathStep::GetAttr(x), PathStep::GetAttr(y)) => x == y,
                (PathStep::Index(x), PathStep::Index(y)) => x.equals(y).known_bool() == Some(true),
                _ => false,
            })
    }

    fn same_rules(&self, _other: &Self) -> bool {
        true
    }
}

/// A mutable set of paths.
///
/// Paths are the same when they have the same steps, with index keys
/// compared by value.
#[derive(Clone)]
pub struct PathSet {
    set: Set<Path, PathRules>,
}

impl Default for PathSet {
    fn default() -> Self {
        PathSet::new()
    }
}

impl PathSet {
    pub fn new() -> PathSet {
        PathSet {
            set: Set::new(PathRules),
        }
    }

    pub fn new_from(paths: impl IntoIterator<Item = Path>) -> PathSet {
        PathSet {
            set: Set::new_from(PathRules, paths),
        }
    }

    pub fn add(&mut self, path: Path) {
        self.set.add(path);
    }

    /// Adds every non-empty prefix of `path`, including `path` itself.
    pub fn add_all_steps(&mut self, path: &Path) {
        let mut prefix = Path::new();
        for step in path.steps() {
            prefix.push(step.clone());
            self.set.add(prefix.clone());
        }
    }

    pub fn has(&self, path: &Path) -> bool {
        self.set.has(path)
    }

    pub fn remove(&mut self, path: &Path) {
        self.set.remove(path);
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// The paths, in no particular order.
    pub fn list(&self) -> Vec<Path> {
        self.set.iter().cloned().collect()
    }

    pub fn union(&self, other: &PathSet) -> PathSet {
        PathSet {
            set: self.set.union(&other.set),
        }
    }

    pub fn intersection(&self, other: &PathSet) -> PathSet {
        PathSet {
            set: self.set.intersection(&other.set),
        }
    }

    pub fn subtract(&self, other: &PathSet) -> PathSet {
        PathSet {
            set: self.set.subtract(&other.set),
        }
    }

    pub fn symmetric_difference(&self, other: &PathSet) -> PathSet {
        PathSet {
            set: self.set.symmetric_difference(&other.set),
        }
    }

    /// Whether both sets hold the same paths.
    pub fn equal(&self, other: &PathSet) -> bool {
        self.len() == other.len() && self.set.iter().all(|p| other.has(p))
    }
}

impl fmt::Debug for PathSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.set.iter().map(|p| p.to_string()))
            .finish()
    }
}
