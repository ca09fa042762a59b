//! Observed name -> value mappings
//!
//! A tracker never owns the mapping it watches. The caller keeps a
//! [`Shared`] handle and keeps mutating it; the tracker re-reads it on
//! every query.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Live handle to a mapping shared between its owner and a tracker
pub type Shared<M> = Rc<RefCell<M>>;

/// Wrap a mapping in a [`Shared`] handle
pub fn shared<M>(bindings: M) -> Shared<M> {
    Rc::new(RefCell::new(bindings))
}

/// Insertion-ordered locals, the closest analogue of a frame's local table
pub type Locals<V> = IndexMap<String, V>;

/// A mapping from binding name to its current value
pub trait Bindings {
    type Value: Clone;

    /// Names in the mapping's own iteration order
    fn names(&self) -> impl Iterator<Item = &str>;

    /// Current value bound to `name`, if any
    fn value_of(&self, name: &str) -> Option<Self::Value>;
}

impl<V: Clone> Bindings for IndexMap<String, V> {
    type Value = V;

    fn names(&self) -> impl Iterator<Item = &str> {
        self.keys().map(String::as_str)
    }

    fn value_of(&self, name: &str) -> Option<V> {
        self.get(name).cloned()
    }
}

impl<V: Clone> Bindings for HashMap<String, V> {
    type Value = V;

    fn names(&self) -> impl Iterator<Item = &str> {
        self.keys().map(String::as_str)
    }

    fn value_of(&self, name: &str) -> Option<V> {
        self.get(name).cloned()
    }
}

impl<V: Clone> Bindings for BTreeMap<String, V> {
    type Value = V;

    fn names(&self) -> impl Iterator<Item = &str> {
        self.keys().map(String::as_str)
    }

    fn value_of(&self, name: &str) -> Option<V> {
        self.get(name).cloned()
    }
}

/// Whether a name is hidden by the underscore filter
pub(crate) fn is_private(name: &str) -> bool {
    name.starts_with('_')
}
