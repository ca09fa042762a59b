//! Tracking names bound inside a scope
//!
//! A [`ScopeTracker`] snapshots the names of an observed mapping when it is
//! entered and later reports the names that were added since.

use crate::bindings::{is_private, Bindings, Shared};
use crate::error::{ScopeError, TrackerState};
use crate::extras::Extras;
use crate::frame;
use crate::logging;
use std::cell::Ref;
use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Tracks names bound in a mapping between enter and exit
///
/// The tracker does not own the mapping. It holds a [`Shared`] handle and
/// re-reads the mapping on every query; only the baseline name set is
/// kept between calls.
pub struct ScopeTracker<M: Bindings> {
    /// Explicit mapping to observe; the innermost call frame if absent
    bindings: Option<Shared<M>>,
    /// Mapping resolved by the last enter, held until exit
    active: Option<Shared<M>>,
    /// Names considered already present
    baseline: HashSet<String>,
    extras: Extras,
    ignore_underscore: bool,
    state: TrackerState,
}

impl<M: Bindings + 'static> ScopeTracker<M> {
    /// Create a tracker with no extras that observes the caller frame and
    /// ignores underscore-prefixed names
    pub fn new() -> Self {
        Self {
            bindings: None,
            active: None,
            baseline: HashSet::new(),
            extras: Extras::none(),
            ignore_underscore: true,
            state: TrackerState::Inactive,
        }
    }

    /// Names to treat as present at enter, typically the tracker's own
    pub fn with_extras(mut self, extras: impl Into<Extras>) -> Self {
        self.extras = extras.into();
        self
    }

    /// Observe `bindings` instead of the innermost call frame
    pub fn with_bindings(mut self, bindings: Shared<M>) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Whether names starting with `_` are left out of diffs
    pub fn ignore_underscore(mut self, ignore: bool) -> Self {
        self.ignore_underscore = ignore;
        self
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TrackerState::Active
    }

    pub fn ignores_underscore(&self) -> bool {
        self.ignore_underscore
    }

    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    /// Names considered already present
    pub fn baseline(&self) -> &HashSet<String> {
        &self.baseline
    }

    /// Begin the scope
    ///
    /// Resolves the observed mapping and snapshots its names together with
    /// the extras. A tracker can be entered once.
    pub fn enter(&mut self) -> Result<&mut Self, ScopeError> {
        if self.state != TrackerState::Inactive {
            return Err(ScopeError::invalid_state("enter", self.state));
        }

        let (bindings, source) = match &self.bindings {
            Some(bindings) => (Rc::clone(bindings), "explicit bindings"),
            None => (frame::caller_locals::<M>()?, "caller frame"),
        };

        let mut baseline: HashSet<String> = {
            let current = bindings
                .try_borrow()
                .map_err(|_| ScopeError::BindingsBorrowed)?;
            let names: HashSet<String> = current.names().map(str::to_string).collect();
            names
        };
        baseline.extend(self.extras.iter().map(str::to_string));

        logging::log_enter(source, baseline.len(), self.extras.len());

        self.baseline = baseline;
        self.active = Some(bindings);
        self.state = TrackerState::Active;
        Ok(self)
    }

    /// End the scope, releasing the observed mapping
    ///
    /// Does nothing unless the scope is active.
    pub fn exit(&mut self) {
        if self.active.take().is_some() {
            logging::log_exit(self.baseline.len());
        }
        if self.state == TrackerState::Active {
            self.state = TrackerState::Exited;
        }
    }

    /// Enter and return a guard that exits when dropped
    pub fn guard(&mut self) -> Result<ScopeGuard<'_, M>, ScopeError> {
        self.enter()?;
        Ok(ScopeGuard { tracker: self })
    }

    /// Run `f` inside the scope
    ///
    /// The scope is exited however `f` finishes, including by panic.
    pub fn scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> Result<R, ScopeError> {
        let mut guard = self.guard()?;
        Ok(f(&mut *guard))
    }

    /// Mark every name currently in the mapping as no longer new
    pub fn refresh(&mut self) -> Result<(), ScopeError> {
        let names: Vec<String> = {
            let bindings = self.borrow_active("refresh")?;
            let names = bindings.names().map(str::to_string).collect();
            names
        };

        let before = self.baseline.len();
        self.baseline.extend(names);
        logging::log_refresh(before, self.baseline.len());
        Ok(())
    }

    /// Names added since enter or the last refresh
    pub fn diff(&self) -> Result<HashSet<String>, ScopeError> {
        let bindings = self.borrow_active("diff")?;
        let names: HashSet<String> = self.novel_names(&bindings).collect();
        logging::log_diff(names.len(), self.ignore_underscore);
        Ok(names)
    }

    /// New names with their values, in the mapping's iteration order
    ///
    /// The names are fixed when this is called; each value is read from the
    /// mapping when its pair is produced.
    pub fn items(&self) -> Result<Items<M>, ScopeError> {
        let pending: Vec<String> = {
            let bindings = self.borrow_active("items")?;
            let names = self.novel_names(&bindings).collect();
            names
        };

        Ok(Items {
            bindings: Rc::clone(self.active_bindings("items")?),
            pending: pending.into_iter(),
        })
    }

    fn active_bindings(&self, operation: &'static str) -> Result<&Shared<M>, ScopeError> {
        match (&self.active, self.state) {
            (Some(bindings), TrackerState::Active) => Ok(bindings),
            _ => Err(ScopeError::invalid_state(operation, self.state)),
        }
    }

    fn borrow_active(&self, operation: &'static str) -> Result<Ref<'_, M>, ScopeError> {
        self.active_bindings(operation)?
            .try_borrow()
            .map_err(|_| ScopeError::BindingsBorrowed)
    }

    fn novel_names<'a>(&'a self, bindings: &'a M) -> impl Iterator<Item = String> + 'a {
        bindings
            .names()
            .filter(move |name| !(self.ignore_underscore && is_private(name)))
            .filter(move |name| !self.baseline.contains(*name))
            .map(str::to_string)
    }
}

impl<M: Bindings + 'static> Default for ScopeTracker<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Bindings> fmt::Debug for ScopeTracker<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeTracker")
            .field("state", &self.state)
            .field("baseline", &self.baseline.len())
            .field("extras", &self.extras)
            .field("ignore_underscore", &self.ignore_underscore)
            .field("explicit_bindings", &self.bindings.is_some())
            .finish()
    }
}

/// An entered tracker that exits when dropped
pub struct ScopeGuard<'a, M: Bindings + 'static> {
    tracker: &'a mut ScopeTracker<M>,
}

impl<M: Bindings + 'static> Deref for ScopeGuard<'_, M> {
    type Target = ScopeTracker<M>;

    fn deref(&self) -> &Self::Target {
        self.tracker
    }
}

impl<M: Bindings + 'static> DerefMut for ScopeGuard<'_, M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.tracker
    }
}

impl<M: Bindings + 'static> Drop for ScopeGuard<'_, M> {
    fn drop(&mut self) {
        self.tracker.exit();
    }
}

/// Lazily produced `(name, value)` pairs of new bindings
///
/// While the observed mapping is mutably borrowed `next` returns `None`
/// without consuming anything; iteration resumes once the borrow ends.
pub struct Items<M: Bindings> {
    bindings: Shared<M>,
    pending: std::vec::IntoIter<String>,
}

impl<M: Bindings> Iterator for Items<M> {
    type Item = (String, M::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let bindings = self.bindings.try_borrow().ok()?;
        // Names removed since items() was called are skipped
        for name in self.pending.by_ref() {
            if let Some(value) = bindings.value_of(&name) {
                return Some((name, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.pending.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{shared, Locals};
    use std::collections::{BTreeMap, HashMap};

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn bind<V>(locals: &Shared<Locals<V>>, name: &str, value: V) {
        locals.borrow_mut().insert(name.to_string(), value);
    }

    #[test]
    fn test_enter_snapshots_existing_names() {
        let locals = shared(Locals::new());
        bind(&locals, "a", 1);
        bind(&locals, "b", 2);

        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();

        assert!(tracker.is_active());
        assert_eq!(tracker.baseline(), &set(&["a", "b"]));
        assert!(tracker.diff().unwrap().is_empty());
    }

    #[test]
    fn test_enter_returns_tracker() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());

        let entered = tracker.enter().unwrap();
        bind(&locals, "x", 1);
        assert_eq!(entered.diff().unwrap(), set(&["x"]));
    }

    #[test]
    fn test_value_does_not_matter() {
        let locals = shared(Locals::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();

        bind(&locals, "nothing", None::<i32>);
        assert_eq!(tracker.diff().unwrap(), set(&["nothing"]));
    }

    #[test]
    fn test_diff_does_not_touch_baseline() {
        let locals = shared(Locals::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();

        bind(&locals, "x", 1);
        let before = tracker.baseline().clone();
        tracker.diff().unwrap();
        let _ = tracker.items().unwrap().count();
        assert_eq!(tracker.baseline(), &before);
        assert_eq!(tracker.diff().unwrap(), set(&["x"]));
    }

    #[test]
    fn test_extras_single_and_many() {
        let locals = shared(Locals::new());
        let mut tracker = ScopeTracker::new()
            .with_bindings(locals.clone())
            .with_extras(vec!["a", "b"]);
        tracker.enter().unwrap();

        bind(&locals, "a", 1);
        bind(&locals, "b", 2);
        bind(&locals, "c", 3);
        assert_eq!(tracker.diff().unwrap(), set(&["c"]));
    }

    #[test]
    fn test_items_follow_mapping_order() {
        let locals = shared(Locals::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();

        bind(&locals, "zeta", 1);
        bind(&locals, "alpha", 2);
        bind(&locals, "mid", 3);

        let items: Vec<(String, i32)> = tracker.items().unwrap().collect();
        assert_eq!(
            items,
            vec![
                ("zeta".to_string(), 1),
                ("alpha".to_string(), 2),
                ("mid".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_items_skip_removed_names() {
        let locals = shared(Locals::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();

        bind(&locals, "a", 1);
        bind(&locals, "b", 2);
        let mut items = tracker.items().unwrap();
        locals.borrow_mut().shift_remove("b");

        assert_eq!(items.next(), Some(("a".to_string(), 1)));
        assert_eq!(items.next(), None);
    }

    #[test]
    fn test_hash_and_btree_bindings() {
        let hashed = shared(HashMap::new());
        let mut tracker = ScopeTracker::new().with_bindings(hashed.clone());
        tracker.enter().unwrap();
        hashed.borrow_mut().insert("h".to_string(), 'h');
        assert_eq!(tracker.diff().unwrap(), set(&["h"]));

        let sorted = shared(BTreeMap::new());
        let mut tracker = ScopeTracker::new().with_bindings(sorted.clone());
        tracker.enter().unwrap();
        sorted.borrow_mut().insert("b".to_string(), 2);
        sorted.borrow_mut().insert("a".to_string(), 1);
        let names: Vec<String> = tracker.items().unwrap().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_enter_twice_fails() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals);
        tracker.enter().unwrap();

        let err = tracker.enter().unwrap_err();
        assert_eq!(
            err,
            ScopeError::InvalidState {
                operation: "enter",
                state: TrackerState::Active
            }
        );
    }

    #[test]
    fn test_reenter_after_exit_fails() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals);
        tracker.enter().unwrap();
        tracker.exit();

        assert!(matches!(
            tracker.enter(),
            Err(ScopeError::InvalidState {
                state: TrackerState::Exited,
                ..
            })
        ));
    }

    #[test]
    fn test_exit_before_enter_is_noop() {
        let mut tracker = ScopeTracker::<Locals<i32>>::new();
        tracker.exit();
        assert_eq!(tracker.state(), TrackerState::Inactive);
    }

    #[test]
    fn test_exit_releases_bindings() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();
        assert_eq!(Rc::strong_count(&locals), 3);

        tracker.exit();
        assert_eq!(Rc::strong_count(&locals), 2);
        assert_eq!(tracker.state(), TrackerState::Exited);
    }

    #[test]
    fn test_borrowed_bindings() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();

        let _writer = locals.borrow_mut();
        assert_eq!(tracker.diff().unwrap_err(), ScopeError::BindingsBorrowed);
        assert_eq!(tracker.refresh().unwrap_err(), ScopeError::BindingsBorrowed);
    }

    #[test]
    fn test_items_pause_while_bindings_borrowed() {
        let locals = shared(Locals::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        tracker.enter().unwrap();

        bind(&locals, "x", 1);
        bind(&locals, "y", 2);
        let mut items = tracker.items().unwrap();

        {
            let _writer = locals.borrow_mut();
            assert_eq!(items.next(), None);
            assert_eq!(items.size_hint(), (0, Some(2)));
        }

        assert_eq!(items.next(), Some(("x".to_string(), 1)));
        assert_eq!(items.next(), Some(("y".to_string(), 2)));
        assert_eq!(items.next(), None);
    }

    #[test]
    fn test_items_outside_scope() {
        let tracker = ScopeTracker::<Locals<i32>>::new();
        assert!(matches!(
            tracker.items(),
            Err(ScopeError::InvalidState {
                operation: "items",
                state: TrackerState::Inactive
            })
        ));
    }

    #[test]
    fn test_guard_exits_on_drop() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
        {
            let guard = tracker.guard().unwrap();
            bind(&locals, "x", 1);
            assert_eq!(guard.diff().unwrap(), set(&["x"]));
        }
        assert_eq!(tracker.state(), TrackerState::Exited);
    }

    #[test]
    fn test_scope_exits_on_error_path() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals.clone());

        let result: Result<Result<(), String>, ScopeError> = tracker.scope(|t| {
            bind(&locals, "x", 1);
            if t.diff().map_err(|e| e.to_string())?.contains("x") {
                return Err("bailed".to_string());
            }
            Ok(())
        });

        assert_eq!(result, Ok(Err("bailed".to_string())));
        assert_eq!(tracker.state(), TrackerState::Exited);
    }

    #[test]
    fn test_scope_exits_on_panic() {
        let locals = shared(Locals::<i32>::new());
        let mut tracker = ScopeTracker::new().with_bindings(locals);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = tracker.scope(|_| panic!("boom"));
        }));

        assert!(outcome.is_err());
        assert_eq!(tracker.state(), TrackerState::Exited);
    }

    #[test]
    fn test_debug_output() {
        let tracker = ScopeTracker::<Locals<i32>>::new().with_extras("me");
        let debug = format!("{:?}", tracker);
        assert!(debug.contains("Inactive"));
        assert!(debug.contains("explicit_bindings: false"));
    }
}
