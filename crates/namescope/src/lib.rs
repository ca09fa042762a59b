//! namescope: discover which names were bound inside a scope
//!
//! This crate provides:
//! - `ScopeTracker`: snapshots an observed mapping at enter and reports new names
//! - `ScopeGuard`: RAII handle that exits the tracker when dropped
//! - `Bindings`: the contract an observed name -> value mapping satisfies
//! - `frame`: thread-local call frames for trackers created without bindings
//! - `logging`: opt-in file logging of tracker events
//!
//! ```
//! use namescope::{shared, Locals, ScopeTracker};
//!
//! let locals = shared(Locals::new());
//! locals.borrow_mut().insert("before".to_string(), 0);
//!
//! let mut tracker = ScopeTracker::new().with_bindings(locals.clone());
//! tracker.scope(|scope| {
//!     locals.borrow_mut().insert("x".to_string(), 1);
//!     locals.borrow_mut().insert("_tmp".to_string(), 2);
//!     let new: Vec<_> = scope.items().unwrap().collect();
//!     assert_eq!(new, vec![("x".to_string(), 1)]);
//! })
//! .unwrap();
//! ```

mod bindings;
mod error;
mod extras;
pub mod frame;
pub mod logging;
mod tracker;

pub use bindings::{shared, Bindings, Locals, Shared};
pub use error::{ScopeError, TrackerState};
pub use extras::Extras;
pub use frame::{enter_frame, FrameGuard};
pub use tracker::{Items, ScopeGuard, ScopeTracker};
