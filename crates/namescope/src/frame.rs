//! Call-frame registry standing in for caller-locals reflection
//!
//! Rust has no way to inspect a caller's local variables, so functions that
//! want trackers to find their locals automatically publish them here:
//!
//! ```
//! use namescope::{frame, shared, Locals, ScopeTracker};
//!
//! let locals = shared(Locals::<i64>::new());
//! let _frame = frame::enter_frame(locals.clone());
//!
//! let mut tracker = ScopeTracker::<Locals<i64>>::new();
//! tracker.enter().unwrap();
//! locals.borrow_mut().insert("x".to_string(), 1);
//! assert!(tracker.diff().unwrap().contains("x"));
//! tracker.exit();
//! ```
//!
//! Frames are per thread. The innermost frame is the one a tracker sees.

use crate::bindings::Shared;
use crate::error::ScopeError;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

thread_local! {
    static FRAMES: RefCell<Vec<(u64, Rc<dyn Any>)>> = const { RefCell::new(Vec::new()) };
    static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Registration of a frame's locals; dropping it pops the frame
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    id: u64,
    depth: usize,
    // Frames live in a thread-local stack
    _not_send: PhantomData<*const ()>,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        // Pops this frame and anything above it whose guards leaked. A frame
        // already popped by an outer guard leaves the stack untouched.
        let _ = FRAMES.try_with(|frames| {
            if let Ok(mut frames) = frames.try_borrow_mut() {
                if frames.get(self.depth).map(|(id, _)| *id) == Some(self.id) {
                    frames.truncate(self.depth);
                }
            }
        });
    }
}

/// Publish `locals` as the innermost frame of the current thread
pub fn enter_frame<M: 'static>(locals: Shared<M>) -> FrameGuard {
    let id = NEXT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    let depth = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        frames.push((id, locals as Rc<dyn Any>));
        frames.len() - 1
    });

    FrameGuard {
        id,
        depth,
        _not_send: PhantomData,
    }
}

/// Locals of the innermost registered frame
pub fn caller_locals<M: 'static>() -> Result<Shared<M>, ScopeError> {
    let top = FRAMES
        .try_with(|frames| frames.borrow().last().map(|(_, locals)| Rc::clone(locals)))
        .map_err(|_| ScopeError::ReflectionUnavailable("thread is shutting down".to_string()))?;

    let top = top.ok_or_else(|| {
        ScopeError::ReflectionUnavailable("no call frame registered on this thread".to_string())
    })?;

    top.downcast::<RefCell<M>>().map_err(|_| {
        ScopeError::ReflectionUnavailable(
            "innermost frame holds a different bindings type".to_string(),
        )
    })
}

/// Number of frames registered on the current thread
pub fn depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}
