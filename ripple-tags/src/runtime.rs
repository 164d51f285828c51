use crate::memo::Memo;
use crate::tracked::Tracked;
use ripple_core::tracking::{Body, Dispatch, Memoizer};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Value of the revision clock.
pub type Revision = u64;

/// Revision stamp shared between a tracked cell and every memo that read it.
#[derive(Clone)]
pub(crate) struct Tag(Rc<Cell<Revision>>);

impl Tag {
    pub(crate) fn new(revision: Revision) -> Self {
        Self(Rc::new(Cell::new(revision)))
    }

    pub(crate) fn revision(&self) -> Revision {
        self.0.get()
    }

    pub(crate) fn dirty(&self, revision: Revision) {
        self.0.set(revision);
    }

    fn same(&self, other: &Tag) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

struct Inner {
    clock: Cell<Revision>,
    frames: RefCell<Vec<Vec<Tag>>>,
}

/// Revision clock and tracking-frame stack. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<Inner>,
}

impl Runtime {
    /// Create a runtime at revision 1.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                clock: Cell::new(1),
                frames: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Current revision.
    pub fn revision(&self) -> Revision {
        self.inner.clock.get()
    }

    /// Create a tracked cell owned by this runtime.
    pub fn tracked<T>(&self, value: T) -> Tracked<T> {
        Tracked::new(self.clone(), value)
    }

    /// Wrap `body` in a memo bound to this runtime.
    pub fn memo(&self, body: Body) -> Memo {
        Memo::new(self.clone(), body)
    }

    /// Run `f` without recording any reads into the enclosing memo.
    pub fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
        let _frame = FrameGuard::push(self);
        f()
    }

    /// Whether a memo body is currently running.
    pub fn is_tracking(&self) -> bool {
        !self.inner.frames.borrow().is_empty()
    }

    pub(crate) fn bump(&self) -> Revision {
        let next = self.inner.clock.get() + 1;
        self.inner.clock.set(next);
        next
    }

    pub(crate) fn record(&self, tag: &Tag) {
        if let Some(frame) = self.inner.frames.borrow_mut().last_mut() {
            if !frame.iter().any(|t| t.same(tag)) {
                frame.push(tag.clone());
            }
        }
    }

    pub(crate) fn record_all(&self, tags: &[Tag]) {
        for tag in tags {
            self.record(tag);
        }
    }

    /// Run `f` in a fresh frame and return the tags it read.
    pub(crate) fn track<R>(&self, f: impl FnOnce() -> R) -> (R, Vec<Tag>) {
        let mut guard = FrameGuard::push(self);
        let result = f();
        let tags = guard.pop();
        (result, tags)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("revision", &self.revision())
            .field("depth", &self.inner.frames.borrow().len())
            .finish()
    }
}

impl Memoizer for Runtime {
    fn memoize(&self, body: Body) -> Box<dyn Dispatch> {
        Box::new(self.memo(body))
    }
}

// Pops its frame on drop so a panicking body cannot leave the stack unbalanced.
struct FrameGuard<'a> {
    runtime: &'a Runtime,
    popped: bool,
}

impl<'a> FrameGuard<'a> {
    fn push(runtime: &'a Runtime) -> Self {
        runtime.inner.frames.borrow_mut().push(Vec::new());
        Self {
            runtime,
            popped: false,
        }
    }

    fn pop(&mut self) -> Vec<Tag> {
        self.popped = true;
        self.runtime
            .inner
            .frames
            .borrow_mut()
            .pop()
            .unwrap_or_default()
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if !self.popped {
            self.runtime.inner.frames.borrow_mut().pop();
        }
    }
}
