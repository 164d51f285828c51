use crate::runtime::{Revision, Runtime, Tag};
use std::cell::RefCell;
use std::fmt;

/// A value whose reads are recorded by the memo currently running.
pub struct Tracked<T> {
    runtime: Runtime,
    tag: Tag,
    value: RefCell<T>,
}

impl<T> Tracked<T> {
    pub(crate) fn new(runtime: Runtime, value: T) -> Self {
        let tag = Tag::new(runtime.revision());
        Self {
            runtime,
            tag,
            value: RefCell::new(value),
        }
    }

    /// Read through a closure, recording the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.runtime.record(&self.tag);
        f(&self.value.borrow())
    }

    /// Read without recording.
    pub fn peek<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replace the value and invalidate every memo that read it.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.dirty();
    }

    /// Modify the value in place and invalidate readers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
        self.dirty();
    }

    /// Revision of the last write.
    pub fn revision(&self) -> Revision {
        self.tag.revision()
    }

    fn dirty(&self) {
        let revision = self.runtime.bump();
        self.tag.dirty(revision);
    }
}

impl<T: Clone> Tracked<T> {
    /// Clone the value out, recording the read.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: PartialEq> Tracked<T> {
    /// Replace the value only if it differs. Returns whether it was replaced.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("value", &self.value.borrow())
            .field("revision", &self.revision())
            .finish()
    }
}
