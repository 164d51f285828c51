#![deny(missing_docs)]
//! Deterministic destruction for ripple.
//!
//! An [`Owner`] collects [`Disposer`](ripple_core::Disposer)s and runs them,
//! in registration order, exactly once: when [`Owner::destroy`] is called or,
//! failing that, when the last clone of the owner is dropped. Child owners
//! created with [`Owner::child`] are destroyed along with their parent, but
//! do not keep each other alive: a child whose handles are all dropped is
//! destroyed right away and leaves nothing behind in its parent.

use ripple_core::destroy::{Destroyable, Disposer, Registration};
use ripple_core::error::EffectError;
use ripple_core::hooks::HookStage;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use thiserror::Error;

/// One or more disposers failed. Every disposer still ran.
#[derive(Debug, Error)]
#[error("{} disposer(s) failed while destroying {owner}", failures.len())]
pub struct DestroyError {
    /// Label of the owner being destroyed.
    pub owner: String,
    /// Failures in the order they happened.
    pub failures: Vec<EffectError>,
}

enum State {
    Live(Vec<(u64, Disposer)>),
    Destroyed,
}

struct Inner {
    label: String,
    state: RefCell<State>,
    next_key: Cell<u64>,
    // This owner's entry in its parent, withdrawn when this owner ends first.
    parent: RefCell<Option<Registration>>,
}

impl Inner {
    // Flips to Destroyed before running anything, so re-entrant destroys
    // and late registrations see the final state.
    fn take_disposers(&self) -> Option<Vec<(u64, Disposer)>> {
        match std::mem::replace(&mut *self.state.borrow_mut(), State::Destroyed) {
            State::Live(disposers) => Some(disposers),
            State::Destroyed => None,
        }
    }

    fn run(&self, disposers: Vec<(u64, Disposer)>) -> Vec<EffectError> {
        let parent = self.parent.borrow_mut().take();
        if let Some(parent) = parent {
            parent.cancel();
        }
        tracing::debug!(owner = %self.label, disposers = disposers.len(), "ripple.owner.destroy");
        disposers
            .into_iter()
            .filter_map(|(_, disposer)| disposer().err())
            .collect()
    }

    fn forget(&self, key: u64) {
        if let State::Live(disposers) = &mut *self.state.borrow_mut() {
            disposers.retain(|(k, _)| *k != key);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(disposers) = self.take_disposers() {
            for failure in self.run(disposers) {
                tracing::warn!(owner = %self.label, error = %failure, "disposer failed during drop");
            }
        }
    }
}

/// A destroyable scope. Clones share the same scope.
#[derive(Clone)]
pub struct Owner {
    inner: Rc<Inner>,
}

impl Owner {
    /// Create a live owner.
    pub fn new() -> Self {
        Self::named("owner")
    }

    /// Create a live owner with a label used in logs and errors.
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                label: label.into(),
                state: RefCell::new(State::Live(Vec::new())),
                next_key: Cell::new(0),
                parent: RefCell::new(None),
            }),
        }
    }

    /// The owner's label.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Number of disposers waiting to run.
    pub fn pending(&self) -> usize {
        match &*self.inner.state.borrow() {
            State::Live(disposers) => disposers.len(),
            State::Destroyed => 0,
        }
    }

    /// Run every registered disposer, in registration order.
    ///
    /// Destroying an owner twice is a no-op. A failing disposer does not stop
    /// the ones after it.
    pub fn destroy(&self) -> Result<(), DestroyError> {
        let Some(disposers) = self.inner.take_disposers() else {
            return Ok(());
        };
        let failures = self.inner.run(disposers);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(DestroyError {
                owner: self.inner.label.clone(),
                failures,
            })
        }
    }

    /// Create an owner that is destroyed when this one is.
    ///
    /// The child can also end on its own first, explicitly or by dropping
    /// its last handle; it then leaves this owner's disposer list. A child
    /// of an owner that is already destroyed starts out destroyed.
    pub fn child(&self, label: impl Into<String>) -> Owner {
        let child = Owner::named(label);
        let weak = Rc::downgrade(&child.inner);
        let registered = self.on_destroy(Box::new(move || match weak.upgrade() {
            Some(inner) => Owner { inner }
                .destroy()
                .map_err(|e| EffectError::hook(HookStage::Teardown, e)),
            None => Ok(()),
        }));
        match registered {
            Ok(registration) if !registration.is_spent() => {
                *child.inner.parent.borrow_mut() = Some(registration);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(owner = %self.inner.label, error = %err, "child of destroyed owner failed to tear down");
            }
        }
        child
    }
}

impl Default for Owner {
    fn default() -> Self {
        Self::new()
    }
}

impl Destroyable for Owner {
    fn on_destroy(&self, disposer: Disposer) -> Result<Registration, EffectError> {
        if let State::Live(disposers) = &mut *self.inner.state.borrow_mut() {
            let key = self.inner.next_key.get();
            self.inner.next_key.set(key + 1);
            disposers.push((key, disposer));
            let owner: Weak<Inner> = Rc::downgrade(&self.inner);
            return Ok(Registration::new(move || {
                if let Some(inner) = owner.upgrade() {
                    inner.forget(key);
                }
            }));
        }
        tracing::debug!(owner = %self.inner.label, "disposer registered on destroyed owner; running now");
        disposer().map(|()| Registration::spent())
    }

    fn is_destroyed(&self) -> bool {
        matches!(&*self.inner.state.borrow(), State::Destroyed)
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("label", &self.inner.label)
            .field("destroyed", &self.is_destroyed())
            .field("pending", &self.pending())
            .finish()
    }
}
