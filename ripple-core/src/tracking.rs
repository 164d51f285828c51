//! The memoization capability: track reads and detect invalidation.
//!
//! The effect manager never inspects tracked values itself. It hands each
//! effect body to a [`Memoizer`] and calls the returned [`Dispatch`] whenever
//! a phase is revalidated. Whether the body actually runs is the
//! memoizer's decision.

use crate::error::EffectError;

/// A body wrapped by a memoizer.
pub type Body = Box<dyn FnMut() -> Result<(), EffectError>>;

/// A memoized, dependency-tracked entry point.
pub trait Dispatch {
    /// Run the body if any value it read on its last successful run has changed
    /// since (or if it has never run successfully). Otherwise do nothing.
    fn dispatch(&mut self) -> Result<(), EffectError>;
}

/// Produces [`Dispatch`]ers from bodies.
pub trait Memoizer {
    /// Wrap `body` so that re-invocation is skipped while its reads are unchanged.
    fn memoize(&self, body: Body) -> Box<dyn Dispatch>;
}

impl<M: Memoizer + ?Sized> Memoizer for std::rc::Rc<M> {
    fn memoize(&self, body: Body) -> Box<dyn Dispatch> {
        (**self).memoize(body)
    }
}
