//! StubMemoizer: a memoizer whose notion of "changed" is set by the test.

use crate::error::EffectError;
use crate::tracking::{Body, Dispatch, Memoizer};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unchanged,
    Always,
}

/// A memoizer with no real dependency tracking.
///
/// In `unchanged` mode a dispatcher runs its body on first dispatch and then
/// only after [`invalidate`](Self::invalidate). In `always` mode every
/// dispatch runs the body.
#[derive(Debug, Clone)]
pub struct StubMemoizer {
    mode: Mode,
    epoch: Rc<Cell<u64>>,
}

impl StubMemoizer {
    /// Nothing ever changes unless [`invalidate`](Self::invalidate) is called.
    pub fn unchanged() -> Self {
        Self {
            mode: Mode::Unchanged,
            epoch: Rc::new(Cell::new(0)),
        }
    }

    /// Every dispatch re-runs its body.
    pub fn always() -> Self {
        Self {
            mode: Mode::Always,
            epoch: Rc::new(Cell::new(0)),
        }
    }

    /// Mark every dispatcher produced by this memoizer as stale.
    pub fn invalidate(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }
}

struct StubDispatch {
    mode: Mode,
    epoch: Rc<Cell<u64>>,
    last_run: Option<u64>,
    body: Body,
}

impl Dispatch for StubDispatch {
    fn dispatch(&mut self) -> Result<(), EffectError> {
        let now = self.epoch.get();
        if self.mode == Mode::Unchanged && self.last_run == Some(now) {
            return Ok(());
        }
        (self.body)()?;
        self.last_run = Some(now);
        Ok(())
    }
}

impl Memoizer for StubMemoizer {
    fn memoize(&self, body: Body) -> Box<dyn Dispatch> {
        Box::new(StubDispatch {
            mode: self.mode,
            epoch: Rc::clone(&self.epoch),
            last_run: None,
            body,
        })
    }
}
