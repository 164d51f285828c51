//! Schedulers that record or defer phase flushes.

use crate::error::EffectError;
use crate::phase::Phase;
use crate::schedule::{Revalidate, Scheduler};
use std::cell::RefCell;
use std::rc::Rc;

/// Records the phase of every `schedule` call, then runs it immediately.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    phases: Rc<RefCell<Vec<Phase>>>,
}

impl RecordingScheduler {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Phases scheduled so far, in call order.
    pub fn phases(&self) -> Vec<Phase> {
        self.phases.borrow().clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule(&self, phase: &Phase, revalidate: Revalidate) -> Result<(), EffectError> {
        self.phases.borrow_mut().push(phase.clone());
        revalidate.run()
    }
}

/// Holds every revalidation until [`run_pending`](Self::run_pending).
#[derive(Debug, Clone, Default)]
pub struct DeferredScheduler {
    pending: Rc<RefCell<Vec<Revalidate>>>,
}

impl DeferredScheduler {
    /// Create a scheduler with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of revalidations waiting to run.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Run and drop every pending revalidation, oldest first.
    pub fn run_pending(&self) -> Result<(), EffectError> {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for revalidate in pending {
            revalidate.run()?;
        }
        Ok(())
    }
}

impl Scheduler for DeferredScheduler {
    fn schedule(&self, _phase: &Phase, revalidate: Revalidate) -> Result<(), EffectError> {
        self.pending.borrow_mut().push(revalidate);
        Ok(())
    }
}
